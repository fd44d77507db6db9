//! 節點進度：已通過、可選擇（frontier）與目前選取
use crate::*;
use std::collections::BTreeSet;

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct RunProgress {
    pub cleared: BTreeSet<NodeID>,
    pub frontier: BTreeSet<NodeID>,
    pub selected: Option<NodeID>,
}

/// 進入選取節點的結果
#[derive(Debug, Clone, PartialEq)]
pub enum RunAction {
    None,
    /// SHOP/REWARD/EVENT，由外部顯示後呼叫 apply_node_reward
    Modal(MapNode),
    Encounter(EncounterDescriptor),
}

impl RunProgress {
    pub fn new(map: &RunMap) -> Self {
        Self {
            cleared: BTreeSet::new(),
            frontier: map.first_floor().iter().cloned().collect(),
            selected: None,
        }
    }

    pub fn is_available(&self, node_id: &str) -> bool {
        self.frontier.contains(node_id)
    }

    pub fn can_enter_selected(&self) -> bool {
        self.selected
            .as_deref()
            .is_some_and(|id| self.frontier.contains(id))
    }

    /// 移入 cleared，開放出邊，並丟棄已失效的選取
    pub fn complete(&mut self, map: &RunMap, node_id: &str) {
        self.cleared.insert(node_id.to_string());
        self.frontier.remove(node_id);
        for next in map.outgoing(node_id) {
            if !self.cleared.contains(next) {
                self.frontier.insert(next.clone());
            }
        }
        let stale = self
            .selected
            .as_ref()
            .is_some_and(|selected| !self.frontier.contains(selected));
        if stale {
            self.selected = None;
        }
    }
}
