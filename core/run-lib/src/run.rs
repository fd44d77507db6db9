//! 一次冒險的整體狀態：地圖、進度、玩家狀態
use crate::*;
use cards_lib::CardKey;

#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub config: RunConfig,
    pub map: RunMap,
    pub progress: RunProgress,
    pub state: RunState,
    pub in_battle: bool,
}

impl Run {
    pub fn new(
        seed: Seed,
        config: RunConfig,
        master_deck: Vec<CardKey>,
        max_hp: i32,
    ) -> Result<Self> {
        let func = "Run::new";

        let map =
            RunMap::generate(config.floors, seed).map_err(|e| Error::Wrap {
                func,
                source: Box::new(e),
            })?;
        let progress = RunProgress::new(&map);
        let state = RunState::new(seed, master_deck, max_hp, config.start_gold);
        tracing::info!("run started: seed {seed}, {} floors", config.floors);
        Ok(Self {
            config,
            map,
            progress,
            state,
            in_battle: false,
        })
    }

    pub fn seed(&self) -> Seed {
        self.state.seed
    }

    /// 允許選取尚未開放的節點，只是無法進入
    pub fn select_node(&mut self, node_id: &str) -> Result<()> {
        let func = "Run::select_node";

        if self.map.node(node_id).is_none() {
            return Err(Error::NodeNotFound {
                func,
                node_id: node_id.to_string(),
            });
        }
        self.progress.selected = Some(node_id.to_string());
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.progress.selected = None;
    }

    pub fn selected_node(&self) -> Option<&MapNode> {
        self.progress
            .selected
            .as_deref()
            .and_then(|id| self.map.node(id))
    }

    pub fn can_enter_selected(&self) -> bool {
        !self.state.is_over() && !self.in_battle && self.progress.can_enter_selected()
    }

    pub fn enter_selected(&mut self) -> RunAction {
        if !self.can_enter_selected() {
            return RunAction::None;
        }
        let Some(node) = self.selected_node().cloned() else {
            return RunAction::None;
        };
        if !node.node_type.is_combat() {
            return RunAction::Modal(node);
        }
        self.in_battle = true;
        tracing::debug!("entering encounter at node {}", node.id);
        RunAction::Encounter(EncounterDescriptor::from_node(&node))
    }

    pub fn set_in_battle(&mut self, in_battle: bool) {
        self.in_battle = in_battle;
    }

    /// 回傳是否因此通過 Boss 而贏得冒險
    pub fn complete_node(&mut self, node_id: &str) -> Result<bool> {
        let func = "Run::complete_node";

        let node_type = self
            .map
            .get_node(node_id)
            .map_err(|e| Error::Wrap {
                func,
                source: Box::new(e),
            })?
            .node_type;
        self.progress.complete(&self.map, node_id);
        tracing::debug!("node {node_id} cleared");
        if node_type == NodeType::Boss && !self.state.is_over() {
            self.state.status = RunStatus::Won;
            tracing::info!("run won, gold {}", self.state.gold);
            return Ok(true);
        }
        Ok(false)
    }

    /// 結算 REWARD/EVENT/SHOP 節點並完成該節點
    pub fn apply_node_reward(&mut self, node_id: &str, reward_pool: &[CardKey]) -> Result<NodeReward> {
        let func = "Run::apply_node_reward";

        if self.state.is_over() {
            return Err(Error::RunOver { func });
        }
        let node = self
            .map
            .get_node(node_id)
            .map_err(|e| Error::Wrap {
                func,
                source: Box::new(e),
            })?
            .clone();
        if !self.progress.is_available(node_id) {
            return Err(Error::NodeNotAvailable {
                func,
                node_id: node_id.to_string(),
            });
        }
        let reward = resolve_node_reward(&mut self.state, &node, &self.config, reward_pool)
            .map_err(|e| Error::Wrap {
                func,
                source: Box::new(e),
            })?;
        self.complete_node(node_id)?;
        self.clear_selection();
        tracing::info!("node {node_id} reward: {reward:?}");
        Ok(reward)
    }

    /// 放棄戰鬥，冒險終止
    pub fn abandon(&mut self) {
        self.in_battle = false;
        self.state.status = RunStatus::Lost;
        tracing::info!("run abandoned");
    }
}
