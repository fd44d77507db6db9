//! 對外通知：型別化的遊戲事件與同步發佈的事件匯流排
//! - publish 返回前所有訂閱者都已收到事件
//! - 訂閱者只讀事件，不回傳任何值
use crate::*;
use cards_lib::CardKey;
use run_lib::{Gold, NodeID, NodeReward, Seed};
use std::fmt;

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum GameOverReason {
    /// 戰敗後復活，冒險繼續
    Defeated { revived_hp: i32, gold_lost: Gold },
    /// 放棄戰鬥，冒險結束
    Abandoned,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum GameEvent {
    UnitSpawned {
        unit_id: UnitID,
        kind: UnitKind,
        team: Team,
        pos: Pos,
    },
    UnitMoved {
        unit_id: UnitID,
        from: Pos,
        to: Pos,
    },
    UnitDamaged {
        source: Option<UnitID>,
        target: UnitID,
        amount: i32,
        absorbed: i32,
        hp_lost: i32,
    },
    UnitHealed {
        unit_id: UnitID,
        amount: i32,
    },
    UnitShielded {
        unit_id: UnitID,
        amount: i32,
    },
    UnitPoisoned {
        unit_id: UnitID,
        damage_per_tick: i32,
        ticks: u32,
    },
    UnitDied {
        unit_id: UnitID,
        pos: Option<Pos>,
    },
    HandChanged {
        size: usize,
    },
    DeckChanged {
        size: usize,
    },
    DiscardChanged {
        size: usize,
    },
    DiscardRequested {
        count: usize,
    },
    CardPlayed {
        key: CardKey,
        target: Pos,
    },
    TurnStarted {
        team: Team,
        turn: u32,
    },
    TurnEnded {
        team: Team,
        turn: u32,
    },
    EncounterStarted {
        node_id: NodeID,
        floor: usize,
    },
    EncounterCompleted {
        node_id: NodeID,
        gold: Gold,
        max_hp_gain: i32,
    },
    GameOver {
        reason: GameOverReason,
    },
    RunStarted {
        seed: Seed,
    },
    NodeCompleted {
        node_id: NodeID,
    },
    RewardApplied {
        node_id: NodeID,
        reward: NodeReward,
    },
    RunWon {
        gold: Gold,
    },
}

type Listener = Box<dyn FnMut(&GameEvent)>;

#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(ListenerID, Listener)>,
    next_id: ListenerID,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl EventBus {
    pub fn subscribe(&mut self, listener: impl FnMut(&GameEvent) + 'static) -> ListenerID {
        self.next_id += 1;
        let id = self.next_id;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerID) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn publish(&mut self, event: GameEvent) {
        tracing::trace!("event: {event:?}");
        for (_, listener) in self.listeners.iter_mut() {
            listener(&event);
        }
    }
}
