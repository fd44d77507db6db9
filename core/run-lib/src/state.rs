//! 跨戰鬥保存的玩家狀態
use crate::*;
use cards_lib::CardKey;

#[derive(
    Debug, Deserialize, Serialize, Clone, Copy, Default, Display, PartialEq, Eq, Hash,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RunStatus {
    #[default]
    InProgress,
    Won,
    /// 放棄戰鬥，唯一會終結冒險的情況
    Lost,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RunState {
    pub seed: Seed,
    pub master_deck: Vec<CardKey>,
    pub hp: i32,
    pub max_hp: i32,
    pub gold: Gold,
    pub status: RunStatus,
}

impl RunState {
    pub fn new(seed: Seed, master_deck: Vec<CardKey>, max_hp: i32, gold: Gold) -> Self {
        Self {
            seed,
            master_deck,
            hp: max_hp,
            max_hp,
            gold,
            status: RunStatus::InProgress,
        }
    }

    pub fn is_over(&self) -> bool {
        self.status != RunStatus::InProgress
    }

    /// 回傳實際回復量
    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.hp;
        self.hp = (self.hp + amount.max(0)).min(self.max_hp);
        self.hp - before
    }

    /// 扣血但不低於 1，回傳實際扣除量
    pub fn lose_hp_nonlethal(&mut self, amount: i32) -> i32 {
        let before = self.hp;
        self.hp = (self.hp - amount.max(0)).max(1).min(before);
        before - self.hp
    }

    pub fn grow_max_hp(&mut self, amount: i32) {
        self.max_hp += amount;
        self.hp += amount;
    }

    pub fn add_gold(&mut self, amount: Gold) {
        self.gold += amount;
    }

    pub fn spend_gold(&mut self, amount: Gold) -> bool {
        if self.gold < amount {
            return false;
        }
        self.gold -= amount;
        true
    }

    /// 戰敗復活：回復到最大生命的百分比（至少 1），並扣除金幣百分比
    /// 回傳 (復活後生命, 失去的金幣)
    pub fn revive_after_defeat(&mut self, revive_percent: i32, gold_loss_percent: i32) -> (i32, Gold) {
        self.hp = (self.max_hp * revive_percent / 100).max(1);
        let lost = self.gold * gold_loss_percent / 100;
        self.gold -= lost;
        (self.hp, lost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> RunState {
        RunState::new(1, vec!["strike".to_string()], 30, 100)
    }

    #[test]
    fn test_heal_and_hazard() {
        let mut s = state();
        s.hp = 20;
        assert_eq!(s.heal(50), 10);
        assert_eq!(s.hp, 30);

        s.hp = 3;
        assert_eq!(s.lose_hp_nonlethal(5), 2);
        assert_eq!(s.hp, 1);
        assert_eq!(s.lose_hp_nonlethal(5), 0);
        assert_eq!(s.hp, 1);
    }

    #[test]
    fn test_revive_after_defeat() {
        let test_data = [
            // (max_hp, gold, revived_hp, gold_lost, gold_left)
            (30, 100, 15, 25, 75),
            (1, 3, 1, 0, 3),
            (31, 10, 15, 2, 8),
        ];
        for (max_hp, gold, revived, lost, left) in test_data {
            let mut s = RunState::new(1, vec![], max_hp, gold);
            s.hp = 0;
            assert_eq!(s.revive_after_defeat(50, 25), (revived, lost), "max_hp {max_hp}");
            assert_eq!(s.hp, revived);
            assert_eq!(s.gold, left);
            assert!(s.hp > 0);
        }
    }

    #[test]
    fn test_spend_gold() {
        let mut s = state();
        assert!(!s.spend_gold(101));
        assert_eq!(s.gold, 100);
        assert!(s.spend_gold(30));
        assert_eq!(s.gold, 70);
    }
}
