//! unit.rs：
//! - 定義單位（Unit）與陣營、種類，以及單位自身的傷害、治療、護盾、中毒數學。
//! - 只改動單位自己的欄位，不處理棋盤佔位與事件；對外的修改一律經過 battle.rs。
//! - 死亡單位拒絕所有修改（皆為 no-op）。
use crate::*;

#[derive(
    Debug,
    Deserialize,
    Serialize,
    Clone,
    Copy,
    EnumString,
    Display,
    EnumIter,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UnitKind {
    Player,
    Melee,
    Ranged,
    Boss,
    /// 可被破壞的中立障礙（例如石塊）
    Obstacle,
    /// 玩家召喚的砲塔
    Turret,
}

impl UnitKind {
    pub fn default_team(&self) -> Team {
        match self {
            UnitKind::Player | UnitKind::Turret => Team::Player,
            UnitKind::Melee | UnitKind::Ranged | UnitKind::Boss => Team::Enemy,
            UnitKind::Obstacle => Team::Neutral,
        }
    }
}

#[derive(
    Debug,
    Deserialize,
    Serialize,
    Clone,
    Copy,
    EnumString,
    Display,
    EnumIter,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Team {
    Player,
    Enemy,
    /// 不會成為 AI 目標，也不會主動行動
    Neutral,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Unit {
    pub id: UnitID,
    pub kind: UnitKind,
    pub team: Team,
    pub hp: i32,
    pub max_hp: i32,
    pub mana: i32,
    pub max_mana: i32,
    pub move_points: Steps,
    pub max_move_points: Steps,
    pub shield: i32,
    pub poison_damage_per_tick: i32,
    pub poison_ticks_remaining: u32,
    pub is_dead: bool,
}

/// `dealt` 為請求的傷害量（不因護盾或剩餘生命而縮減）
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct DamageResult {
    pub dealt: i32,
    pub absorbed: i32,
    pub hp_lost: i32,
    pub died: bool,
}

impl Unit {
    /// id 由 Board 在放置時指定
    pub fn new(kind: UnitKind, max_hp: i32) -> Self {
        Self {
            id: 0,
            kind,
            team: kind.default_team(),
            hp: max_hp,
            max_hp,
            mana: 0,
            max_mana: 0,
            move_points: 0,
            max_move_points: 0,
            shield: 0,
            poison_damage_per_tick: 0,
            poison_ticks_remaining: 0,
            is_dead: false,
        }
    }

    pub fn with_hp(mut self, hp: i32) -> Self {
        self.hp = hp.clamp(0, self.max_hp);
        self
    }

    pub fn with_mana(mut self, max_mana: i32) -> Self {
        self.max_mana = max_mana;
        self.mana = max_mana;
        self
    }

    pub fn with_move_points(mut self, move_points: Steps) -> Self {
        self.max_move_points = move_points;
        self.move_points = move_points;
        self
    }

    pub fn is_alive(&self) -> bool {
        !self.is_dead
    }

    pub fn is_poisoned(&self) -> bool {
        self.poison_ticks_remaining > 0
    }

    /// 先扣護盾，再扣生命，生命歸零即死亡
    pub fn apply_damage(&mut self, amount: i32) -> DamageResult {
        if self.is_dead || amount <= 0 {
            return DamageResult::default();
        }
        let absorbed = self.shield.min(amount);
        self.shield -= absorbed;
        let hp_lost = (amount - absorbed).min(self.hp);
        self.hp -= hp_lost;
        if self.hp <= 0 {
            self.hp = 0;
            self.is_dead = true;
        }
        DamageResult {
            dealt: amount,
            absorbed,
            hp_lost,
            died: self.is_dead,
        }
    }

    /// 回傳實際回復量
    pub fn heal(&mut self, amount: i32) -> i32 {
        if self.is_dead || amount <= 0 || self.hp >= self.max_hp {
            return 0;
        }
        let before = self.hp;
        self.hp = (self.hp + amount).min(self.max_hp);
        self.hp - before
    }

    /// 回傳實際增加量，cap 為 None 時不設上限
    pub fn add_shield(&mut self, amount: i32, cap: Option<i32>) -> i32 {
        if self.is_dead || amount <= 0 {
            return 0;
        }
        let before = self.shield;
        self.shield += amount;
        if let Some(cap) = cap {
            self.shield = self.shield.min(cap.max(before));
        }
        self.shield - before
    }

    /// 重複中毒時取較強的數值與較長的回合
    pub fn add_poison(&mut self, damage_per_tick: i32, ticks: u32) -> bool {
        if self.is_dead || damage_per_tick <= 0 || ticks == 0 {
            return false;
        }
        self.poison_damage_per_tick = self.poison_damage_per_tick.max(damage_per_tick);
        self.poison_ticks_remaining = self.poison_ticks_remaining.max(ticks);
        true
    }

    /// 中毒發作一次，走與一般傷害相同的路徑
    pub fn tick_poison(&mut self) -> Option<DamageResult> {
        if self.is_dead || !self.is_poisoned() {
            return None;
        }
        let result = self.apply_damage(self.poison_damage_per_tick);
        self.poison_ticks_remaining -= 1;
        if self.poison_ticks_remaining == 0 {
            self.poison_damage_per_tick = 0;
        }
        Some(result)
    }

    /// 己方回合開始時回滿法力與移動點數
    pub fn refresh(&mut self) {
        if self.is_dead {
            return;
        }
        self.mana = self.max_mana;
        self.move_points = self.max_move_points;
    }
}
