//! 卡牌資料：卡牌模板、效果種類與卡牌庫。
//! - 只負責靜態資料與載入，不含任何戰鬥邏輯。
//! - 卡牌實例（CardInstance）是從模板複製出來的值物件，記錄來源 key。
use serde::{Deserialize, Serialize};
use std::ops::Deref;
use strum_macros::{Display, EnumIter, EnumString};

mod error;
mod library;

pub use error::*;
pub use library::*;

pub type CardKey = String;

/// 卡牌模板
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Card {
    /// 載入時若為空，會以卡牌庫的 key 補上
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// 法力消耗
    #[serde(default)]
    pub cost: i32,
    /// 效果強度（傷害、治療、護盾、召喚物血量）
    #[serde(default)]
    pub value: i32,
    /// 以施放者為中心的 Chebyshev 距離
    #[serde(default)]
    pub range: usize,
    pub effect: CardEffect,
    #[serde(default)]
    pub description: String,
}

#[derive(
    Debug,
    Deserialize,
    Serialize,
    Clone,
    Copy,
    Default,
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
pub enum TileEffectKind {
    #[default]
    Fire,
}

#[derive(Debug, Deserialize, Serialize, Clone, Display, PartialEq)]
#[serde(rename_all = "snake_case", tag = "type")]
#[strum(serialize_all = "snake_case")]
pub enum CardEffect {
    /// 單體傷害
    Damage,
    /// 命中目標與其周圍一格內的所有敵人
    Cleave,
    /// 立即傷害並附加中毒
    Poison {
        #[serde(default = "default_poison_damage")]
        damage_per_tick: i32,
        #[serde(default = "default_poison_ticks")]
        ticks: u32,
    },
    Heal,
    Shield,
    /// 瞬移到目標空格
    Dash,
    /// 在目標空格召喚砲塔
    Summon,
    /// 抽牌後強制棄牌，由 GameManager 處理
    Loot {
        #[serde(default = "default_loot_draw")]
        draw: usize,
        #[serde(default = "default_loot_discard")]
        discard: usize,
    },
    /// 在目標格放置地形效果
    Terrain {
        #[serde(default)]
        kind: TileEffectKind,
        #[serde(default = "default_terrain_duration")]
        duration: u32,
    },
    /// 資料中無法辨識的效果
    #[serde(other)]
    Unknown,
}

/// 效果對目標格的要求
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Targeting {
    /// 目標格必須有存活的敵方單位
    Enemy,
    /// 只作用於施放者，點擊格只用於距離檢查
    Caster,
    /// 目標格必須可通行（空、在棋盤內、無阻擋障礙）
    EmptyCell,
    /// 任意棋盤內的格子
    AnyCell,
    /// 無法施放
    Invalid,
}

impl CardEffect {
    pub fn targeting(&self) -> Targeting {
        match self {
            CardEffect::Damage | CardEffect::Cleave | CardEffect::Poison { .. } => {
                Targeting::Enemy
            }
            CardEffect::Heal | CardEffect::Shield | CardEffect::Loot { .. } => Targeting::Caster,
            CardEffect::Dash | CardEffect::Summon => Targeting::EmptyCell,
            CardEffect::Terrain { .. } => Targeting::AnyCell,
            CardEffect::Unknown => Targeting::Invalid,
        }
    }
}

/// 從模板複製出的卡牌，key 用於放回牌庫或棄牌堆
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardInstance {
    pub key: CardKey,
    pub card: Card,
}

impl Deref for CardInstance {
    type Target = Card;

    fn deref(&self) -> &Card {
        &self.card
    }
}

fn default_poison_damage() -> i32 {
    2
}

fn default_poison_ticks() -> u32 {
    3
}

fn default_loot_draw() -> usize {
    2
}

fn default_loot_discard() -> usize {
    1
}

fn default_terrain_duration() -> u32 {
    2
}
