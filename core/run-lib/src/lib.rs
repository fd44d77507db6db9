//! 冒險（Run）層：地圖生成、節點進度、跨戰鬥保存的玩家狀態與節點獎勵。
//! - 戰鬥期間此層只保存 in_battle 旗標，不碰任何棋盤狀態
//! - 所有隨機都來自 run 種子，同一種子同一節點必得同一結果
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

mod config;
mod encounter;
mod error;
mod map;
mod progress;
mod reward;
mod run;
mod state;

pub use config::*;
pub use encounter::*;
pub use error::*;
pub use map::*;
pub use progress::*;
pub use reward::*;
pub use run::*;
pub use state::*;

pub type NodeID = String;
pub type Seed = u64;
pub type Gold = i32;
pub type Floor = usize;
