// 戰鬥核心錯誤型別，攜帶 function name 與 context，支援來源錯誤巢狀
// 玩家的非法操作不走這裡，一律回傳 Outcome::Rejected
use crate::*;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("`{func}`: 位置 {pos:?} 不在棋盤內")]
    OutOfBounds { func: &'static str, pos: Pos },

    #[error("`{func}`: 位置 {pos:?} 已被佔用")]
    PosOccupied { func: &'static str, pos: Pos },

    #[error("`{func}`: 位置 {pos:?} 不可通行")]
    NotWalkable { func: &'static str, pos: Pos },

    #[error("`{func}`: 單位 {unit_id} 不存在或已死亡")]
    NoUnit { func: &'static str, unit_id: UnitID },

    #[error("`{func}`: 單位 {unit_id} 不在 {pos:?}")]
    UnitNotAtPos {
        func: &'static str,
        unit_id: UnitID,
        pos: Pos,
    },

    #[error("`{func}`: 棋盤尺寸 {width}x{height} 無法配置戰鬥")]
    InvalidGrid {
        func: &'static str,
        width: usize,
        height: usize,
    },

    #[error("`{func}`: 尚未開始冒險")]
    NoRun { func: &'static str },

    #[error("`{func}`: 戰鬥進行中")]
    EncounterActive { func: &'static str },

    #[error("`{func}`: 設定解析失敗: {reason}")]
    ParseConfig { func: &'static str, reason: String },

    #[error("`{func}`: 無法讀取設定檔 {path:?}: {source}")]
    ReadConfig {
        func: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("`{func}`: 卡牌錯誤: {source}")]
    Cards {
        func: &'static str,
        #[source]
        source: cards_lib::Error,
    },

    #[error("`{func}`: 冒險錯誤: {source}")]
    Run {
        func: &'static str,
        #[source]
        source: run_lib::Error,
    },

    #[error("`{func}`: 包裝: {source}")]
    Wrap {
        func: &'static str,
        #[source]
        source: Box<Error>,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

pub fn root_error(err: &Error) -> &Error {
    let mut err = err;
    while let Error::Wrap { source, .. } = err {
        err = source.as_ref();
    }
    err
}
