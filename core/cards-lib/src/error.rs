// 卡牌庫錯誤型別
use crate::*;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("`{func}`: 卡牌 {key} 不存在")]
    CardNotFound { func: &'static str, key: CardKey },

    #[error("`{func}`: 卡牌資料解析失敗: {reason}")]
    ParseCards { func: &'static str, reason: String },

    #[error("`{func}`: {list} 引用了不存在的卡牌 {key}")]
    DanglingCardKey {
        func: &'static str,
        list: &'static str,
        key: CardKey,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
