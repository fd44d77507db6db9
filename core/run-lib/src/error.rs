// 冒險層錯誤型別
use crate::*;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("`{func}`: 樓層數 {floors} 太少，至少需要 2 層")]
    InvalidFloorCount { func: &'static str, floors: usize },

    #[error("`{func}`: 節點 {node_id} 不存在")]
    NodeNotFound { func: &'static str, node_id: NodeID },

    #[error("`{func}`: 節點 {node_id} 尚未開放")]
    NodeNotAvailable { func: &'static str, node_id: NodeID },

    #[error("`{func}`: 節點 {node_id} 類型 {node_type} 不是獎勵節點")]
    NotRewardNode {
        func: &'static str,
        node_id: NodeID,
        node_type: NodeType,
    },

    #[error("`{func}`: 冒險已結束")]
    RunOver { func: &'static str },

    #[error("`{func}`: 設定解析失敗: {reason}")]
    ParseConfig { func: &'static str, reason: String },

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
