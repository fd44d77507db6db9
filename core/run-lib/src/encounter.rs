//! 戰鬥描述與節點種子
use crate::*;
use sha2::{Digest, Sha256};

/// 進入 FIGHT/BOSS 節點時交給戰鬥層的一次性描述
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct EncounterDescriptor {
    pub node_id: NodeID,
    pub node_type: NodeType,
    pub floor: Floor,
}

impl EncounterDescriptor {
    pub fn from_node(node: &MapNode) -> Self {
        Self {
            node_id: node.id.clone(),
            node_type: node.node_type,
            floor: node.floor,
        }
    }

    pub fn is_boss(&self) -> bool {
        self.node_type == NodeType::Boss
    }
}

/// run 種子 XOR sha256(node_id) 的前 8 bytes
pub fn node_seed(run_seed: Seed, node_id: &str) -> Seed {
    let mut hasher = Sha256::new();
    hasher.update(node_id.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[0..8]);
    run_seed ^ u64::from_le_bytes(bytes)
}
