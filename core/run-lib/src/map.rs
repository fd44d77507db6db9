//! 分支地圖生成
//! - 第 0 層到倒數第二層每層 2~3 個節點（第 0 層固定 2 個），最後一層只有 Boss
//! - 中段固定一層商店
//! - 每個節點連到下一層 1~2 個節點，下一層每個節點至少有一條入邊
use crate::*;
use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom, seq::SliceRandom};
use std::collections::BTreeMap;

pub const BOSS_NODE_ID: &str = "boss";

const THREE_NODES_CHANCE: f64 = 0.55;
const TWO_EDGES_CHANCE: f64 = 0.55;
const EVENT_CHANCE: f64 = 0.14;
const REWARD_CHANCE: f64 = 0.26;

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
pub enum NodeType {
    Fight,
    Reward,
    Event,
    Shop,
    Boss,
}

impl NodeType {
    /// 進入後會開啟戰鬥
    pub fn is_combat(&self) -> bool {
        matches!(self, NodeType::Fight | NodeType::Boss)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct MapNode {
    pub id: NodeID,
    pub floor: Floor,
    pub index: usize,
    pub node_type: NodeType,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RunMap {
    pub seed: Seed,
    pub floors: usize,
    pub nodes_by_floor: Vec<Vec<NodeID>>,
    pub nodes: BTreeMap<NodeID, MapNode>,
    /// (from, to)
    pub edges: Vec<(NodeID, NodeID)>,
}

impl RunMap {
    pub fn generate(floors: usize, seed: Seed) -> Result<Self> {
        let func = "RunMap::generate";

        if floors < 2 {
            return Err(Error::InvalidFloorCount { func, floors });
        }
        let mut rng = StdRng::seed_from_u64(seed);
        let normal_floors = floors - 1;

        // 避開第 0 層與最後一個普通層
        let shop_floor = (normal_floors as i64 - 2)
            .min(3 + rng.random_range(0..3))
            .max(2) as usize;

        let mut nodes_by_floor = Vec::with_capacity(floors);
        let mut nodes = BTreeMap::new();
        for floor in 0..normal_floors {
            let count = if floor == 0 || !rng.random_bool(THREE_NODES_CHANCE) {
                2
            } else {
                3
            };
            let mut floor_nodes = Vec::with_capacity(count);
            for index in 0..count {
                let node_type = if floor == shop_floor {
                    if index == 1 {
                        NodeType::Shop
                    } else {
                        NodeType::Fight
                    }
                } else if floor > 0 {
                    let roll: f64 = rng.random();
                    if roll < EVENT_CHANCE {
                        NodeType::Event
                    } else if roll < REWARD_CHANCE {
                        NodeType::Reward
                    } else {
                        NodeType::Fight
                    }
                } else {
                    NodeType::Fight
                };
                let id = format!("{floor}-{index}");
                floor_nodes.push(id.clone());
                nodes.insert(
                    id.clone(),
                    MapNode {
                        id,
                        floor,
                        index,
                        node_type,
                    },
                );
            }
            nodes_by_floor.push(floor_nodes);
        }

        let boss = MapNode {
            id: BOSS_NODE_ID.to_string(),
            floor: floors - 1,
            index: 0,
            node_type: NodeType::Boss,
        };
        nodes_by_floor.push(vec![boss.id.clone()]);
        nodes.insert(boss.id.clone(), boss);

        let mut edges = Vec::new();
        for floor in 0..nodes_by_floor.len() - 1 {
            let from = &nodes_by_floor[floor];
            let to = &nodes_by_floor[floor + 1];

            for a in from {
                let mut targets = to.clone();
                targets.shuffle(&mut rng);
                let degree = if to.len() == 1 || !rng.random_bool(TWO_EDGES_CHANCE) {
                    1
                } else {
                    2
                };
                for k in 0..degree {
                    edges.push((a.clone(), targets[k % targets.len()].clone()));
                }
            }

            for b in to {
                let has_incoming = edges.iter().any(|(u, v)| v == b && from.contains(u));
                if has_incoming {
                    continue;
                }
                if let Some(a) = from.choose(&mut rng) {
                    edges.push((a.clone(), b.clone()));
                }
            }
        }

        tracing::debug!(
            "generated run map: seed {seed}, {floors} floors, {} nodes, {} edges, shop floor {shop_floor}",
            nodes.len(),
            edges.len()
        );

        Ok(Self {
            seed,
            floors,
            nodes_by_floor,
            nodes,
            edges,
        })
    }

    pub fn node(&self, node_id: &str) -> Option<&MapNode> {
        self.nodes.get(node_id)
    }

    pub fn get_node(&self, node_id: &str) -> Result<&MapNode> {
        let func = "RunMap::get_node";

        self.nodes.get(node_id).ok_or_else(|| Error::NodeNotFound {
            func,
            node_id: node_id.to_string(),
        })
    }

    pub fn first_floor(&self) -> &[NodeID] {
        self.nodes_by_floor.first().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn outgoing<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a NodeID> + 'a {
        self.edges
            .iter()
            .filter(move |(from, _)| from == node_id)
            .map(|(_, to)| to)
    }
}
