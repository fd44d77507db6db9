//! 非戰鬥節點（REWARD / EVENT / SHOP）的結算
use crate::*;
use cards_lib::CardKey;
use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum NodeReward {
    Treasure {
        gold: Gold,
        card: Option<CardKey>,
    },
    EventHeal {
        healed: i32,
    },
    /// 以生命換取金幣
    EventHazard {
        hp_lost: i32,
        gold: Gold,
    },
    ShopPurchase {
        card: CardKey,
        price: Gold,
    },
    /// 金幣不足或沒有可買的卡
    ShopSkipped {
        price: Gold,
    },
}

/// 依節點種子擲骰並套用到 state，不檢查節點是否可進入
pub fn resolve_node_reward(
    state: &mut RunState,
    node: &MapNode,
    config: &RunConfig,
    reward_pool: &[CardKey],
) -> Result<NodeReward> {
    let func = "resolve_node_reward";

    let mut rng = StdRng::seed_from_u64(node_seed(state.seed, &node.id));
    let reward = match node.node_type {
        NodeType::Reward => {
            let low = config.reward_gold_min.min(config.reward_gold_max);
            let gold = rng.random_range(low..=config.reward_gold_max.max(low));
            let card = reward_pool.choose(&mut rng).cloned();
            state.add_gold(gold);
            if let Some(card) = &card {
                state.master_deck.push(card.clone());
            }
            NodeReward::Treasure { gold, card }
        }
        NodeType::Event => {
            if rng.random_bool(0.5) {
                let amount = (state.max_hp * config.event_heal_percent / 100).max(1);
                let healed = state.heal(amount);
                NodeReward::EventHeal { healed }
            } else {
                let hp_lost = state.lose_hp_nonlethal(config.event_hazard_damage);
                state.add_gold(config.event_hazard_gold);
                NodeReward::EventHazard {
                    hp_lost,
                    gold: config.event_hazard_gold,
                }
            }
        }
        NodeType::Shop => {
            let price = config.shop_price;
            match reward_pool.choose(&mut rng) {
                Some(card) if state.spend_gold(price) => {
                    state.master_deck.push(card.clone());
                    NodeReward::ShopPurchase {
                        card: card.clone(),
                        price,
                    }
                }
                _ => NodeReward::ShopSkipped { price },
            }
        }
        NodeType::Fight | NodeType::Boss => {
            return Err(Error::NotRewardNode {
                func,
                node_id: node.id.clone(),
                node_type: node.node_type,
            });
        }
    };
    Ok(reward)
}
