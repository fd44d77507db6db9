//! 冒險層的平衡數值
use crate::*;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct RunConfig {
    /// 包含最後的 Boss 層
    pub floors: usize,
    pub start_gold: Gold,
    pub reward_gold_min: Gold,
    pub reward_gold_max: Gold,
    pub shop_price: Gold,
    /// 事件節點治療量，以最大生命的百分比計
    pub event_heal_percent: i32,
    pub event_hazard_damage: i32,
    pub event_hazard_gold: Gold,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            floors: 9,
            start_gold: 0,
            reward_gold_min: 15,
            reward_gold_max: 30,
            shop_price: 30,
            event_heal_percent: 25,
            event_hazard_damage: 5,
            event_hazard_gold: 20,
        }
    }
}

impl RunConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let func = "RunConfig::from_toml_str";

        toml::from_str(content).map_err(|e| Error::ParseConfig {
            func,
            reason: e.to_string(),
        })
    }
}
