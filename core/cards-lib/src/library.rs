//! 卡牌庫載入與實例化
use crate::*;
use std::collections::BTreeMap;

const DEFAULT_CARDS_TOML: &str = include_str!("../data/cards.toml");

/// 卡牌庫：模板、起始牌組與獎勵池
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct CardLibrary {
    #[serde(default)]
    pub cards: BTreeMap<CardKey, Card>,
    #[serde(default)]
    pub starter_deck: Vec<CardKey>,
    #[serde(default)]
    pub reward_pool: Vec<CardKey>,
}

impl CardLibrary {
    /// 內嵌的預設卡牌庫
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(DEFAULT_CARDS_TOML)
    }

    /// 從 TOML 字串載入，並檢查起始牌組與獎勵池的 key 都存在
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let func = "CardLibrary::from_toml_str";

        let mut library: CardLibrary = toml::from_str(content).map_err(|e| Error::ParseCards {
            func,
            reason: e.to_string(),
        })?;
        for (key, card) in library.cards.iter_mut() {
            if card.id.is_empty() {
                card.id = key.clone();
            }
            if card.name.is_empty() {
                card.name = key.clone();
            }
        }
        library.check_list(func, "starter_deck", &library.starter_deck)?;
        library.check_list(func, "reward_pool", &library.reward_pool)?;
        Ok(library)
    }

    pub fn get(&self, key: &str) -> Option<&Card> {
        self.cards.get(key)
    }

    /// 依 key 複製出一張卡牌實例
    pub fn instantiate(&self, key: &str) -> Result<CardInstance> {
        let func = "CardLibrary::instantiate";

        let card = self.cards.get(key).ok_or_else(|| Error::CardNotFound {
            func,
            key: key.to_string(),
        })?;
        Ok(CardInstance {
            key: key.to_string(),
            card: card.clone(),
        })
    }

    fn check_list(&self, func: &'static str, list: &'static str, keys: &[CardKey]) -> Result<()> {
        match keys.iter().find(|key| !self.cards.contains_key(*key)) {
            Some(key) => Err(Error::DanglingCardKey {
                func,
                list,
                key: key.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_library() {
        let library = CardLibrary::builtin().unwrap();
        let test_data = [
            ("strike", 1, 8, 2),
            ("fireball", 2, 5, 3),
            ("heal", 1, 5, 0),
            ("dash", 1, 0, 3),
            ("turret", 3, 10, 2),
            ("cleave", 2, 5, 1),
            ("venom", 1, 3, 2),
            ("guard", 1, 6, 0),
            ("scavenge", 0, 0, 0),
            ("firewall", 1, 2, 3),
        ];
        for (key, cost, value, range) in test_data {
            let card = library.get(key).unwrap();
            assert_eq!(card.id, key);
            assert_eq!(
                (card.cost, card.value, card.range),
                (cost, value, range),
                "card {key}"
            );
        }
        assert_eq!(library.starter_deck.len(), 10);
        assert_eq!(
            library
                .starter_deck
                .iter()
                .filter(|k| k.as_str() == "strike")
                .count(),
            3
        );
    }

    #[test]
    fn test_instantiate() {
        let library = CardLibrary::builtin().unwrap();
        let instance = library.instantiate("venom").unwrap();
        assert_eq!(instance.key, "venom");
        assert_eq!(
            instance.effect,
            CardEffect::Poison {
                damage_per_tick: 2,
                ticks: 3
            }
        );

        let err = library.instantiate("meteor").unwrap_err();
        assert!(matches!(err, Error::CardNotFound { ref key, .. } if key == "meteor"));
    }

    #[test]
    fn test_dangling_starter_key() {
        let content = r#"
starter_deck = ["strike", "missing"]

[cards.strike]
cost = 1
value = 8
range = 2
effect = { type = "damage" }
"#;
        let err = CardLibrary::from_toml_str(content).unwrap_err();
        assert!(matches!(
            err,
            Error::DanglingCardKey {
                list: "starter_deck",
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_effect_loads() {
        let content = r#"
[cards.meteor]
cost = 2
value = 20
range = 5
effect = { type = "meteor_shower" }
"#;
        let library = CardLibrary::from_toml_str(content).unwrap();
        let card = library.get("meteor").unwrap();
        assert_eq!(card.effect, CardEffect::Unknown);
        assert_eq!(card.name, "meteor");
    }

    #[test]
    fn test_malformed_toml() {
        let err = CardLibrary::from_toml_str("[cards.strike\ncost = ").unwrap_err();
        assert!(matches!(err, Error::ParseCards { .. }));
    }
}
