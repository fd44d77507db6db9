//! 牌庫 / 手牌 / 棄牌堆
//! - deck 頂端為 Vec 尾端，抽牌即 pop
//! - deck + discard + hand 的 key 多重集合恆等於冒險的主牌組
use crate::*;
use cards_lib::{CardInstance, CardKey, CardLibrary};
use rand::{Rng, seq::SliceRandom};

#[derive(Debug, Clone, Default)]
pub struct DeckManager {
    pub deck: Vec<CardKey>,
    pub discard: Vec<CardKey>,
    pub hand: Vec<CardInstance>,
}

impl DeckManager {
    /// 以主牌組重建牌庫並洗牌，清空棄牌堆與手牌
    pub fn initialize_from_master_deck(
        &mut self,
        keys: &[CardKey],
        rng: &mut impl Rng,
        events: &mut EventBus,
    ) {
        self.deck = keys.to_vec();
        self.discard.clear();
        self.hand.clear();
        self.deck.shuffle(rng);

        events.publish(GameEvent::DeckChanged {
            size: self.deck.len(),
        });
        events.publish(GameEvent::DiscardChanged { size: 0 });
        events.publish(GameEvent::HandChanged { size: 0 });
    }

    /// 牌庫空且棄牌堆有牌時，整疊洗回牌庫
    pub fn refill_from_discard_if_empty(
        &mut self,
        rng: &mut impl Rng,
        events: &mut EventBus,
    ) -> bool {
        if !self.deck.is_empty() || self.discard.is_empty() {
            return false;
        }
        self.deck = std::mem::take(&mut self.discard);
        self.deck.shuffle(rng);
        tracing::debug!("reshuffled {} cards from discard", self.deck.len());

        events.publish(GameEvent::DeckChanged {
            size: self.deck.len(),
        });
        events.publish(GameEvent::DiscardChanged { size: 0 });
        true
    }

    /// 抽到手牌上限或沒有牌為止，回傳實際抽到的張數
    /// key 不在卡牌庫中屬於資料錯誤，該 key 會放回牌庫頂
    pub fn draw_to_hand(
        &mut self,
        count: usize,
        hand_limit: usize,
        library: &CardLibrary,
        rng: &mut impl Rng,
        events: &mut EventBus,
    ) -> Result<usize> {
        let func = "DeckManager::draw_to_hand";

        let mut drawn = 0;
        while drawn < count && self.hand.len() < hand_limit {
            self.refill_from_discard_if_empty(rng, events);
            let Some(key) = self.deck.pop() else {
                break;
            };
            match library.instantiate(&key) {
                Ok(card) => self.hand.push(card),
                Err(source) => {
                    self.deck.push(key);
                    return Err(Error::Cards { func, source });
                }
            }
            drawn += 1;
        }

        if drawn > 0 {
            events.publish(GameEvent::DeckChanged {
                size: self.deck.len(),
            });
            events.publish(GameEvent::HandChanged {
                size: self.hand.len(),
            });
        }
        Ok(drawn)
    }

    /// 超出範圍為 no-op
    pub fn discard_from_hand(
        &mut self,
        index: usize,
        events: &mut EventBus,
    ) -> Option<CardInstance> {
        if index >= self.hand.len() {
            return None;
        }
        let card = self.hand.remove(index);
        self.discard.push(card.key.clone());

        events.publish(GameEvent::DiscardChanged {
            size: self.discard.len(),
        });
        events.publish(GameEvent::HandChanged {
            size: self.hand.len(),
        });
        Some(card)
    }

    pub fn total_cards(&self) -> usize {
        self.deck.len() + self.discard.len() + self.hand.len()
    }

    /// 三個牌堆的所有 key，排序後回傳
    pub fn all_keys(&self) -> Vec<CardKey> {
        let mut keys: Vec<CardKey> = self
            .deck
            .iter()
            .chain(self.discard.iter())
            .cloned()
            .chain(self.hand.iter().map(|card| card.key.clone()))
            .collect();
        keys.sort();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn keys(list: &[&str]) -> Vec<CardKey> {
        list.iter().map(|k| k.to_string()).collect()
    }

    fn sorted(mut keys: Vec<CardKey>) -> Vec<CardKey> {
        keys.sort();
        keys
    }

    #[test]
    fn test_initialize_keeps_multiset() {
        let master = keys(&["strike", "strike", "heal", "dash", "guard"]);
        let mut rng = StdRng::seed_from_u64(7);
        let mut events = EventBus::default();
        let mut deck = DeckManager::default();
        deck.discard.push("junk".to_string());

        deck.initialize_from_master_deck(&master, &mut rng, &mut events);
        assert_eq!(sorted(deck.deck.clone()), sorted(master.clone()));
        assert!(deck.discard.is_empty());
        assert!(deck.hand.is_empty());
    }

    #[test]
    fn test_draw_respects_limit_and_supply() {
        let library = CardLibrary::builtin().unwrap();
        let master = keys(&["strike", "heal", "dash"]);
        let mut rng = StdRng::seed_from_u64(1);
        let mut events = EventBus::default();
        let mut deck = DeckManager::default();
        deck.initialize_from_master_deck(&master, &mut rng, &mut events);

        let test_data = [
            // (count, limit, drawn, hand_len)
            (1, 5, 1, 1),
            (5, 2, 1, 2),
            (5, 5, 1, 3),
            (5, 5, 0, 3),
        ];
        for (count, limit, drawn, hand_len) in test_data {
            let result = deck
                .draw_to_hand(count, limit, &library, &mut rng, &mut events)
                .unwrap();
            assert_eq!(result, drawn, "count {count} limit {limit}");
            assert_eq!(deck.hand.len(), hand_len);
            assert_eq!(deck.total_cards(), 3);
        }
    }

    #[test]
    fn test_draw_reshuffles_discard() {
        let library = CardLibrary::builtin().unwrap();
        let master = keys(&["strike", "heal"]);
        let mut rng = StdRng::seed_from_u64(3);
        let mut events = EventBus::default();
        let mut deck = DeckManager::default();
        deck.initialize_from_master_deck(&master, &mut rng, &mut events);

        deck.draw_to_hand(2, 5, &library, &mut rng, &mut events)
            .unwrap();
        deck.discard_from_hand(0, &mut events).unwrap();
        deck.discard_from_hand(0, &mut events).unwrap();
        assert!(deck.deck.is_empty());
        assert_eq!(deck.discard.len(), 2);

        let drawn = deck
            .draw_to_hand(1, 5, &library, &mut rng, &mut events)
            .unwrap();
        assert_eq!(drawn, 1);
        assert_eq!(deck.deck.len(), 1);
        assert!(deck.discard.is_empty());
        assert_eq!(deck.all_keys(), sorted(master));
    }

    #[test]
    fn test_refill_noop_cases() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut events = EventBus::default();
        let mut deck = DeckManager::default();
        assert!(!deck.refill_from_discard_if_empty(&mut rng, &mut events));

        deck.deck = keys(&["strike"]);
        deck.discard = keys(&["heal"]);
        assert!(!deck.refill_from_discard_if_empty(&mut rng, &mut events));
        assert_eq!(deck.deck, keys(&["strike"]));
    }

    #[test]
    fn test_discard_out_of_range() {
        let mut events = EventBus::default();
        let mut deck = DeckManager::default();
        assert!(deck.discard_from_hand(0, &mut events).is_none());
        assert!(deck.discard.is_empty());
    }

    #[test]
    fn test_unknown_key_fails_loudly() {
        let library = CardLibrary::builtin().unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let mut events = EventBus::default();
        let mut deck = DeckManager {
            deck: keys(&["meteor"]),
            ..Default::default()
        };
        let err = deck
            .draw_to_hand(1, 5, &library, &mut rng, &mut events)
            .unwrap_err();
        assert!(matches!(err, Error::Cards { .. }));
        assert_eq!(deck.deck, keys(&["meteor"]));
        assert!(deck.hand.is_empty());
    }

    #[test]
    fn test_conservation_under_random_ops() {
        let library = CardLibrary::builtin().unwrap();
        let master = library.starter_deck.clone();
        let mut rng = StdRng::seed_from_u64(42);
        let mut events = EventBus::default();
        let mut deck = DeckManager::default();
        deck.initialize_from_master_deck(&master, &mut rng, &mut events);

        for step in 0..200 {
            if rng.random_bool(0.5) {
                let count = rng.random_range(0..4);
                deck.draw_to_hand(count, 5, &library, &mut rng, &mut events)
                    .unwrap();
            } else {
                let index = rng.random_range(0..6);
                deck.discard_from_hand(index, &mut events);
            }
            assert!(deck.hand.len() <= 5, "step {step}");
            assert_eq!(deck.all_keys(), sorted(master.clone()), "step {step}");
        }
    }
}
