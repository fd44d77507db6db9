//! 牌庫守恆測試

mod test_helpers;

use cards_lib::CardKey;
use rand::{Rng, SeedableRng, rngs::StdRng};
use tactics_lib::*;
use test_helpers::*;

fn master_deck() -> Vec<CardKey> {
    cards_lib::CardLibrary::builtin().unwrap().starter_deck
}

fn sorted(mut keys: Vec<CardKey>) -> Vec<CardKey> {
    keys.sort();
    keys
}

#[test]
fn test_shuffle_keeps_multiset() {
    let keys = master_deck();
    for seed in 0..10 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut events = EventBus::default();
        let mut deck = DeckManager::default();
        deck.initialize_from_master_deck(&keys, &mut rng, &mut events);
        assert_eq!(sorted(deck.deck.clone()), sorted(keys.clone()), "seed {seed}");
        assert!(deck.discard.is_empty());
        assert!(deck.hand.is_empty());
    }
}

#[test]
fn test_random_operations_conserve_cards() {
    let library = cards_lib::CardLibrary::builtin().unwrap();
    let keys = master_deck();
    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut events = EventBus::default();
        let mut deck = DeckManager::default();
        deck.initialize_from_master_deck(&keys, &mut rng, &mut events);

        for _ in 0..200 {
            match rng.random_range(0..3) {
                0 => {
                    let count = rng.random_range(0..4);
                    deck.draw_to_hand(count, 5, &library, &mut rng, &mut events)
                        .unwrap();
                }
                1 => {
                    let index = rng.random_range(0..7);
                    deck.discard_from_hand(index, &mut events);
                }
                _ => {
                    deck.refill_from_discard_if_empty(&mut rng, &mut events);
                }
            }
            assert_eq!(deck.total_cards(), keys.len(), "seed {seed}");
            assert!(deck.hand.len() <= 5, "seed {seed}");
        }
        assert_eq!(deck.all_keys(), sorted(keys.clone()), "seed {seed}");
    }
}

#[test]
fn test_encounter_deck_conserved_across_turns() {
    let (mut gm, _, _) = start_encounter(
        GameConfig::default(),
        cards_lib::CardLibrary::builtin().unwrap(),
        r#"
P . . . . . . M
"#,
    );
    let keys = sorted(gm.library.starter_deck.clone());
    for _ in 0..6 {
        assert_eq!(gm.deck.all_keys(), keys);
        gm.end_turn().unwrap();
        if gm.phase() != Phase::PlayerTurn {
            break;
        }
    }
    assert_eq!(gm.deck.all_keys(), keys);
}
