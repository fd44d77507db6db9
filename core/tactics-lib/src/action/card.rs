//! card.rs：
//! - 卡牌目標檢查（can_play）、可選目標預覽（valid_targets）與效果執行（execute_card）。
//! - execute_card 不重新檢查合法性，呼叫端必須先通過 can_play。
//! - Loot 的抽棄流程由 GameManager 處理，這裡只視為無目標的自身效果。
use crate::*;
use cards_lib::{Card, CardEffect, Targeting};

/// 距離以施放者為中心的 Chebyshev 計算
pub fn can_play(board: &Board, caster: UnitID, card: &Card, target: Pos) -> bool {
    let Some(unit) = board.live_unit(caster) else {
        return false;
    };
    let Some(from) = board.unit_pos(caster) else {
        return false;
    };
    if !board.grid.is_in_bounds(target) || from.chebyshev(target) > card.range {
        return false;
    }
    match card.effect.targeting() {
        Targeting::Enemy => board
            .get_unit_at(target)
            .is_some_and(|target| target.team == Team::Enemy),
        Targeting::Caster => match card.effect {
            CardEffect::Heal => unit.hp < unit.max_hp,
            _ => true,
        },
        Targeting::EmptyCell => board.is_walkable(target),
        Targeting::AnyCell => true,
        Targeting::Invalid => false,
    }
}

/// 所有可施放的目標格，供介面高亮
pub fn valid_targets(board: &Board, caster: UnitID, card: &Card) -> Vec<Pos> {
    let mut targets = Vec::new();
    for y in 0..board.grid.height {
        for x in 0..board.grid.width {
            let pos = Pos { x, y };
            if can_play(board, caster, card, pos) {
                targets.push(pos);
            }
        }
    }
    targets
}

pub fn execute_card(
    board: &mut Board,
    events: &mut EventBus,
    config: &GameConfig,
    caster: UnitID,
    card: &Card,
    target: Pos,
) -> Result<()> {
    let func = "execute_card";

    match &card.effect {
        CardEffect::Damage => {
            if let Some(target_id) = enemy_at(board, target) {
                deal_damage(board, events, Some(caster), target_id, card.value);
            }
        }
        CardEffect::Cleave => {
            if enemy_at(board, target).is_none() {
                return Ok(());
            }
            let hit: Vec<UnitID> = board
                .enemies()
                .into_iter()
                .filter(|id| {
                    board
                        .unit_pos(*id)
                        .is_some_and(|pos| pos.chebyshev(target) <= 1)
                })
                .collect();
            for target_id in hit {
                deal_damage(board, events, Some(caster), target_id, card.value);
            }
        }
        CardEffect::Poison {
            damage_per_tick,
            ticks,
        } => {
            if let Some(target_id) = enemy_at(board, target) {
                deal_damage(board, events, Some(caster), target_id, card.value);
                apply_poison(board, events, target_id, *damage_per_tick, *ticks);
            }
        }
        CardEffect::Heal => {
            heal(board, events, caster, card.value);
        }
        CardEffect::Shield => {
            add_shield(board, events, caster, card.value, config.combat.shield_cap);
        }
        CardEffect::Dash => {
            move_unit(board, events, caster, target).map_err(|e| Error::Wrap {
                func,
                source: Box::new(e),
            })?;
        }
        CardEffect::Summon => {
            let turret = Unit::new(UnitKind::Turret, card.value).with_mana(0);
            spawn_unit(board, events, turret, target).map_err(|e| Error::Wrap {
                func,
                source: Box::new(e),
            })?;
        }
        CardEffect::Loot { .. } => {}
        CardEffect::Terrain { kind, duration } => {
            board.grid.add_tile_effect(target, *kind, *duration);
        }
        CardEffect::Unknown => {
            tracing::warn!("card {} has an unknown effect, nothing happens", card.id);
        }
    }
    Ok(())
}

fn enemy_at(board: &Board, pos: Pos) -> Option<UnitID> {
    board
        .get_unit_at(pos)
        .filter(|unit| unit.team == Team::Enemy)
        .map(|unit| unit.id)
}
