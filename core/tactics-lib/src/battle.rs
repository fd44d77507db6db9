//! battle.rs：
//! - 所有生命、護盾、狀態與位置變動的唯一入口，每次變動都會發佈事件。
//! - 生命歸零的單位立即標記死亡並移出佔位索引，不會再被打第二次。
//! - 不負責合法性判斷（距離、路徑、法力），那是呼叫端的責任。
use crate::*;

/// 對已死亡目標或非正數傷害為 no-op
pub fn deal_damage(
    board: &mut Board,
    events: &mut EventBus,
    source: Option<UnitID>,
    target: UnitID,
    amount: i32,
) -> DamageResult {
    let Some(unit) = board.unit_mut(target) else {
        return DamageResult::default();
    };
    if unit.is_dead || amount <= 0 {
        return DamageResult::default();
    }
    let result = unit.apply_damage(amount);
    tracing::debug!(
        "unit {target} takes {amount} from {source:?}: absorbed {}, hp lost {}",
        result.absorbed,
        result.hp_lost
    );
    events.publish(GameEvent::UnitDamaged {
        source,
        target,
        amount: result.dealt,
        absorbed: result.absorbed,
        hp_lost: result.hp_lost,
    });
    if result.died {
        kill_unit(board, events, target);
    }
    result
}

/// 標記死亡並移出佔位，單位資料保留在 board.units
pub fn kill_unit(board: &mut Board, events: &mut EventBus, unit_id: UnitID) {
    let Some(unit) = board.unit_mut(unit_id) else {
        return;
    };
    unit.is_dead = true;
    unit.hp = 0;
    let pos = board.evict(unit_id);
    tracing::debug!("unit {unit_id} died at {pos:?}");
    events.publish(GameEvent::UnitDied { unit_id, pos });
}

/// 只在實際回復時發佈事件
pub fn heal(board: &mut Board, events: &mut EventBus, unit_id: UnitID, amount: i32) -> i32 {
    let healed = board
        .unit_mut(unit_id)
        .map_or(0, |unit| unit.heal(amount));
    if healed > 0 {
        events.publish(GameEvent::UnitHealed {
            unit_id,
            amount: healed,
        });
    }
    healed
}

pub fn add_shield(
    board: &mut Board,
    events: &mut EventBus,
    unit_id: UnitID,
    amount: i32,
    cap: Option<i32>,
) -> i32 {
    let added = board
        .unit_mut(unit_id)
        .map_or(0, |unit| unit.add_shield(amount, cap));
    if added > 0 {
        events.publish(GameEvent::UnitShielded {
            unit_id,
            amount: added,
        });
    }
    added
}

pub fn apply_poison(
    board: &mut Board,
    events: &mut EventBus,
    unit_id: UnitID,
    damage_per_tick: i32,
    ticks: u32,
) -> bool {
    let applied = board
        .unit_mut(unit_id)
        .is_some_and(|unit| unit.add_poison(damage_per_tick, ticks));
    if applied {
        events.publish(GameEvent::UnitPoisoned {
            unit_id,
            damage_per_tick,
            ticks,
        });
    }
    applied
}

/// 中毒發作一次；單位因此死亡時回傳的結果 died 為 true
pub fn apply_poison_tick(
    board: &mut Board,
    events: &mut EventBus,
    unit_id: UnitID,
) -> Option<DamageResult> {
    let result = board.unit_mut(unit_id)?.tick_poison()?;
    tracing::debug!("unit {unit_id} suffers {} poison damage", result.dealt);
    events.publish(GameEvent::UnitDamaged {
        source: None,
        target: unit_id,
        amount: result.dealt,
        absorbed: result.absorbed,
        hp_lost: result.hp_lost,
    });
    if result.died {
        kill_unit(board, events, unit_id);
    }
    Some(result)
}

/// 直接寫入位置，不檢查路徑與移動點數
pub fn move_unit(board: &mut Board, events: &mut EventBus, unit_id: UnitID, to: Pos) -> Result<()> {
    let func = "move_unit";

    let from = board.relocate(unit_id, to).map_err(|e| Error::Wrap {
        func,
        source: Box::new(e),
    })?;
    events.publish(GameEvent::UnitMoved { unit_id, from, to });
    Ok(())
}

pub fn spawn_unit(
    board: &mut Board,
    events: &mut EventBus,
    unit: Unit,
    pos: Pos,
) -> Result<UnitID> {
    let func = "spawn_unit";

    let kind = unit.kind;
    let team = unit.team;
    let unit_id = board.add_unit(unit, pos).map_err(|e| Error::Wrap {
        func,
        source: Box::new(e),
    })?;
    events.publish(GameEvent::UnitSpawned {
        unit_id,
        kind,
        team,
        pos,
    });
    Ok(unit_id)
}
