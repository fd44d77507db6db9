//! ai.rs：
//! - 敵人每回合依序行動：中毒發作 → 攻擊玩家 → 攻擊砲塔 → 逃跑或接近。
//! - 決策（decide_enemy_action）是純查詢，執行（take_enemy_turn）才經由 battle.rs 改動狀態。
//! - 砲塔不走這條流程，由 resolve_defenders 在敵方階段結束時統一開火。
use crate::*;

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum EnemyDecision {
    Attack { target: UnitID },
    /// steps 為實際走過的路徑長度，繞路時可能大於直線距離
    Flee { to: Pos, steps: Steps },
    Approach { to: Pos, steps: Steps },
    Wait,
}

/// 一個敵人行動的結果
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct EnemyTurnReport {
    pub unit_id: UnitID,
    pub poison: Option<DamageResult>,
    /// 被中毒毒死時為 None
    pub decision: Option<EnemyDecision>,
}

/// 砲塔的一次射擊
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DefenderShot {
    pub turret: UnitID,
    pub target: UnitID,
    pub result: DamageResult,
}

pub fn decide_enemy_action(board: &Board, config: &GameConfig, enemy_id: UnitID) -> EnemyDecision {
    let Some(enemy) = board.live_unit(enemy_id) else {
        return EnemyDecision::Wait;
    };
    let Some(profile) = config.profile(enemy.kind) else {
        return EnemyDecision::Wait;
    };
    let Some(from) = board.unit_pos(enemy_id) else {
        return EnemyDecision::Wait;
    };
    let Some(player_id) = board.player_id() else {
        return EnemyDecision::Wait;
    };
    let Some(player_pos) = board.unit_pos(player_id) else {
        return EnemyDecision::Wait;
    };

    let distance = from.chebyshev(player_pos);
    if profile.in_range(distance) {
        return EnemyDecision::Attack { target: player_id };
    }

    if let Some(turret) = nearest_in_band(board, from, &board.turrets(), |d| profile.in_range(d)) {
        return EnemyDecision::Attack { target: turret };
    }

    let fleeing = profile.flee_radius.is_some_and(|radius| distance <= radius);
    if fleeing {
        return flee_from(board, from, player_pos, profile.flee_budget);
    }

    approach(board, from, player_pos, enemy.move_points)
}

/// 中毒先發作，存活才決策並執行
pub fn take_enemy_turn(
    board: &mut Board,
    events: &mut EventBus,
    config: &GameConfig,
    enemy_id: UnitID,
) -> Result<EnemyTurnReport> {
    let func = "take_enemy_turn";

    if let Some(enemy) = board.unit_mut(enemy_id) {
        enemy.refresh();
    }
    let poison = apply_poison_tick(board, events, enemy_id);
    if board.live_unit(enemy_id).is_none() {
        tracing::debug!("enemy {enemy_id} cannot act");
        return Ok(EnemyTurnReport {
            unit_id: enemy_id,
            poison,
            decision: None,
        });
    }

    let decision = decide_enemy_action(board, config, enemy_id);
    tracing::debug!("enemy {enemy_id} decides {decision:?}");
    match &decision {
        EnemyDecision::Attack { target } => {
            let damage = board
                .unit(enemy_id)
                .and_then(|enemy| config.profile(enemy.kind))
                .map_or(0, |profile| profile.damage);
            deal_damage(board, events, Some(enemy_id), *target, damage);
        }
        EnemyDecision::Flee { to, steps } | EnemyDecision::Approach { to, steps } => {
            move_unit(board, events, enemy_id, *to).map_err(|e| Error::Wrap {
                func,
                source: Box::new(e),
            })?;
            if let Some(enemy) = board.unit_mut(enemy_id) {
                enemy.move_points = enemy.move_points.saturating_sub(*steps);
            }
        }
        EnemyDecision::Wait => {}
    }

    Ok(EnemyTurnReport {
        unit_id: enemy_id,
        poison,
        decision: Some(decision),
    })
}

/// 每個存活砲塔射擊最近的射程內敵人，依 id 順序
pub fn resolve_defenders(
    board: &mut Board,
    events: &mut EventBus,
    config: &GameConfig,
) -> Vec<DefenderShot> {
    let mut shots = Vec::new();
    for turret in board.turrets() {
        let Some(from) = board.unit_pos(turret) else {
            continue;
        };
        let enemies = board.enemies();
        let Some(target) =
            nearest_in_band(board, from, &enemies, |d| config.turret.in_range(d))
        else {
            continue;
        };
        let result = deal_damage(board, events, Some(turret), target, config.turret.damage);
        tracing::debug!("turret {turret} fires at {target}: {result:?}");
        shots.push(DefenderShot {
            turret,
            target,
            result,
        });
    }
    shots
}

/// 同距離時取 id 較小者
fn nearest_in_band(
    board: &Board,
    from: Pos,
    candidates: &[UnitID],
    in_band: impl Fn(usize) -> bool,
) -> Option<UnitID> {
    candidates
        .iter()
        .filter_map(|id| Some((*id, board.unit_pos(*id)?.chebyshev(from))))
        .filter(|(_, distance)| in_band(*distance))
        .min_by_key(|(id, distance)| (*distance, *id))
        .map(|(id, _)| id)
}

/// 可達格中離玩家最遠者；先比 Chebyshev 再比 Manhattan，同分取先探索到的
fn flee_from(board: &Board, from: Pos, player_pos: Pos, budget: Steps) -> EnemyDecision {
    let current = (from.chebyshev(player_pos), from.manhattan(player_pos));
    let mut best: Option<(ReachableTile, (usize, usize))> = None;
    for tile in reachable_tiles(board, from, budget) {
        let score = (tile.pos.chebyshev(player_pos), tile.pos.manhattan(player_pos));
        if best.as_ref().is_none_or(|(_, best_score)| score > *best_score) {
            best = Some((tile, score));
        }
    }
    match best {
        Some((tile, score)) if score > current => EnemyDecision::Flee {
            to: tile.pos,
            steps: tile.steps,
        },
        _ => EnemyDecision::Wait,
    }
}

/// 沿最短路徑前進，最多走到玩家前一格
fn approach(board: &Board, from: Pos, player_pos: Pos, move_points: Steps) -> EnemyDecision {
    let Some(path) = find_path(board, from, player_pos) else {
        return EnemyDecision::Wait;
    };
    if path.len() < 3 {
        return EnemyDecision::Wait;
    }
    let index = (path.len() - 2).min(move_points);
    if index == 0 {
        return EnemyDecision::Wait;
    }
    EnemyDecision::Approach {
        to: path[index],
        steps: index,
    }
}
