//! 腳本玩家：能出牌就出牌，否則往最近的敵人走，最後結束回合
use anyhow::{Result, bail};
use run_lib::{Floor, Gold, RunAction, RunStatus, Seed};
use tactics_lib::{
    CardSelection, ClickResult, GameManager, Outcome, Phase, Pos, find_path,
};

/// 零費的抽牌卡可能無限循環
const MAX_PLAYS_PER_TURN: usize = 12;

#[derive(Debug, Default)]
pub struct RunSummary {
    pub status: RunStatus,
    pub floor: Floor,
    pub gold: Gold,
    pub hp: i32,
    pub max_hp: i32,
    pub deck_size: usize,
    pub victories: usize,
    pub defeats: usize,
}

pub fn play_run(
    gm: &mut GameManager,
    seed: Seed,
    max_turns: u32,
    max_nodes: usize,
) -> Result<RunSummary> {
    gm.start_new_run(seed)?;
    let mut summary = RunSummary::default();

    for _ in 0..max_nodes {
        let Some(run) = gm.run() else {
            bail!("run disappeared");
        };
        if run.state.is_over() {
            break;
        }
        let Some(node_id) = run.progress.frontier.iter().next().cloned() else {
            bail!("no node left to enter");
        };
        summary.floor = run.map.get_node(&node_id)?.floor;

        gm.select_node(&node_id)?;
        match gm.enter_selected()? {
            RunAction::None => bail!("node {node_id} cannot be entered"),
            RunAction::Modal(node) => {
                let reward = gm.apply_node_reward(&node.id)?;
                tracing::info!("{} {}: {reward:?}", node.node_type, node.id);
            }
            RunAction::Encounter(descriptor) => {
                match play_encounter(gm, max_turns)? {
                    Phase::Victory => summary.victories += 1,
                    Phase::Defeat => summary.defeats += 1,
                    phase => bail!("encounter {} stopped in {phase}", descriptor.node_id),
                }
            }
        }
    }

    if let Some(run) = gm.run() {
        summary.status = run.state.status;
        summary.gold = run.state.gold;
        summary.hp = run.state.hp;
        summary.max_hp = run.state.max_hp;
        summary.deck_size = run.state.master_deck.len();
    }
    Ok(summary)
}

/// 打到勝負分曉；超過回合上限就放棄
fn play_encounter(gm: &mut GameManager, max_turns: u32) -> Result<Phase> {
    while gm.phase() == Phase::PlayerTurn {
        if gm.turn() > max_turns {
            tracing::warn!("turn limit reached, abandoning");
            gm.abandon_encounter();
            break;
        }
        let mut plays = 0;
        while plays < MAX_PLAYS_PER_TURN && gm.phase() == Phase::PlayerTurn && play_any_card(gm)? {
            plays += 1;
        }
        if gm.phase() != Phase::PlayerTurn {
            break;
        }
        step_towards_enemy(gm)?;
        gm.end_turn()?;
    }
    Ok(gm.phase())
}

/// 依手牌順序找第一張打得出去的牌
fn play_any_card(gm: &mut GameManager) -> Result<bool> {
    let mana = gm.player().map_or(0, |unit| unit.mana);
    for index in 0..gm.hand().len() {
        if gm.hand()[index].cost > mana {
            continue;
        }
        let Outcome::Accepted(CardSelection::Selected { targets, .. }) = gm.select_card(index)
        else {
            gm.clear_card_selection();
            continue;
        };
        let Some(target) = targets.first().copied() else {
            gm.clear_card_selection();
            continue;
        };
        match gm.tile_clicked(target)? {
            Outcome::Accepted(ClickResult::CardPlayed {
                discard_pending, ..
            }) => {
                for _ in 0..discard_pending {
                    gm.discard_from_hand(0);
                }
                return Ok(true);
            }
            _ => gm.clear_card_selection(),
        }
    }
    Ok(false)
}

fn step_towards_enemy(gm: &mut GameManager) -> Result<()> {
    let Some(player) = gm.player() else {
        return Ok(());
    };
    let Some(from) = gm.board.unit_pos(player.id) else {
        return Ok(());
    };
    let move_points = player.move_points;

    let nearest = gm
        .board
        .enemies()
        .into_iter()
        .filter_map(|id| gm.board.unit_pos(id))
        .filter_map(|pos| find_path(&gm.board, from, pos))
        .min_by_key(|path| path.len());
    let Some(path) = nearest else {
        return Ok(());
    };
    if path.len() < 3 {
        return Ok(());
    }
    let index = (path.len() - 2).min(move_points);
    if index == 0 {
        return Ok(());
    }
    let to: Pos = path[index];
    gm.tile_clicked(to)?;
    Ok(())
}
