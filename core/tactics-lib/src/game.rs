//! game.rs：
//! - GameManager 擁有一場冒險與目前戰鬥的全部狀態，所有外部指令都從這裡進來。
//! - 回合狀態機：Setup → PlayerTurn → EnemyTurn → PlayerTurn … → Victory / Defeat。
//! - 玩家的非法操作回傳 Outcome::Rejected 並保持狀態不變；只有資料錯誤才回傳 Err。
//! - 敵方階段一次處理一個敵人，每一步之後交給 Pacer 決定要不要停頓。
use crate::*;
use cards_lib::{CardEffect, CardInstance, CardKey, CardLibrary};
use rand::{Rng, SeedableRng, rngs::StdRng};
use run_lib::{EncounterDescriptor, NodeReward, Run, RunAction, Seed, node_seed};
use std::collections::VecDeque;

#[derive(Debug, Serialize, Clone, Copy, Display, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    Setup,
    PlayerTurn,
    EnemyTurn,
    Victory,
    Defeat,
}

/// 指令被拒絕的原因
#[derive(Debug, Serialize, Clone, Copy, Display, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Rejection {
    NoEncounter,
    NotPlayerTurn,
    AwaitingDiscard,
    NotAwaitingDiscard,
    NoCardSelected,
    CardIndexOutOfRange,
    NotEnoughMana,
    InvalidTarget,
    NotEnoughMovePoints,
    NoPath,
    NoPlayer,
    OutOfBounds,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Accepted(T),
    Rejected(Rejection),
}

impl<T> Outcome<T> {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted(_))
    }

    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            Outcome::Accepted(_) => None,
            Outcome::Rejected(reason) => Some(*reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CardSelection {
    /// targets 為可施放的格子，供高亮
    Selected {
        index: usize,
        key: CardKey,
        targets: Vec<Pos>,
    },
    /// 再次選取同一張牌即取消
    Cleared,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClickResult {
    CardPlayed {
        key: CardKey,
        target: Pos,
        /// 之後必須棄掉的張數
        discard_pending: usize,
    },
    Moved {
        path: Vec<Pos>,
    },
}

/// 敵方階段的一步
#[derive(Debug, Clone, PartialEq)]
pub enum EnemyStep {
    Enemy(EnemyTurnReport),
    Defenders(Vec<DefenderShot>),
}

/// 敵方階段每一步之後呼叫，實作可用來等待動畫
pub trait Pacer {
    fn pause(&mut self, step: &EnemyStep);
}

/// 不停頓，供測試與批次模擬使用
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPause;

impl Pacer for NoPause {
    fn pause(&mut self, _step: &EnemyStep) {}
}

pub struct GameManager {
    pub config: GameConfig,
    pub library: CardLibrary,
    pub board: Board,
    pub deck: DeckManager,
    pub events: EventBus,
    pub run: Option<Run>,
    phase: Phase,
    encounter: Option<EncounterDescriptor>,
    selected_card: Option<usize>,
    pending_discard: usize,
    turn: u32,
    enemy_queue: VecDeque<UnitID>,
    defenders_done: bool,
    /// 結束通知（勝利、戰敗、放棄）已發出
    finished: bool,
    pacer: Box<dyn Pacer>,
    rng: StdRng,
}

impl GameManager {
    pub fn new(config: GameConfig, library: CardLibrary) -> Self {
        Self {
            config,
            library,
            board: Board::default(),
            deck: DeckManager::default(),
            events: EventBus::default(),
            run: None,
            phase: Phase::Setup,
            encounter: None,
            selected_card: None,
            pending_discard: 0,
            turn: 0,
            enemy_queue: VecDeque::new(),
            defenders_done: false,
            finished: false,
            pacer: Box::new(NoPause),
            rng: StdRng::seed_from_u64(0),
        }
    }

    pub fn with_pacer(mut self, pacer: impl Pacer + 'static) -> Self {
        self.pacer = Box::new(pacer);
        self
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&GameEvent) + 'static) -> ListenerID {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerID) -> bool {
        self.events.unsubscribe(id)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn encounter(&self) -> Option<&EncounterDescriptor> {
        self.encounter.as_ref()
    }

    pub fn selected_card(&self) -> Option<usize> {
        self.selected_card
    }

    pub fn pending_discard(&self) -> usize {
        self.pending_discard
    }

    pub fn hand(&self) -> &[CardInstance] {
        &self.deck.hand
    }

    pub fn player(&self) -> Option<&Unit> {
        self.board.player()
    }

    pub fn run(&self) -> Option<&Run> {
        self.run.as_ref()
    }

    fn in_combat(&self) -> bool {
        matches!(self.phase, Phase::PlayerTurn | Phase::EnemyTurn)
    }

    // ------------------------------------------------------------------
    // 冒險層
    // ------------------------------------------------------------------

    /// 以起始牌組與預設生命開始新冒險，清空任何戰鬥狀態
    pub fn start_new_run(&mut self, seed: Seed) -> Result<()> {
        let func = "GameManager::start_new_run";

        if self.in_combat() {
            return Err(Error::EncounterActive { func });
        }
        let run = Run::new(
            seed,
            self.config.run.clone(),
            self.library.starter_deck.clone(),
            self.config.player.max_hp,
        )
        .map_err(|source| Error::Run { func, source })?;
        self.run = Some(run);
        self.reset_encounter();
        self.events.publish(GameEvent::RunStarted { seed });
        Ok(())
    }

    pub fn select_node(&mut self, node_id: &str) -> Result<()> {
        let func = "GameManager::select_node";

        let run = self.run.as_mut().ok_or(Error::NoRun { func })?;
        run.select_node(node_id)
            .map_err(|source| Error::Run { func, source })
    }

    /// 戰鬥節點會直接開始戰鬥
    pub fn enter_selected(&mut self) -> Result<RunAction> {
        let func = "GameManager::enter_selected";

        if self.in_combat() {
            return Err(Error::EncounterActive { func });
        }
        let run = self.run.as_mut().ok_or(Error::NoRun { func })?;
        let action = run.enter_selected();
        if let RunAction::Encounter(descriptor) = &action {
            if let Err(e) = self.start_encounter(descriptor.clone()) {
                self.abort_setup();
                return Err(Error::Wrap {
                    func,
                    source: Box::new(e),
                });
            }
        }
        Ok(action)
    }

    /// 結算 REWARD / EVENT / SHOP 節點
    pub fn apply_node_reward(&mut self, node_id: &str) -> Result<NodeReward> {
        let func = "GameManager::apply_node_reward";

        if self.in_combat() {
            return Err(Error::EncounterActive { func });
        }
        let run = self.run.as_mut().ok_or(Error::NoRun { func })?;
        let reward = run
            .apply_node_reward(node_id, &self.library.reward_pool)
            .map_err(|source| Error::Run { func, source })?;
        self.events.publish(GameEvent::RewardApplied {
            node_id: node_id.to_string(),
            reward: reward.clone(),
        });
        self.events.publish(GameEvent::NodeCompleted {
            node_id: node_id.to_string(),
        });
        Ok(reward)
    }

    // ------------------------------------------------------------------
    // 戰鬥開始
    // ------------------------------------------------------------------

    /// 依節點種子產生佈局並開始戰鬥
    pub fn start_encounter(&mut self, descriptor: EncounterDescriptor) -> Result<()> {
        let func = "GameManager::start_encounter";

        if self.in_combat() {
            return Err(Error::EncounterActive { func });
        }
        let seed = self.encounter_seed(&descriptor);
        let layout = match generate_layout(&descriptor, &self.config, seed) {
            Ok(layout) => layout,
            Err(e) => {
                self.abort_setup();
                return Err(Error::Wrap {
                    func,
                    source: Box::new(e),
                });
            }
        };
        self.start_encounter_with_layout(descriptor, layout)
    }

    /// 使用指定佈局開始戰鬥；沒有冒險時以設定的預設值建立玩家
    pub fn start_encounter_with_layout(
        &mut self,
        descriptor: EncounterDescriptor,
        layout: EncounterLayout,
    ) -> Result<()> {
        let func = "GameManager::start_encounter_with_layout";

        if self.in_combat() {
            return Err(Error::EncounterActive { func });
        }
        let result = self.setup_encounter(descriptor, layout);
        if result.is_err() {
            self.abort_setup();
        }
        result
    }

    fn setup_encounter(
        &mut self,
        descriptor: EncounterDescriptor,
        layout: EncounterLayout,
    ) -> Result<()> {
        let func = "GameManager::setup_encounter";

        self.reset_encounter();
        self.rng = StdRng::seed_from_u64(self.encounter_seed(&descriptor));

        let (master_deck, hp, max_hp) = match self.run.as_mut() {
            Some(run) => {
                run.set_in_battle(true);
                (
                    run.state.master_deck.clone(),
                    run.state.hp,
                    run.state.max_hp,
                )
            }
            None => (
                self.library.starter_deck.clone(),
                self.config.player.max_hp,
                self.config.player.max_hp,
            ),
        };

        self.deck
            .initialize_from_master_deck(&master_deck, &mut self.rng, &mut self.events);
        self.deck
            .draw_to_hand(
                self.config.hand.opening,
                self.config.hand.limit,
                &self.library,
                &mut self.rng,
                &mut self.events,
            )
            .map_err(|e| Error::Wrap {
                func,
                source: Box::new(e),
            })?;

        self.board = Board::new(layout.grid(&self.config));
        let player = Unit::new(UnitKind::Player, max_hp)
            .with_hp(hp)
            .with_mana(self.config.player.max_mana)
            .with_move_points(self.config.player.move_points);
        self.spawn(player, layout.hero_spawn)?;
        for spawn in &layout.enemies {
            let move_points = self
                .config
                .profile(spawn.kind)
                .map_or(0, |profile| profile.move_points);
            let unit = Unit::new(spawn.kind, spawn.hp).with_move_points(move_points);
            self.spawn(unit, spawn.pos)?;
        }
        for spawn in &layout.extra_units {
            self.spawn(Unit::new(spawn.kind, spawn.hp), spawn.pos)?;
        }

        tracing::info!(
            "encounter {} started on floor {}: {} enemies",
            descriptor.node_id,
            descriptor.floor,
            layout.enemies.len()
        );
        self.events.publish(GameEvent::EncounterStarted {
            node_id: descriptor.node_id.clone(),
            floor: descriptor.floor,
        });
        self.encounter = Some(descriptor);
        self.start_player_turn()
    }

    fn spawn(&mut self, unit: Unit, pos: Pos) -> Result<UnitID> {
        let func = "GameManager::spawn";

        spawn_unit(&mut self.board, &mut self.events, unit, pos).map_err(|e| Error::Wrap {
            func,
            source: Box::new(e),
        })
    }

    fn encounter_seed(&self, descriptor: &EncounterDescriptor) -> Seed {
        let run_seed = self.run.as_ref().map_or(0, |run| run.seed());
        node_seed(run_seed, &descriptor.node_id)
    }

    /// 佈置失敗時清掉半成品，並讓冒險可以重新進入該節點
    fn abort_setup(&mut self) {
        self.reset_encounter();
        if let Some(run) = self.run.as_mut() {
            run.set_in_battle(false);
        }
        tracing::warn!("encounter setup failed, combat state cleared");
    }

    fn reset_encounter(&mut self) {
        self.board = Board::default();
        self.deck = DeckManager::default();
        self.phase = Phase::Setup;
        self.encounter = None;
        self.selected_card = None;
        self.pending_discard = 0;
        self.turn = 0;
        self.enemy_queue.clear();
        self.defenders_done = false;
        self.finished = false;
    }

    // ------------------------------------------------------------------
    // 玩家回合
    // ------------------------------------------------------------------

    /// 回滿法力與移動點數、己方中毒發作、抽牌（第一回合不抽）
    fn start_player_turn(&mut self) -> Result<()> {
        let func = "GameManager::start_player_turn";

        self.turn += 1;
        self.phase = Phase::PlayerTurn;
        self.selected_card = None;
        tracing::debug!("player turn {} starts", self.turn);
        self.events.publish(GameEvent::TurnStarted {
            team: Team::Player,
            turn: self.turn,
        });

        for unit_id in self.board.live_units_of(Team::Player) {
            if let Some(unit) = self.board.unit_mut(unit_id) {
                unit.refresh();
            }
            apply_poison_tick(&mut self.board, &mut self.events, unit_id);
        }
        if self.board.player_id().is_none() {
            self.enter_defeat();
            return Ok(());
        }

        if self.turn > 1 {
            self.deck
                .draw_to_hand(
                    self.config.hand.draw_per_turn,
                    self.config.hand.limit,
                    &self.library,
                    &mut self.rng,
                    &mut self.events,
                )
                .map_err(|e| Error::Wrap {
                    func,
                    source: Box::new(e),
                })?;
        }
        Ok(())
    }

    fn input_rejection(&self) -> Option<Rejection> {
        if self.encounter.is_none() {
            return Some(Rejection::NoEncounter);
        }
        if self.phase != Phase::PlayerTurn {
            return Some(Rejection::NotPlayerTurn);
        }
        if self.pending_discard > 0 {
            return Some(Rejection::AwaitingDiscard);
        }
        None
    }

    pub fn select_card(&mut self, index: usize) -> Outcome<CardSelection> {
        if let Some(reason) = self.input_rejection() {
            return Outcome::Rejected(reason);
        }
        let Some(card) = self.deck.hand.get(index) else {
            return Outcome::Rejected(Rejection::CardIndexOutOfRange);
        };
        if self.selected_card == Some(index) {
            self.selected_card = None;
            return Outcome::Accepted(CardSelection::Cleared);
        }
        let Some(player_id) = self.board.player_id() else {
            return Outcome::Rejected(Rejection::NoPlayer);
        };
        let targets = valid_targets(&self.board, player_id, card);
        let key = card.key.clone();
        self.selected_card = Some(index);
        Outcome::Accepted(CardSelection::Selected {
            index,
            key,
            targets,
        })
    }

    pub fn clear_card_selection(&mut self) {
        self.selected_card = None;
    }

    /// 有選牌時嘗試出牌，否則嘗試移動
    pub fn tile_clicked(&mut self, pos: Pos) -> Result<Outcome<ClickResult>> {
        if let Some(reason) = self.input_rejection() {
            return Ok(Outcome::Rejected(reason));
        }
        let Some(player_id) = self.board.player_id() else {
            return Ok(Outcome::Rejected(Rejection::NoPlayer));
        };
        if !self.board.grid.is_in_bounds(pos) {
            return Ok(Outcome::Rejected(Rejection::OutOfBounds));
        }
        match self.selected_card {
            Some(index) => self.play_card(player_id, index, pos),
            None => self.move_player(player_id, pos),
        }
    }

    fn play_card(
        &mut self,
        player_id: UnitID,
        index: usize,
        target: Pos,
    ) -> Result<Outcome<ClickResult>> {
        let func = "GameManager::play_card";

        let Some(card) = self.deck.hand.get(index).cloned() else {
            self.selected_card = None;
            return Ok(Outcome::Rejected(Rejection::CardIndexOutOfRange));
        };
        let mana = self.board.unit(player_id).map_or(0, |unit| unit.mana);
        if mana < card.cost {
            return Ok(Outcome::Rejected(Rejection::NotEnoughMana));
        }
        if !can_play(&self.board, player_id, &card, target) {
            return Ok(Outcome::Rejected(Rejection::InvalidTarget));
        }

        if let Some(unit) = self.board.unit_mut(player_id) {
            unit.mana -= card.cost;
        }
        self.selected_card = None;
        self.deck.discard_from_hand(index, &mut self.events);

        match &card.effect {
            CardEffect::Loot { draw, discard } => {
                self.deck
                    .draw_to_hand(
                        *draw,
                        self.config.hand.limit + discard,
                        &self.library,
                        &mut self.rng,
                        &mut self.events,
                    )
                    .map_err(|e| Error::Wrap {
                        func,
                        source: Box::new(e),
                    })?;
                self.pending_discard = (*discard).min(self.deck.hand.len());
                if self.pending_discard > 0 {
                    self.events.publish(GameEvent::DiscardRequested {
                        count: self.pending_discard,
                    });
                }
            }
            _ => execute_card(
                &mut self.board,
                &mut self.events,
                &self.config,
                player_id,
                &card,
                target,
            )
            .map_err(|e| Error::Wrap {
                func,
                source: Box::new(e),
            })?,
        }

        tracing::debug!("card {} played at {target:?}", card.key);
        self.events.publish(GameEvent::CardPlayed {
            key: card.key.clone(),
            target,
        });
        if self.board.enemies().is_empty() {
            self.enter_victory()?;
        }
        Ok(Outcome::Accepted(ClickResult::CardPlayed {
            key: card.key,
            target,
            discard_pending: self.pending_discard,
        }))
    }

    fn move_player(&mut self, player_id: UnitID, to: Pos) -> Result<Outcome<ClickResult>> {
        let func = "GameManager::move_player";

        let (Some(from), Some(move_points)) = (
            self.board.unit_pos(player_id),
            self.board.unit(player_id).map(|unit| unit.move_points),
        ) else {
            return Ok(Outcome::Rejected(Rejection::NoPlayer));
        };
        if !self.board.is_walkable(to) {
            return Ok(Outcome::Rejected(Rejection::InvalidTarget));
        }
        let Some(path) = find_path(&self.board, from, to) else {
            return Ok(Outcome::Rejected(Rejection::NoPath));
        };
        let steps = path.len() - 1;
        if steps > move_points {
            return Ok(Outcome::Rejected(Rejection::NotEnoughMovePoints));
        }

        move_unit(&mut self.board, &mut self.events, player_id, to).map_err(|e| Error::Wrap {
            func,
            source: Box::new(e),
        })?;
        if let Some(unit) = self.board.unit_mut(player_id) {
            unit.move_points -= steps;
        }
        tracing::debug!("player moved {from:?} -> {to:?} in {steps} steps");
        Ok(Outcome::Accepted(ClickResult::Moved { path }))
    }

    /// 棄牌模式下選擇要棄掉的手牌
    pub fn discard_from_hand(&mut self, index: usize) -> Outcome<CardInstance> {
        if self.encounter.is_none() {
            return Outcome::Rejected(Rejection::NoEncounter);
        }
        if self.phase != Phase::PlayerTurn {
            return Outcome::Rejected(Rejection::NotPlayerTurn);
        }
        if self.pending_discard == 0 {
            return Outcome::Rejected(Rejection::NotAwaitingDiscard);
        }
        let Some(card) = self.deck.discard_from_hand(index, &mut self.events) else {
            return Outcome::Rejected(Rejection::CardIndexOutOfRange);
        };
        self.pending_discard -= 1;
        Outcome::Accepted(card)
    }

    // ------------------------------------------------------------------
    // 敵方階段
    // ------------------------------------------------------------------

    /// 結束玩家回合並跑完整個敵方階段，回傳之後的階段
    pub fn end_turn(&mut self) -> Result<Outcome<Phase>> {
        if let Outcome::Rejected(reason) = self.begin_enemy_phase() {
            return Ok(Outcome::Rejected(reason));
        }
        while let Some(step) = self.advance_enemy_phase()? {
            self.pacer.pause(&step);
        }
        Ok(Outcome::Accepted(self.phase))
    }

    /// 逐步推進時使用：之後重複呼叫 advance_enemy_phase 直到回傳 None
    pub fn begin_enemy_phase(&mut self) -> Outcome<()> {
        if let Some(reason) = self.input_rejection() {
            return Outcome::Rejected(reason);
        }
        self.events.publish(GameEvent::TurnEnded {
            team: Team::Player,
            turn: self.turn,
        });
        self.selected_card = None;
        self.phase = Phase::EnemyTurn;
        self.enemy_queue = self.board.enemies().into();
        self.defenders_done = false;
        tracing::debug!("enemy phase {} with {} enemies", self.turn, self.enemy_queue.len());
        self.events.publish(GameEvent::TurnStarted {
            team: Team::Enemy,
            turn: self.turn,
        });
        Outcome::Accepted(())
    }

    /// 每次處理一個敵人，最後一步為砲塔射擊；階段結束時回傳 None
    pub fn advance_enemy_phase(&mut self) -> Result<Option<EnemyStep>> {
        let func = "GameManager::advance_enemy_phase";

        if self.phase != Phase::EnemyTurn {
            return Ok(None);
        }
        if self.board.player_id().is_some() {
            while let Some(enemy_id) = self.enemy_queue.pop_front() {
                if self.board.live_unit(enemy_id).is_none() {
                    continue;
                }
                let report =
                    take_enemy_turn(&mut self.board, &mut self.events, &self.config, enemy_id)
                        .map_err(|e| Error::Wrap {
                            func,
                            source: Box::new(e),
                        })?;
                return Ok(Some(EnemyStep::Enemy(report)));
            }
            if !self.defenders_done {
                self.defenders_done = true;
                if !self.board.turrets().is_empty() {
                    let shots = resolve_defenders(&mut self.board, &mut self.events, &self.config);
                    return Ok(Some(EnemyStep::Defenders(shots)));
                }
            }
        }
        self.finish_enemy_phase()?;
        Ok(None)
    }

    fn finish_enemy_phase(&mut self) -> Result<()> {
        self.enemy_queue.clear();
        let expired = self.board.grid.tick_tile_effects();
        if !expired.is_empty() {
            tracing::debug!("{} tile effects expired", expired.len());
        }
        self.events.publish(GameEvent::TurnEnded {
            team: Team::Enemy,
            turn: self.turn,
        });

        if self.board.player_id().is_none() {
            self.enter_defeat();
            Ok(())
        } else if self.board.enemies().is_empty() {
            self.enter_victory()
        } else {
            self.start_player_turn()
        }
    }

    // ------------------------------------------------------------------
    // 戰鬥結束
    // ------------------------------------------------------------------

    /// 發放金幣、可能成長最大生命、完成節點
    fn enter_victory(&mut self) -> Result<()> {
        let func = "GameManager::enter_victory";

        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.phase = Phase::Victory;
        self.selected_card = None;
        self.pending_discard = 0;
        let Some(descriptor) = self.encounter.clone() else {
            return Ok(());
        };

        let rewards = &self.config.rewards;
        let gold = self.config.victory_gold(descriptor.floor, descriptor.is_boss());
        let max_hp_gain = if descriptor.is_boss() {
            rewards.boss_max_hp_growth
        } else if self
            .rng
            .random_bool(rewards.max_hp_growth_chance.clamp(0.0, 1.0))
        {
            rewards.max_hp_growth
        } else {
            0
        };
        let hp = self.board.player().map_or(1, |unit| unit.hp.max(1));

        let mut run_won = None;
        if let Some(run) = self.run.as_mut() {
            run.state.hp = hp.min(run.state.max_hp);
            run.state.add_gold(gold);
            run.state.grow_max_hp(max_hp_gain);
            run.set_in_battle(false);
            let won = run
                .complete_node(&descriptor.node_id)
                .map_err(|source| Error::Run { func, source })?;
            if won {
                run_won = Some(run.state.gold);
            }
        }

        tracing::info!(
            "encounter {} won: +{gold} gold, +{max_hp_gain} max hp",
            descriptor.node_id
        );
        self.events.publish(GameEvent::EncounterCompleted {
            node_id: descriptor.node_id.clone(),
            gold,
            max_hp_gain,
        });
        if self.run.is_some() {
            self.events.publish(GameEvent::NodeCompleted {
                node_id: descriptor.node_id.clone(),
            });
        }
        if let Some(gold) = run_won {
            self.events.publish(GameEvent::RunWon { gold });
        }
        Ok(())
    }

    /// 生命歸零寫回冒險後立即復活並扣金幣，冒險繼續
    fn enter_defeat(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        self.phase = Phase::Defeat;
        self.selected_card = None;
        self.pending_discard = 0;

        let rewards = &self.config.rewards;
        let (revived_hp, gold_lost) = match self.run.as_mut() {
            Some(run) => {
                run.state.hp = 0;
                run.set_in_battle(false);
                run.state
                    .revive_after_defeat(rewards.revive_percent, rewards.defeat_gold_loss_percent)
            }
            None => (
                (self.config.player.max_hp * rewards.revive_percent / 100).max(1),
                0,
            ),
        };
        tracing::info!("defeated: revived with {revived_hp} hp, lost {gold_lost} gold");
        self.events.publish(GameEvent::GameOver {
            reason: GameOverReason::Defeated {
                revived_hp,
                gold_lost,
            },
        });
    }

    /// 放棄目前戰鬥，冒險就此結束
    pub fn abandon_encounter(&mut self) -> Outcome<()> {
        if self.encounter.is_none() || self.finished {
            return Outcome::Rejected(Rejection::NoEncounter);
        }
        self.finished = true;
        self.phase = Phase::Defeat;
        self.selected_card = None;
        self.pending_discard = 0;
        self.enemy_queue.clear();
        if let Some(run) = self.run.as_mut() {
            run.abandon();
        }
        self.events.publish(GameEvent::GameOver {
            reason: GameOverReason::Abandoned,
        });
        Outcome::Accepted(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use run_lib::NodeType;

    fn manager() -> GameManager {
        GameManager::new(GameConfig::default(), CardLibrary::builtin().unwrap())
    }

    fn fight(node_id: &str) -> EncounterDescriptor {
        EncounterDescriptor {
            node_id: node_id.to_string(),
            node_type: NodeType::Fight,
            floor: 0,
        }
    }

    #[test]
    fn test_input_rejected_without_encounter() {
        let mut gm = manager();
        assert_eq!(gm.select_card(0).rejection(), Some(Rejection::NoEncounter));
        assert_eq!(
            gm.tile_clicked(Pos::new(0, 0)).unwrap().rejection(),
            Some(Rejection::NoEncounter)
        );
        assert_eq!(gm.end_turn().unwrap().rejection(), Some(Rejection::NoEncounter));
        assert_eq!(
            gm.discard_from_hand(0).rejection(),
            Some(Rejection::NoEncounter)
        );
        assert_eq!(gm.abandon_encounter().rejection(), Some(Rejection::NoEncounter));
    }

    #[test]
    fn test_start_encounter_deals_opening_hand() {
        let mut gm = manager();
        gm.start_encounter(fight("0-0")).unwrap();
        assert_eq!(gm.phase(), Phase::PlayerTurn);
        assert_eq!(gm.turn(), 1);
        assert_eq!(gm.hand().len(), gm.config.hand.opening);
        assert_eq!(gm.deck.total_cards(), gm.library.starter_deck.len());
        let player = gm.player().unwrap();
        assert_eq!(player.mana, gm.config.player.max_mana);
        assert_eq!(player.hp, gm.config.player.max_hp);
        assert!(!gm.board.enemies().is_empty());
    }

    #[test]
    fn test_select_card_toggles() {
        let mut gm = manager();
        gm.start_encounter(fight("0-0")).unwrap();
        assert!(matches!(
            gm.select_card(0),
            Outcome::Accepted(CardSelection::Selected { index: 0, .. })
        ));
        assert_eq!(gm.selected_card(), Some(0));
        assert_eq!(gm.select_card(0), Outcome::Accepted(CardSelection::Cleared));
        assert_eq!(gm.selected_card(), None);
        assert_eq!(
            gm.select_card(99).rejection(),
            Some(Rejection::CardIndexOutOfRange)
        );
    }

    #[test]
    fn test_cannot_start_twice() {
        let mut gm = manager();
        gm.start_encounter(fight("0-0")).unwrap();
        let err = gm.start_encounter(fight("0-1")).unwrap_err();
        assert!(matches!(root_error(&err), Error::EncounterActive { .. }));
    }

    #[test]
    fn test_abandon_ends_run() {
        let mut gm = manager();
        gm.start_new_run(5).unwrap();
        let first = gm.run().unwrap().map.first_floor()[0].clone();
        gm.select_node(&first).unwrap();
        let action = gm.enter_selected().unwrap();
        assert!(matches!(action, RunAction::Encounter(_)));
        assert!(gm.run().unwrap().in_battle);

        assert!(gm.abandon_encounter().is_accepted());
        assert_eq!(gm.phase(), Phase::Defeat);
        assert!(gm.run().unwrap().state.is_over());
        assert!(!gm.run().unwrap().in_battle);
        assert_eq!(gm.abandon_encounter().rejection(), Some(Rejection::NoEncounter));
    }
}
