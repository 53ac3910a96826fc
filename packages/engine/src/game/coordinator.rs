//! Game coordinator: owns one table's state and drives the round lifecycle
//! WAITING → BIDDING → PLAYING (⇄ CHALLENGE) → FINISHED → next round or
//! GAME_OVER.
//!
//! The coordinator is the sole mutator. Every play goes through the rule
//! kernel, card memory updates happen before any later legality check, and
//! scoring runs exactly once per round. The Qayd lock gates `play_card` and
//! `auto_play_card` but never `check_timeout` — the timer must stay able to
//! unlock the game.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::ai::memory::CardMemory;
use crate::ai::trait_def::{AiError, BotPlayer};
use crate::ai::view::{BidView, BotView};
use crate::domain::baloot::{BalootEvent, BalootState};
use crate::domain::bidding::{
    BidAction, BidOutcome, BidPhase, BiddingEngine, GABLAK_WINDOW_MS,
};
use crate::domain::cards::{card_points, Card, GameMode, Suit};
use crate::domain::contract::Contract;
use crate::domain::dealing::{complete_deal, deal_initial};
use crate::domain::projects::{ProjectKind, ProjectManager};
use crate::domain::qayd::{QaydState, QaydVerdict, ViolationKind, QAYD_HOLD_MS};
use crate::domain::rules::legal_moves;
use crate::domain::scoring::{
    score_round, RoundScore, ScoreInputs, TOTAL_GP_HOKUM, TOTAL_GP_SUN,
};
use crate::domain::state::{
    next_seat, seat_name, team_of, GamePhase, MatchScores, RoundState, Seat, Team, MATCH_TARGET,
    SEATS,
};
use crate::domain::tricks;
use crate::errors::domain::DomainError;

/// Static configuration taken by value; the core reads no environment.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Strict legality (competitive play). Permissive mode only exists so
    /// Qayd has violations to observe.
    pub strict: bool,
    pub gablak_window_ms: i64,
    pub qayd_hold_ms: i64,
    /// Base seed for deterministic dealing; each redeal derives from it.
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            strict: true,
            gablak_window_ms: GABLAK_WINDOW_MS,
            qayd_hold_ms: QAYD_HOLD_MS,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayerSlot {
    pub id: String,
    pub name: String,
    pub seat: Seat,
}

/// Archived result of one finished round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub round_no: u32,
    pub contract: Option<Contract>,
    /// Full scoring breakdown; absent for qayd-terminated rounds.
    pub score: Option<RoundScore>,
    pub us: i32,
    pub them: i32,
    pub winner: Option<Team>,
    pub reason: String,
}

/// What one accepted play did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayResult {
    pub trick_completed: bool,
    pub trick_winner: Option<Seat>,
    pub baloot_event: Option<BalootEvent>,
    pub round_finished: bool,
    pub game_over: bool,
}

/// Deadline-driven transition reported by `check_timeout`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutEvent {
    GablakExpired,
    QaydResolved(QaydVerdict),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameCoordinator {
    pub(crate) room_id: String,
    pub(crate) config: GameConfig,
    pub(crate) players: Vec<PlayerSlot>,
    pub(crate) phase: GamePhase,
    pub(crate) round: RoundState,
    pub(crate) bidding: Option<BiddingEngine>,
    pub(crate) contract: Option<Contract>,
    pub(crate) projects: ProjectManager,
    pub(crate) baloot: BalootState,
    pub(crate) qayd: QaydState,
    pub(crate) memory: CardMemory,
    pub(crate) match_scores: MatchScores,
    pub(crate) past_round_results: Vec<RoundOutcome>,
    pub(crate) round_no: u32,
    pub(crate) deal_counter: u64,
    pub(crate) is_locked: bool,
}

fn now_ms() -> i64 {
    (time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

impl GameCoordinator {
    pub fn new(config: GameConfig) -> Self {
        Self {
            room_id: Uuid::new_v4().to_string(),
            config,
            players: Vec::new(),
            phase: GamePhase::Waiting,
            round: RoundState::new(0),
            bidding: None,
            contract: None,
            projects: ProjectManager::default(),
            baloot: BalootState::default(),
            qayd: QaydState::default(),
            memory: CardMemory::default(),
            match_scores: MatchScores::default(),
            past_round_results: Vec::new(),
            round_no: 0,
            deal_counter: 0,
            is_locked: false,
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_locked(&self) -> bool {
        self.is_locked
    }

    pub fn match_scores(&self) -> MatchScores {
        self.match_scores
    }

    pub fn contract(&self) -> Option<&Contract> {
        self.contract.as_ref()
    }

    pub fn current_turn(&self) -> Seat {
        match self.phase {
            GamePhase::Bidding => self
                .bidding
                .as_ref()
                .map(|b| b.current_actor())
                .unwrap_or(self.round.current_turn),
            _ => self.round.current_turn,
        }
    }

    pub fn round_state(&self) -> &RoundState {
        &self.round
    }

    pub fn past_round_results(&self) -> &[RoundOutcome] {
        &self.past_round_results
    }

    pub fn card_memory(&self) -> &CardMemory {
        &self.memory
    }

    // ── Setup ────────────────────────────────────────────────────────

    /// Seat a player. Exactly four are required before the game can start.
    pub fn add_player(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Seat, DomainError> {
        if self.phase != GamePhase::Waiting {
            return Err(DomainError::phase("players can only join before start"));
        }
        if self.players.len() >= SEATS {
            return Err(DomainError::input("table is full"));
        }
        let seat = self.players.len() as Seat;
        self.players.push(PlayerSlot {
            id: id.into(),
            name: name.into(),
            seat,
        });
        Ok(seat)
    }

    /// Deal, show the floor card and open the auction.
    pub fn start_game(&mut self) -> Result<(), DomainError> {
        if self.phase != GamePhase::Waiting {
            return Err(DomainError::phase("game already started"));
        }
        if self.players.len() != SEATS {
            return Err(DomainError::input(format!(
                "need 4 players, have {}",
                self.players.len()
            )));
        }
        self.start_round(0);
        Ok(())
    }

    fn deal_seed(&self) -> u64 {
        self.config
            .seed
            .wrapping_add(self.deal_counter.wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }

    fn start_round(&mut self, dealer: Seat) {
        self.deal_counter += 1;
        let deal = deal_initial(self.deal_seed());
        let mut round = RoundState::new(dealer);
        round.hands = deal.hands;
        round.floor_card = Some(deal.floor_card);
        round.undealt = deal.undealt;
        self.round = round;

        self.projects.reset();
        self.baloot.reset();
        self.qayd.reset();
        self.memory.reset();
        self.contract = None;
        self.is_locked = false;

        self.bidding = Some(BiddingEngine::new(
            dealer,
            deal.floor_card,
            self.match_scores,
            self.config.gablak_window_ms,
        ));
        self.phase = GamePhase::Bidding;
        info!(
            room = %self.room_id,
            dealer,
            floor = %deal.floor_card,
            "round dealt, bidding open"
        );
    }

    // ── Bidding ──────────────────────────────────────────────────────

    pub fn submit_bid(
        &mut self,
        seat: Seat,
        action: BidAction,
        suit: Option<Suit>,
    ) -> Result<BidOutcome, DomainError> {
        self.submit_bid_at(seat, action, suit, now_ms())
    }

    pub fn submit_bid_at(
        &mut self,
        seat: Seat,
        action: BidAction,
        suit: Option<Suit>,
        now_ms: i64,
    ) -> Result<BidOutcome, DomainError> {
        if self.phase != GamePhase::Bidding {
            return Err(DomainError::phase("not in the bidding phase"));
        }
        if seat as usize >= SEATS {
            return Err(DomainError::input(format!("invalid seat {seat}")));
        }
        let hand = self.round.hands[seat as usize].clone();
        let bidding = self
            .bidding
            .as_mut()
            .ok_or_else(|| DomainError::fatal("bidding engine missing"))?;
        let outcome = bidding.submit(seat, action, suit, &hand, now_ms)?;

        match outcome {
            BidOutcome::Redeal { rotate_dealer } => {
                let dealer = if rotate_dealer {
                    next_seat(self.round.dealer_index)
                } else {
                    self.round.dealer_index
                };
                self.start_round(dealer);
            }
            BidOutcome::AllPassed => {
                // Both auction rounds passed out: redeal with rotation.
                let dealer = next_seat(self.round.dealer_index);
                self.start_round(dealer);
            }
            _ => self.maybe_begin_playing()?,
        }
        Ok(outcome)
    }

    /// If the auction just finished with a contract, complete the deal and
    /// open play.
    fn maybe_begin_playing(&mut self) -> Result<(), DomainError> {
        let Some(bidding) = self.bidding.as_ref() else {
            return Ok(());
        };
        if bidding.phase() != BidPhase::Finished {
            return Ok(());
        }
        let Some(contract) = bidding.contract() else {
            return Ok(());
        };

        let floor = self
            .round
            .floor_card
            .take()
            .ok_or_else(|| DomainError::fatal("floor card already consumed"))?;
        let mut undealt = std::mem::take(&mut self.round.undealt);
        complete_deal(
            &mut self.round.hands,
            floor,
            &mut undealt,
            contract.bidder_seat,
        )?;
        self.round.undealt = undealt;

        self.round.mode = Some(contract.mode());
        self.round.trump_suit = contract.suit;
        self.round.initial_hands = self.round.hands.clone();
        self.round.current_turn = next_seat(self.round.dealer_index);

        self.baloot
            .scan_initial_hands(&self.round.hands, contract.mode(), contract.suit);
        self.memory.reset();
        self.phase = GamePhase::Playing;
        info!(
            buyer = contract.bidder_seat,
            mode = ?contract.mode(),
            trump = ?contract.suit,
            level = contract.level,
            "contract settled, play begins"
        );
        self.contract = Some(contract);
        Ok(())
    }

    // ── Playing ──────────────────────────────────────────────────────

    pub fn play_card(&mut self, seat: Seat, hand_index: usize) -> Result<PlayResult, DomainError> {
        if self.is_locked {
            return Err(DomainError::phase("play is locked by an active qayd"));
        }
        if self.phase != GamePhase::Playing {
            return Err(DomainError::phase("not in the playing phase"));
        }
        let contract = self
            .contract
            .clone()
            .ok_or_else(|| DomainError::fatal("playing without a contract"))?;
        let mode = contract.mode();

        let outcome = tricks::play_card(&mut self.round, seat, hand_index, self.config.strict)?;

        // Memory updates happen-before any subsequent legality check.
        let led = match &outcome.completed {
            Some(trick) => trick.plays.first().map(|p| p.card.suit),
            None => self.round.table_cards.first().map(|p| p.card.suit),
        };
        self.memory.observe_play(seat, outcome.play.card, led);

        if outcome.trick_index == 0 {
            self.projects.close_window(seat);
        }

        let blocked = self.projects.blocks_baloot(seat, self.round.trump_suit);
        let baloot_event = self.baloot.on_card_played(
            seat,
            outcome.play.card,
            mode,
            self.round.trump_suit,
            blocked,
        );

        let mut result = PlayResult {
            trick_completed: false,
            trick_winner: None,
            baloot_event,
            round_finished: false,
            game_over: false,
        };

        if let Some(trick) = &outcome.completed {
            result.trick_completed = true;
            result.trick_winner = Some(trick.winner);
            if outcome.trick_index == 0 {
                self.projects.resolve(mode, self.round.trump_suit);
            }
            if self.round.round_history.len() == 8 {
                self.finish_round_scored()?;
                result.round_finished = true;
                result.game_over = self.phase == GamePhase::GameOver;
            }
        }
        Ok(result)
    }

    /// Drive a bot seat through the same validation path as a human play.
    pub fn auto_play_card(
        &mut self,
        seat: Seat,
        bot: &dyn BotPlayer,
    ) -> Result<PlayResult, DomainError> {
        if self.is_locked {
            return Err(DomainError::phase("play is locked by an active qayd"));
        }
        let view = self.bot_view(seat)?;
        let chosen = match bot.choose_play(&view) {
            Ok(idx) => idx,
            Err(AiError::NoLegalMove) => {
                return Err(DomainError::rule("bot found no legal move"))
            }
            Err(err) => {
                warn!(seat, %err, "bot error; falling back to cheapest legal card");
                view.legal_indices
                    .first()
                    .copied()
                    .ok_or_else(|| DomainError::rule("no legal move available"))?
            }
        };
        // Legality clamp: an out-of-set recommendation degrades to the
        // cheapest legal card rather than an illegal play.
        let index = if view.legal_indices.contains(&chosen) {
            chosen
        } else {
            warn!(seat, chosen, "bot pick not legal; clamping");
            self.cheapest_legal(&view)?
        };
        self.play_card(seat, index)
    }

    fn cheapest_legal(&self, view: &BotView) -> Result<usize, DomainError> {
        view.legal_indices
            .iter()
            .copied()
            .min_by_key(|&i| card_points(view.hand[i], view.mode, view.trump_suit))
            .ok_or_else(|| DomainError::rule("no legal move available"))
    }

    /// Ask a bot for its auction action and submit it.
    pub fn auto_bid(
        &mut self,
        seat: Seat,
        bot: &dyn BotPlayer,
        now_ms: i64,
    ) -> Result<BidOutcome, DomainError> {
        let view = self.bid_view(seat)?;
        let decision = bot
            .choose_bid(&view)
            .unwrap_or_else(|_| crate::ai::trait_def::BidDecision::pass());
        match self.submit_bid_at(seat, decision.action, decision.suit, now_ms) {
            Ok(outcome) => Ok(outcome),
            // A rejected bot bid degrades to a pass rather than stalling.
            Err(DomainError::Bid(_)) => {
                self.submit_bid_at(seat, BidAction::Pass, None, now_ms)
            }
            Err(err) => Err(err),
        }
    }

    // ── Declarations & Baloot ────────────────────────────────────────

    pub fn declare_project(&mut self, seat: Seat, kind: ProjectKind) -> Result<(), DomainError> {
        if self.is_locked {
            return Err(DomainError::phase("play is locked by an active qayd"));
        }
        if self.phase != GamePhase::Playing {
            return Err(DomainError::phase("projects are declared during play"));
        }
        if !self.round.round_history.is_empty() {
            return Err(DomainError::phase("the declaration window is trick 1 only"));
        }
        let hand = self.round.hands[seat as usize % SEATS].clone();
        self.projects.declare(seat, kind, &hand)?;
        Ok(())
    }

    // ── Qayd ─────────────────────────────────────────────────────────

    pub fn raise_qayd(&mut self, seat: Seat) -> Result<QaydVerdict, DomainError> {
        self.raise_qayd_at(seat, now_ms())
    }

    pub fn raise_qayd_at(&mut self, seat: Seat, now_ms: i64) -> Result<QaydVerdict, DomainError> {
        if self.phase != GamePhase::Playing {
            return Err(DomainError::phase("qayd can only interrupt play"));
        }
        let mode = self
            .round
            .mode
            .ok_or_else(|| DomainError::fatal("playing without a mode"))?;
        self.qayd.raise(seat)?;
        self.is_locked = true;
        self.phase = GamePhase::Challenge;
        let verdict = self.qayd.review(
            &self.round,
            mode,
            self.round.trump_suit,
            self.config.qayd_hold_ms,
            now_ms,
        );
        Ok(verdict)
    }

    // ── Timeouts ─────────────────────────────────────────────────────

    pub fn check_timeout(&mut self) -> Result<Option<TimeoutEvent>, DomainError> {
        self.check_timeout_at(now_ms())
    }

    /// Poll all armed deadlines. Deliberately not gated by the Qayd lock:
    /// the timer is the only thing that can release it.
    pub fn check_timeout_at(&mut self, now_ms: i64) -> Result<Option<TimeoutEvent>, DomainError> {
        match self.phase {
            GamePhase::Bidding => {
                let expired = self
                    .bidding
                    .as_mut()
                    .and_then(|b| b.check_timeout(now_ms))
                    .is_some();
                if expired {
                    self.maybe_begin_playing()?;
                    return Ok(Some(TimeoutEvent::GablakExpired));
                }
                Ok(None)
            }
            GamePhase::Challenge => {
                if let Some(verdict) = self.qayd.check_timeout(now_ms) {
                    self.resolve_qayd(verdict)?;
                    return Ok(Some(TimeoutEvent::QaydResolved(verdict)));
                }
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    fn resolve_qayd(&mut self, verdict: QaydVerdict) -> Result<(), DomainError> {
        self.is_locked = false;
        match verdict {
            QaydVerdict::Inconclusive => {
                info!("qayd inconclusive; play resumes");
                self.qayd.reset();
                self.phase = GamePhase::Playing;
                Ok(())
            }
            QaydVerdict::Correct => {
                let violation = self
                    .qayd
                    .violation
                    .clone()
                    .ok_or_else(|| DomainError::fatal("correct verdict without violation"))?;
                let offender_team = team_of(violation.offender);
                let what = match violation.kind {
                    ViolationKind::Revoke => "revoke",
                    ViolationKind::MustOverTrump => "must-over-trump violation",
                };
                let reason = format!(
                    "qayd: {what} by {} in trick {}",
                    seat_name(violation.offender),
                    violation.trick_index + 1
                );
                self.finish_round_penalised(offender_team, reason)
            }
            QaydVerdict::False => {
                let accuser = self.qayd.accuser.unwrap_or_default();
                let reason = format!("qayd: false accusation by {}", seat_name(accuser));
                self.finish_round_penalised(team_of(accuser), reason)
            }
        }
    }

    // ── Round completion ─────────────────────────────────────────────

    fn finish_round_scored(&mut self) -> Result<(), DomainError> {
        let contract = self
            .contract
            .clone()
            .ok_or_else(|| DomainError::fatal("scoring without a contract"))?;
        let (baloot_us, baloot_them) = self.baloot.team_points();
        let inputs = ScoreInputs {
            round_history: &self.round.round_history,
            contract: &contract,
            project_abnat_us: self.projects.team_abnat(Team::Us),
            project_abnat_them: self.projects.team_abnat(Team::Them),
            baloot_us,
            baloot_them,
        };
        let score = score_round(&inputs)?;
        self.match_scores.add(Team::Us, score.us.result);
        self.match_scores.add(Team::Them, score.them.result);
        self.round_no += 1;
        info!(
            round = self.round_no,
            us = score.us.result,
            them = score.them.result,
            reason = %score.reason,
            "round scored"
        );
        self.past_round_results.push(RoundOutcome {
            round_no: self.round_no,
            contract: Some(contract),
            us: score.us.result,
            them: score.them.result,
            winner: Some(score.winner),
            reason: score.reason.clone(),
            score: Some(score),
        });
        self.phase = GamePhase::Finished;
        self.after_round();
        Ok(())
    }

    /// Qayd penalty: the loser's side forfeits the whole pot; scoring is
    /// skipped for the round.
    fn finish_round_penalised(&mut self, loser: Team, reason: String) -> Result<(), DomainError> {
        let mode = self.round.mode.unwrap_or(GameMode::Sun);
        let pot = match mode {
            GameMode::Sun => TOTAL_GP_SUN,
            GameMode::Hokum => TOTAL_GP_HOKUM,
        };
        let winner = loser.other();
        self.match_scores.add(winner, pot);
        self.round_no += 1;
        info!(round = self.round_no, winner = winner.label(), pot, %reason, "round ended by qayd");
        let (us, them) = match winner {
            Team::Us => (pot, 0),
            Team::Them => (0, pot),
        };
        self.past_round_results.push(RoundOutcome {
            round_no: self.round_no,
            contract: self.contract.clone(),
            score: None,
            us,
            them,
            winner: Some(winner),
            reason,
        });
        self.phase = GamePhase::Finished;
        self.after_round();
        Ok(())
    }

    /// From FINISHED: either the match ends or the next round is dealt.
    fn after_round(&mut self) {
        if self.match_scores.us >= MATCH_TARGET || self.match_scores.them >= MATCH_TARGET {
            self.phase = GamePhase::GameOver;
            info!(
                us = self.match_scores.us,
                them = self.match_scores.them,
                "game over"
            );
            return;
        }
        let dealer = next_seat(self.round.dealer_index);
        self.start_round(dealer);
    }

    /// Abandon the game from any non-terminal phase. Idempotent.
    pub fn abort(&mut self) {
        if matches!(self.phase, GamePhase::GameOver | GamePhase::Abandoned) {
            return;
        }
        self.is_locked = false;
        self.qayd.reset();
        self.phase = GamePhase::Abandoned;
        info!(room = %self.room_id, "game abandoned");
    }

    // ── Bot views ────────────────────────────────────────────────────

    /// Build the read-only decision view for a bot seat.
    pub fn bot_view(&self, seat: Seat) -> Result<BotView, DomainError> {
        if self.phase != GamePhase::Playing {
            return Err(DomainError::phase("no play decision pending"));
        }
        if seat != self.round.current_turn {
            return Err(DomainError::Turn {
                expected: self.round.current_turn,
            });
        }
        let contract = self
            .contract
            .clone()
            .ok_or_else(|| DomainError::fatal("playing without a contract"))?;
        let mode = contract.mode();
        let hand = self.round.hands[seat as usize].clone();
        let legal_indices = legal_moves(
            &hand,
            &self.round.table_cards,
            mode,
            self.round.trump_suit,
            seat,
        );
        let bid_history = self
            .bidding
            .as_ref()
            .map(|b| b.bid_history().to_vec())
            .unwrap_or_default();
        Ok(BotView {
            seat,
            memory: CardMemory::from_round(&self.round),
            baloot_ready: self.baloot.holds_baloot(seat),
            hand,
            legal_indices,
            table_cards: self.round.table_cards.clone(),
            mode,
            trump_suit: self.round.trump_suit,
            contract,
            bid_history,
            round_history: self.round.round_history.clone(),
            floor_card: self.round.floor_card,
            match_scores: self.match_scores,
        })
    }

    /// Build the read-only auction view for a bot seat.
    pub fn bid_view(&self, seat: Seat) -> Result<BidView, DomainError> {
        if self.phase != GamePhase::Bidding {
            return Err(DomainError::phase("no bid decision pending"));
        }
        let bidding = self
            .bidding
            .as_ref()
            .ok_or_else(|| DomainError::fatal("bidding engine missing"))?;
        Ok(BidView {
            seat,
            hand: self.round.hands[seat as usize % SEATS].clone(),
            floor_card: bidding.floor_card(),
            phase: bidding.phase(),
            dealer_index: self.round.dealer_index,
            match_scores: self.match_scores,
            bid_history: bidding.bid_history().to_vec(),
            contract: bidding.contract(),
        })
    }

    /// Hand of a seat; host-side tooling only.
    pub fn hand_of(&self, seat: Seat) -> &[Card] {
        &self.round.hands[seat as usize % SEATS]
    }
}
