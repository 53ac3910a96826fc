//! Bidding state machine: the two auction rounds, the Gablak hijack window,
//! the doubling chain and variant selection.
//!
//! Priority is positional: the queue is dealer+1, dealer+2, dealer+3, dealer,
//! and a lower queue index always outranks a higher one. A bid placed while a
//! higher-priority seat is still live opens a wall-clock Gablak window during
//! which every live higher-priority seat must hijack or waive; expiry
//! confirms the tentative bid. Deadlines are absolute timestamps polled via
//! [`BiddingEngine::check_timeout`]; nothing here blocks.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::cards::{Card, Rank, Suit};
use crate::domain::contract::{Contract, ContractType, HokumVariant, GAHWA_LEVEL};
use crate::domain::rules::is_kawesh_hand;
use crate::domain::state::{next_seat, team_of, MatchScores, Seat, SEATS};
use crate::errors::domain::BidError;

/// Default Gablak window length.
pub const GABLAK_WINDOW_MS: i64 = 5_000;

/// Match score at which the SUN doubling firewall opens for the buyer.
const FIREWALL_SCORE: i32 = 100;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum BidPhase {
    RoundOne,
    RoundTwo,
    GablakWindow,
    Doubling,
    VariantSelection,
    Finished,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum BidAction {
    Pass,
    Hokum,
    Sun,
    Ashkal,
    Kawesh,
    Double,
    Triple,
    Four,
    Gahwa,
    Open,
    Closed,
}

impl BidAction {
    fn is_contract_bid(self) -> bool {
        matches!(self, BidAction::Hokum | BidAction::Sun | BidAction::Ashkal)
    }

    fn is_sun_type(self) -> bool {
        matches!(self, BidAction::Sun | BidAction::Ashkal)
    }
}

/// One auction event, kept for inference and snapshots.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct BidRecord {
    pub seat: Seat,
    pub action: BidAction,
    pub suit: Option<Suit>,
}

/// What a successful submission did to the auction.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum BidOutcome {
    Accepted,
    /// The auction produced a contract and moved to doubling.
    ContractFinalised,
    /// All four seats passed both rounds; no contract.
    AllPassed,
    GablakTriggered { wait_ms: i64 },
    GablakWaived,
    /// Every live higher-priority seat waived; the tentative bid stands.
    GablakCompleted,
    /// The window expired; the tentative bid stands.
    GablakTimeout,
    Doubled { level: u8 },
    /// A pass closed the doubling chain.
    DoublingClosed,
    VariantChosen,
    Redeal { rotate_dealer: bool },
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
struct TentativeBid {
    seat: Seat,
    action: BidAction,
    suit: Option<Suit>,
    armed_at_ms: i64,
}

/// Contract under construction. Promoted to [`Contract`] when the auction
/// finishes.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
struct ContractDraft {
    contract_type: Option<ContractType>,
    suit: Option<Suit>,
    bidder_seat: Option<Seat>,
    level: u8,
    variant: Option<HokumVariant>,
    is_ashkal: bool,
    round: u8,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct BiddingEngine {
    dealer_index: Seat,
    floor_card: Card,
    match_scores: MatchScores,
    phase: BidPhase,
    current_turn: Seat,
    priority_queue: [Seat; 4],
    draft: ContractDraft,
    tentative_bid: Option<TentativeBid>,
    gablak_deadline_ms: Option<i64>,
    gablak_current_prio: usize,
    pre_gablak_phase: Option<BidPhase>,
    gablak_window_ms: i64,
    passed_r1: [bool; 4],
    passed_r2: [bool; 4],
    has_bid_occurred: bool,
    bid_history: Vec<BidRecord>,
    doubling_history: Vec<BidRecord>,
}

impl BiddingEngine {
    pub fn new(
        dealer_index: Seat,
        floor_card: Card,
        match_scores: MatchScores,
        gablak_window_ms: i64,
    ) -> Self {
        let priority_queue = [
            next_seat(dealer_index),
            (dealer_index + 2) % 4,
            (dealer_index + 3) % 4,
            dealer_index,
        ];
        debug!(dealer = dealer_index, ?priority_queue, "bidding engine ready");
        Self {
            dealer_index,
            floor_card,
            match_scores,
            phase: BidPhase::RoundOne,
            current_turn: next_seat(dealer_index),
            priority_queue,
            draft: ContractDraft {
                level: 1,
                ..Default::default()
            },
            tentative_bid: None,
            gablak_deadline_ms: None,
            gablak_current_prio: 0,
            pre_gablak_phase: None,
            gablak_window_ms,
            passed_r1: [false; 4],
            passed_r2: [false; 4],
            has_bid_occurred: false,
            bid_history: Vec::new(),
            doubling_history: Vec::new(),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn phase(&self) -> BidPhase {
        self.phase
    }

    pub fn bid_history(&self) -> &[BidRecord] {
        &self.bid_history
    }

    pub fn doubling_history(&self) -> &[BidRecord] {
        &self.doubling_history
    }

    pub fn floor_card(&self) -> Card {
        self.floor_card
    }

    /// Seat whose action is expected, accounting for the Gablak window.
    pub fn current_actor(&self) -> Seat {
        if self.phase == BidPhase::GablakWindow && self.gablak_current_prio < SEATS {
            return self.priority_queue[self.gablak_current_prio];
        }
        self.current_turn
    }

    /// Main auction over (contract secured or everyone passed).
    pub fn is_complete(&self) -> bool {
        matches!(
            self.phase,
            BidPhase::Doubling | BidPhase::VariantSelection | BidPhase::Finished
        )
    }

    /// The finished contract, once `phase` is `Finished` with a buyer.
    pub fn contract(&self) -> Option<Contract> {
        let contract_type = self.draft.contract_type?;
        let bidder_seat = self.draft.bidder_seat?;
        Some(Contract {
            contract_type,
            suit: self.draft.suit,
            bidder_seat,
            team: team_of(bidder_seat),
            level: self.draft.level,
            variant: self.draft.variant,
            is_ashkal: self.draft.is_ashkal,
            round: self.draft.round.max(1),
        })
    }

    fn priority_of(&self, seat: Seat) -> usize {
        self.priority_queue
            .iter()
            .position(|&s| s == seat)
            .unwrap_or(SEATS)
    }

    /// The auction round constraints currently in force (the pre-window
    /// round while a Gablak window is open).
    fn active_round_phase(&self) -> BidPhase {
        if self.phase == BidPhase::GablakWindow {
            self.pre_gablak_phase.unwrap_or(BidPhase::RoundOne)
        } else {
            self.phase
        }
    }

    fn has_passed(&self, seat: Seat) -> bool {
        match self.active_round_phase() {
            BidPhase::RoundTwo => {
                self.passed_r1[seat as usize] || self.passed_r2[seat as usize]
            }
            _ => self.passed_r1[seat as usize],
        }
    }

    fn better_player_exists(&self, my_prio: usize) -> bool {
        (0..my_prio).any(|i| !self.has_passed(self.priority_queue[i]))
    }

    /// First priority index still holding Gablak rights. Seats that already
    /// passed waived on entry.
    fn first_live_prio(&self, from: usize) -> usize {
        let mut prio = from;
        while prio < SEATS && self.has_passed(self.priority_queue[prio]) {
            prio += 1;
        }
        prio
    }

    // ── Submission ───────────────────────────────────────────────────

    /// Route one auction action. `hand` is the caller's current hand (used
    /// only by the Kawesh eligibility check).
    pub fn submit(
        &mut self,
        seat: Seat,
        action: BidAction,
        suit: Option<Suit>,
        hand: &[Card],
        now_ms: i64,
    ) -> Result<BidOutcome, BidError> {
        if seat as usize >= SEATS {
            return Err(BidError::InvalidPlayerIndex);
        }
        if self.phase == BidPhase::Finished {
            return Err(BidError::BiddingFinished);
        }
        if action == BidAction::Kawesh {
            return self.handle_kawesh(seat, hand);
        }

        match self.phase {
            BidPhase::RoundOne | BidPhase::RoundTwo | BidPhase::GablakWindow => {
                self.handle_contract_bid(seat, action, suit, now_ms)
            }
            BidPhase::Doubling => self.handle_doubling(seat, action),
            BidPhase::VariantSelection => self.handle_variant(seat, action),
            BidPhase::Finished => Err(BidError::BiddingFinished),
        }
    }

    /// Drive the Gablak deadline. Returns the outcome if the window expired.
    pub fn check_timeout(&mut self, now_ms: i64) -> Option<BidOutcome> {
        if self.phase != BidPhase::GablakWindow {
            return None;
        }
        let deadline = self.gablak_deadline_ms?;
        if now_ms < deadline {
            return None;
        }
        info!("gablak window expired; confirming tentative bid");
        self.finalise_tentative();
        Some(BidOutcome::GablakTimeout)
    }

    // ── Kawesh ───────────────────────────────────────────────────────

    fn handle_kawesh(&mut self, seat: Seat, hand: &[Card]) -> Result<BidOutcome, BidError> {
        if !is_kawesh_hand(hand) {
            return Err(BidError::KaweshHandInvalid);
        }
        let rotate_dealer = self.has_bid_occurred;
        info!(seat, rotate_dealer, "kawesh redeal");
        self.phase = BidPhase::Finished;
        Ok(BidOutcome::Redeal { rotate_dealer })
    }

    // ── Auction rounds ───────────────────────────────────────────────

    fn handle_contract_bid(
        &mut self,
        seat: Seat,
        action: BidAction,
        suit: Option<Suit>,
        now_ms: i64,
    ) -> Result<BidOutcome, BidError> {
        // Nothing outbids SUN.
        if self.draft.contract_type == Some(ContractType::Sun) && action.is_contract_bid() {
            return Err(BidError::IllegalBidForPhase);
        }

        // HOKUM over HOKUM outside the window is a strict priority hijack.
        if self.draft.contract_type == Some(ContractType::Hokum)
            && action == BidAction::Hokum
            && self.phase != BidPhase::GablakWindow
        {
            let bidder_prio = self
                .draft
                .bidder_seat
                .map(|s| self.priority_of(s))
                .unwrap_or(SEATS);
            if self.priority_of(seat) >= bidder_prio {
                return Err(BidError::InsufficientPriority);
            }
        }

        if self.phase == BidPhase::GablakWindow {
            if let Some(outcome) = self.handle_gablak_action(seat, action, now_ms)? {
                return Ok(outcome);
            }
        } else if seat != self.current_turn {
            return Err(BidError::NotYourTurn);
        }

        if action == BidAction::Pass {
            return self.handle_pass(seat);
        }
        if !action.is_contract_bid() {
            return Err(BidError::IllegalBidForPhase);
        }

        self.validate_constraints(seat, action, suit)?;

        let my_prio = self.priority_of(seat);
        if self.better_player_exists(my_prio) {
            return Ok(self.trigger_gablak(seat, action, suit, now_ms));
        }

        // Highest live priority: the bid stands immediately.
        self.set_contract(seat, action, suit);
        if action.is_sun_type() {
            self.start_doubling();
            return Ok(BidOutcome::ContractFinalised);
        }
        if self.phase == BidPhase::GablakWindow {
            // A direct in-window hijack closes the window it was raised in.
            self.phase = self.pre_gablak_phase.take().unwrap_or(BidPhase::RoundOne);
        }
        self.advance_turn();
        if self.phase == BidPhase::Doubling {
            Ok(BidOutcome::ContractFinalised)
        } else {
            Ok(BidOutcome::Accepted)
        }
    }

    /// Handle an action arriving inside the Gablak window. `Ok(None)` means
    /// the action falls through to normal bid processing (a hijack).
    fn handle_gablak_action(
        &mut self,
        seat: Seat,
        action: BidAction,
        now_ms: i64,
    ) -> Result<Option<BidOutcome>, BidError> {
        if let Some(deadline) = self.gablak_deadline_ms {
            if now_ms >= deadline {
                self.finalise_tentative();
                return Ok(Some(BidOutcome::GablakTimeout));
            }
        }

        let Some(tentative) = self.tentative_bid else {
            return Ok(None);
        };
        let tentative_prio = self.priority_of(tentative.seat);

        if action == BidAction::Pass {
            // A waive from the seat currently holding window rights.
            if self.priority_of(seat) == self.gablak_current_prio {
                self.gablak_current_prio = self.first_live_prio(self.gablak_current_prio + 1);
            }
            if self.gablak_current_prio >= tentative_prio {
                info!("all live higher-priority seats waived; confirming");
                self.finalise_tentative();
                return Ok(Some(BidOutcome::GablakCompleted));
            }
            return Ok(Some(BidOutcome::GablakWaived));
        }

        if self.priority_of(seat) >= tentative_prio {
            return Err(BidError::InsufficientPriority);
        }
        Ok(None)
    }

    fn trigger_gablak(
        &mut self,
        seat: Seat,
        action: BidAction,
        suit: Option<Suit>,
        now_ms: i64,
    ) -> BidOutcome {
        if self.phase != BidPhase::GablakWindow {
            self.pre_gablak_phase = Some(self.phase);
        }
        self.tentative_bid = Some(TentativeBid {
            seat,
            action,
            suit,
            armed_at_ms: now_ms,
        });
        self.phase = BidPhase::GablakWindow;
        self.gablak_deadline_ms = Some(now_ms + self.gablak_window_ms);
        self.gablak_current_prio = self.first_live_prio(0);
        info!(seat, ?action, "gablak window armed");
        BidOutcome::GablakTriggered {
            wait_ms: self.gablak_window_ms,
        }
    }

    fn finalise_tentative(&mut self) {
        let Some(tentative) = self.tentative_bid.take() else {
            return;
        };
        self.gablak_deadline_ms = None;
        self.set_contract(tentative.seat, tentative.action, tentative.suit);
        if tentative.action.is_sun_type() {
            self.start_doubling();
        } else {
            self.phase = self.pre_gablak_phase.take().unwrap_or(BidPhase::RoundOne);
            self.advance_turn();
        }
    }

    fn validate_constraints(
        &self,
        seat: Seat,
        action: BidAction,
        suit: Option<Suit>,
    ) -> Result<(), BidError> {
        if action == BidAction::Ashkal {
            if self.floor_card.rank == Rank::Ace {
                return Err(BidError::AceForbidsAshkal);
            }
            let is_dealer = seat == self.dealer_index;
            let is_left = seat == (self.dealer_index + 3) % 4;
            if !is_dealer && !is_left {
                return Err(BidError::AshkalNotEligible);
            }
        }

        if action == BidAction::Hokum {
            let Some(suit) = suit else {
                return Err(BidError::MissingSuit);
            };
            match self.active_round_phase() {
                BidPhase::RoundOne => {
                    if suit != self.floor_card.suit {
                        return Err(BidError::SuitMismatchR1);
                    }
                }
                BidPhase::RoundTwo => {
                    if suit == self.floor_card.suit {
                        return Err(BidError::SuitConflictR2);
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }

    fn set_contract(&mut self, seat: Seat, action: BidAction, suit: Option<Suit>) {
        match action {
            BidAction::Ashkal => {
                // The declarer's partner buys a SUN contract.
                self.draft.contract_type = Some(ContractType::Sun);
                self.draft.bidder_seat = Some((seat + 2) % 4);
                self.draft.suit = None;
                self.draft.is_ashkal = true;
            }
            BidAction::Sun => {
                self.draft.contract_type = Some(ContractType::Sun);
                self.draft.bidder_seat = Some(seat);
                self.draft.suit = None;
                self.draft.is_ashkal = false;
            }
            BidAction::Hokum => {
                self.draft.contract_type = Some(ContractType::Hokum);
                self.draft.bidder_seat = Some(seat);
                self.draft.suit = suit;
                self.draft.is_ashkal = false;
            }
            _ => return,
        }
        self.draft.round = match self.active_round_phase() {
            BidPhase::RoundTwo => 2,
            _ => 1,
        };
        self.has_bid_occurred = true;
        self.tentative_bid = None;
        self.gablak_deadline_ms = None;
        self.bid_history.push(BidRecord { seat, action, suit });
        info!(seat, ?action, ?suit, "contract bid stands");
    }

    fn handle_pass(&mut self, seat: Seat) -> Result<BidOutcome, BidError> {
        match self.phase {
            BidPhase::RoundOne => self.passed_r1[seat as usize] = true,
            BidPhase::RoundTwo => self.passed_r2[seat as usize] = true,
            _ => {}
        }
        self.bid_history.push(BidRecord {
            seat,
            action: BidAction::Pass,
            suit: None,
        });
        self.advance_turn();
        match self.phase {
            BidPhase::Doubling => Ok(BidOutcome::ContractFinalised),
            BidPhase::Finished => Ok(BidOutcome::AllPassed),
            _ => Ok(BidOutcome::Accepted),
        }
    }

    fn advance_turn(&mut self) {
        let next = next_seat(self.current_turn);
        if next == next_seat(self.dealer_index) {
            // Full circle completed.
            if self.draft.contract_type.is_some() {
                self.start_doubling();
                return;
            }
            match self.phase {
                BidPhase::RoundOne => {
                    info!("all passed round 1; opening round 2");
                    self.phase = BidPhase::RoundTwo;
                }
                BidPhase::RoundTwo => {
                    info!("all passed round 2; auction closes with no contract");
                    self.phase = BidPhase::Finished;
                }
                _ => {}
            }
        }
        self.current_turn = next;
    }

    // ── Doubling chain ───────────────────────────────────────────────

    fn start_doubling(&mut self) {
        self.phase = BidPhase::Doubling;
        self.doubling_history.clear();
        if let Some(bidder) = self.draft.bidder_seat {
            self.current_turn = next_seat(bidder);
        }
        debug!(first_turn = self.current_turn, "doubling phase open");
    }

    fn handle_doubling(&mut self, seat: Seat, action: BidAction) -> Result<BidOutcome, BidError> {
        let Some(bidder) = self.draft.bidder_seat else {
            return Err(BidError::IllegalBidForPhase);
        };
        let is_taker_team = team_of(seat) == team_of(bidder);
        let level = self.draft.level;

        let new_level = match action {
            BidAction::Pass => {
                return Ok(self.close_doubling());
            }
            BidAction::Double => {
                if is_taker_team {
                    return Err(BidError::WrongTeamForAction);
                }
                if level >= 2 {
                    return Err(BidError::AlreadyDoubled);
                }
                if self.draft.contract_type == Some(ContractType::Sun) {
                    self.check_sun_firewall(seat, bidder)?;
                }
                2
            }
            BidAction::Triple => {
                if !is_taker_team {
                    return Err(BidError::WrongTeamForAction);
                }
                if level != 2 {
                    return Err(BidError::IllegalBidForPhase);
                }
                3
            }
            BidAction::Four => {
                if is_taker_team {
                    return Err(BidError::WrongTeamForAction);
                }
                if level != 3 {
                    return Err(BidError::IllegalBidForPhase);
                }
                4
            }
            BidAction::Gahwa => {
                if !is_taker_team {
                    return Err(BidError::WrongTeamForAction);
                }
                if level != 4 {
                    return Err(BidError::IllegalBidForPhase);
                }
                GAHWA_LEVEL
            }
            _ => return Err(BidError::IllegalBidForPhase),
        };

        self.draft.level = new_level;
        self.doubling_history.push(BidRecord {
            seat,
            action,
            suit: None,
        });
        info!(seat, ?action, level = new_level, "doubling chain raised");
        Ok(BidOutcome::Doubled { level: new_level })
    }

    fn close_doubling(&mut self) -> BidOutcome {
        if self.draft.contract_type == Some(ContractType::Hokum) {
            if self.draft.level >= GAHWA_LEVEL {
                // Gahwa forces the open variant; no selection phase.
                self.draft.variant = Some(HokumVariant::Open);
                self.phase = BidPhase::Finished;
                info!("gahwa forces OPEN; bidding finished");
            } else {
                self.phase = BidPhase::VariantSelection;
                if let Some(bidder) = self.draft.bidder_seat {
                    self.current_turn = bidder;
                }
            }
        } else {
            self.phase = BidPhase::Finished;
        }
        BidOutcome::DoublingClosed
    }

    /// SUN may only be doubled by a trailing team against a leading buyer.
    fn check_sun_firewall(&self, doubler: Seat, bidder: Seat) -> Result<(), BidError> {
        let bidder_score = self.match_scores.get(team_of(bidder));
        let doubler_score = self.match_scores.get(team_of(doubler));
        if bidder_score >= FIREWALL_SCORE && doubler_score < FIREWALL_SCORE {
            Ok(())
        } else {
            Err(BidError::FirewallViolation)
        }
    }

    // ── Variant selection ────────────────────────────────────────────

    fn handle_variant(&mut self, seat: Seat, action: BidAction) -> Result<BidOutcome, BidError> {
        if Some(seat) != self.draft.bidder_seat {
            return Err(BidError::NotTheBuyer);
        }
        let variant = match action {
            BidAction::Open => HokumVariant::Open,
            BidAction::Closed => HokumVariant::Closed,
            _ => return Err(BidError::InvalidVariant),
        };
        self.draft.variant = Some(variant);
        self.phase = BidPhase::Finished;
        info!(?variant, "variant selected; bidding finished");
        Ok(BidOutcome::VariantChosen)
    }
}
