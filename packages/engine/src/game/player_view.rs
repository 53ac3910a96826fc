//! Redacted per-seat views of the table.
//!
//! `get_state(seat)` shows the requested seat its own hand; every other
//! hand appears as a count only. A `None` seat produces the spectator view
//! with no hand at all.

use serde::{Deserialize, Serialize};

use crate::domain::bidding::{BidPhase, BidRecord};
use crate::domain::cards::{Card, GameMode, Suit};
use crate::domain::contract::Contract;
use crate::domain::projects::Project;
use crate::domain::qayd::{QaydStatus, QaydVerdict};
use crate::domain::state::{GamePhase, MatchScores, Seat, TablePlay, SEATS};
use crate::game::coordinator::GameCoordinator;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatPublic {
    pub seat: Seat,
    pub name: String,
    pub hand_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub room_id: String,
    pub phase: GamePhase,
    pub your_seat: Option<Seat>,
    /// Your private hand; empty for spectators.
    pub hand: Vec<Card>,
    pub seats: Vec<SeatPublic>,
    pub table_cards: Vec<TablePlay>,
    pub floor_card: Option<Card>,
    pub mode: Option<GameMode>,
    pub trump_suit: Option<Suit>,
    pub contract: Option<Contract>,
    pub current_turn: Seat,
    pub dealer_index: Seat,
    pub match_scores: MatchScores,
    pub bidding_phase: Option<BidPhase>,
    pub bid_history: Vec<BidRecord>,
    pub tricks_played: usize,
    /// Resolved public declarations (after the trick-1 window).
    pub declarations: Vec<Project>,
    pub qayd_status: QaydStatus,
    pub qayd_verdict: Option<QaydVerdict>,
    pub round_no: u32,
    pub is_locked: bool,
}

impl GameCoordinator {
    /// Produce a view redacted to the requested seat.
    pub fn get_state(&self, seat: Option<Seat>) -> PlayerView {
        let your_seat = seat.filter(|&s| (s as usize) < SEATS);
        let hand = your_seat
            .map(|s| self.round.hands[s as usize].clone())
            .unwrap_or_default();

        let seats = (0..SEATS)
            .map(|i| SeatPublic {
                seat: i as Seat,
                name: self
                    .players
                    .get(i)
                    .map(|p| p.name.clone())
                    .unwrap_or_default(),
                hand_count: self.round.hands[i].len(),
            })
            .collect();

        let declarations = if self.projects.is_resolved() {
            self.projects.all().cloned().collect()
        } else {
            Vec::new()
        };

        PlayerView {
            room_id: self.room_id.clone(),
            phase: self.phase,
            your_seat,
            hand,
            seats,
            table_cards: self.round.table_cards.clone(),
            floor_card: self.round.floor_card,
            mode: self.round.mode,
            trump_suit: self.round.trump_suit,
            contract: self.contract.clone(),
            current_turn: self.current_turn(),
            dealer_index: self.round.dealer_index,
            match_scores: self.match_scores,
            bidding_phase: self.bidding.as_ref().map(|b| b.phase()),
            bid_history: self
                .bidding
                .as_ref()
                .map(|b| b.bid_history().to_vec())
                .unwrap_or_default(),
            tricks_played: self.round.round_history.len(),
            declarations,
            qayd_status: self.qayd.status(),
            qayd_verdict: self.qayd.verdict,
            round_no: self.round_no,
            is_locked: self.is_locked,
        }
    }
}
