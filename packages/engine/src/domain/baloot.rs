//! Baloot K+Q declaration tracking (HOKUM only).
//!
//! Two-phase flow: playing the first royal of trump announces "Baloot"
//! (worth nothing yet); playing the second scores exactly 2 GP for the
//! holder's team. The award is immune to doubling and Khasara — the scoring
//! engine adds it after every multiplier.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::cards::{Card, GameMode, Rank, Suit};
use crate::domain::state::{team_of, Seat, Team, SEATS};

/// Fixed award per completed declaration.
pub const BALOOT_GAME_POINTS: i32 = 2;
pub const BALOOT_ABNAT: u16 = 20;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum BalootPhase {
    /// First royal played.
    Announced,
    /// Second royal played; points committed.
    Declared,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct BalootEvent {
    pub phase: BalootPhase,
    pub seat: Seat,
    pub card: Card,
    pub game_points: i32,
}

#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct BalootState {
    /// Seats that held both K and Q of trump at deal time. Fixed per round.
    holders: [bool; 4],
    king_played: [bool; 4],
    queen_played: [bool; 4],
    announced: [bool; 4],
    declared: [bool; 4],
}

impl BalootState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Record who holds K+Q of trump once the deal completes.
    pub fn scan_initial_hands(
        &mut self,
        hands: &[Vec<Card>; 4],
        mode: GameMode,
        trump: Option<Suit>,
    ) {
        self.reset();
        if mode != GameMode::Hokum {
            return;
        }
        let Some(trump) = trump else { return };
        for (seat, hand) in hands.iter().enumerate() {
            let has_k = hand.contains(&Card::new(trump, Rank::King));
            let has_q = hand.contains(&Card::new(trump, Rank::Queen));
            if has_k && has_q {
                self.holders[seat] = true;
                info!(seat, "seat holds baloot (K+Q of trump)");
            }
        }
    }

    pub fn holds_baloot(&self, seat: Seat) -> bool {
        self.holders[seat as usize % SEATS] && !self.declared[seat as usize % SEATS]
    }

    pub fn is_declared(&self, seat: Seat) -> bool {
        self.declared[seat as usize % SEATS]
    }

    /// Track one played card. `blocked` is true when a declared project
    /// (four kings/queens, or a 100 containing K+Q of trump) forbids the
    /// Baloot for this seat.
    pub fn on_card_played(
        &mut self,
        seat: Seat,
        card: Card,
        mode: GameMode,
        trump: Option<Suit>,
        blocked: bool,
    ) -> Option<BalootEvent> {
        if mode != GameMode::Hokum {
            return None;
        }
        let trump = trump?;
        if card.suit != trump || !matches!(card.rank, Rank::King | Rank::Queen) {
            return None;
        }
        let idx = seat as usize % SEATS;
        if !self.holders[idx] || self.declared[idx] || blocked {
            return None;
        }

        match card.rank {
            Rank::King => self.king_played[idx] = true,
            Rank::Queen => self.queen_played[idx] = true,
            _ => {}
        }
        let played = u8::from(self.king_played[idx]) + u8::from(self.queen_played[idx]);

        if played == 1 && !self.announced[idx] {
            self.announced[idx] = true;
            info!(seat, %card, "baloot announced");
            return Some(BalootEvent {
                phase: BalootPhase::Announced,
                seat,
                card,
                game_points: 0,
            });
        }
        if played == 2 {
            self.declared[idx] = true;
            info!(seat, %card, "re-baloot declared, 2 GP committed");
            return Some(BalootEvent {
                phase: BalootPhase::Declared,
                seat,
                card,
                game_points: BALOOT_GAME_POINTS,
            });
        }
        None
    }

    /// Committed game points per team, added after every multiplier.
    pub fn team_points(&self) -> (i32, i32) {
        let mut us = 0;
        let mut them = 0;
        for seat in 0..SEATS as Seat {
            if self.declared[seat as usize] {
                match team_of(seat) {
                    Team::Us => us += BALOOT_GAME_POINTS,
                    Team::Them => them += BALOOT_GAME_POINTS,
                }
            }
        }
        (us, them)
    }
}
