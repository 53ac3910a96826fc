//! Seats, teams, table/trick records and per-round state.

use serde::{Deserialize, Serialize};

use crate::domain::cards::{Card, GameMode, Suit};

/// Seat index, clockwise: 0=Bottom, 1=Right, 2=Top, 3=Left.
pub type Seat = u8;

pub const SEATS: usize = 4;
pub const SEAT_NAMES: [&str; 4] = ["Bottom", "Right", "Top", "Left"];

/// Game points a team must reach to win the match.
pub const MATCH_TARGET: i32 = 152;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Team {
    Us,
    Them,
}

impl Team {
    pub fn other(self) -> Team {
        match self {
            Team::Us => Team::Them,
            Team::Them => Team::Us,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Team::Us => "us",
            Team::Them => "them",
        }
    }
}

/// Bottom and Top form "us"; Right and Left form "them".
pub fn team_of(seat: Seat) -> Team {
    if seat % 2 == 0 {
        Team::Us
    } else {
        Team::Them
    }
}

pub fn partner_of(seat: Seat) -> Seat {
    (seat + 2) % 4
}

pub fn next_seat(seat: Seat) -> Seat {
    (seat + 1) % 4
}

pub fn seat_name(seat: Seat) -> &'static str {
    SEAT_NAMES[seat as usize % 4]
}

/// Coordinator lifecycle phase.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum GamePhase {
    Waiting,
    Bidding,
    Playing,
    Challenge,
    Finished,
    GameOver,
    Abandoned,
}

/// One card on the table, with the play-legality tag consumed by Qayd.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TablePlay {
    pub seat: Seat,
    pub card: Card,
    /// Set only in permissive mode when the play broke the legality rules.
    pub is_illegal: bool,
}

/// A resolved trick, stored in play order.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct CompletedTrick {
    pub plays: Vec<TablePlay>,
    pub leader: Seat,
    pub winner: Seat,
    /// Card abnat only; the last-trick bonus is applied at scoring time.
    pub points: u16,
}

impl CompletedTrick {
    pub fn led_suit(&self) -> Option<Suit> {
        self.plays.first().map(|p| p.card.suit)
    }
}

/// Match-level score per team, in game points.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchScores {
    pub us: i32,
    pub them: i32,
}

impl MatchScores {
    pub fn get(&self, team: Team) -> i32 {
        match team {
            Team::Us => self.us,
            Team::Them => self.them,
        }
    }

    pub fn add(&mut self, team: Team, gp: i32) {
        match team {
            Team::Us => self.us += gp,
            Team::Them => self.them += gp,
        }
    }

    pub fn leader(&self) -> Option<Team> {
        match self.us.cmp(&self.them) {
            std::cmp::Ordering::Greater => Some(Team::Us),
            std::cmp::Ordering::Less => Some(Team::Them),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Mutable state of the round in progress.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RoundState {
    pub dealer_index: Seat,
    pub floor_card: Option<Card>,
    pub hands: [Vec<Card>; 4],
    /// Hands as they stood when the deal completed; forensic evidence for Qayd.
    pub initial_hands: [Vec<Card>; 4],
    pub table_cards: Vec<TablePlay>,
    pub round_history: Vec<CompletedTrick>,
    pub current_turn: Seat,
    pub mode: Option<GameMode>,
    pub trump_suit: Option<Suit>,
    /// Cards not yet dealt (floor card excluded).
    pub undealt: Vec<Card>,
}

impl RoundState {
    pub fn new(dealer_index: Seat) -> Self {
        Self {
            dealer_index,
            floor_card: None,
            hands: Default::default(),
            initial_hands: Default::default(),
            table_cards: Vec::new(),
            round_history: Vec::new(),
            current_turn: next_seat(dealer_index),
            mode: None,
            trump_suit: None,
            undealt: Vec::new(),
        }
    }

    pub fn tricks_played(&self) -> usize {
        self.round_history.len()
    }

    pub fn tricks_won_by(&self, team: Team) -> usize {
        self.round_history
            .iter()
            .filter(|t| team_of(t.winner) == team)
            .count()
    }

    pub fn led_suit(&self) -> Option<Suit> {
        self.table_cards.first().map(|p| p.card.suit)
    }

    /// Total number of card objects accounted for across all containers.
    /// Must always equal 32 between deals (invariant I1).
    pub fn card_count_total(&self) -> usize {
        self.hands.iter().map(Vec::len).sum::<usize>()
            + self.table_cards.len()
            + self
                .round_history
                .iter()
                .map(|t| t.plays.len())
                .sum::<usize>()
            + usize::from(self.floor_card.is_some())
            + self.undealt.len()
    }
}
