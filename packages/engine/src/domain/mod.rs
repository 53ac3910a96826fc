//! Domain layer: pure game logic types and state machines.

pub mod baloot;
pub mod bidding;
pub mod cards;
pub mod contract;
pub mod dealing;
pub mod projects;
pub mod qayd;
pub mod rules;
pub mod scoring;
pub mod state;
pub mod tricks;

#[cfg(test)]
mod tests_props;

// Re-exports for ergonomics
pub use baloot::{BalootEvent, BalootState};
pub use bidding::{BidAction, BidOutcome, BidPhase, BidRecord, BiddingEngine};
pub use cards::{card_points, Card, GameMode, Rank, Suit, ORDER_HOKUM, ORDER_SUN};
pub use contract::{Contract, ContractType, HokumVariant};
pub use projects::{Project, ProjectKind, ProjectManager};
pub use qayd::{QaydState, QaydStatus, QaydVerdict};
pub use rules::{legal_moves, trick_winner};
pub use scoring::{score_round, RoundScore, ScoreInputs};
pub use state::{
    next_seat, partner_of, seat_name, team_of, CompletedTrick, GamePhase, MatchScores, RoundState,
    Seat, TablePlay, Team, MATCH_TARGET, SEATS,
};
