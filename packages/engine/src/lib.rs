#![cfg_attr(not(test), deny(clippy::expect_used, clippy::unwrap_used, clippy::panic, clippy::todo, clippy::unimplemented))]

//! Baloot rules core and AI decision engine.
//!
//! The crate is split in three layers:
//! - [`domain`] — pure game logic: cards, dealing, the legal-move kernel,
//!   the bidding state machine, trick management, declarations, scoring and
//!   the Qayd forensic adjudicator.
//! - [`game`] — the coordinator that owns one table's state, routes actions
//!   through validation, and exposes snapshot/restore and redacted views.
//! - [`ai`] — card memory, inference, tactical modules, the endgame solver
//!   and the priority-cascade "brain" that plays bot seats.
//!
//! The engine is single-threaded and cooperative: the coordinator is the
//! sole mutator, every other module is a pure function of observable state.
//! The only waits (Gablak window, Qayd hold) are absolute deadlines polled
//! through `check_timeout`; nothing in the crate sleeps.

pub mod ai;
pub mod domain;
pub mod errors;
pub mod game;

// Re-exports for public API
pub use domain::cards::{Card, GameMode, Rank, Suit};
pub use domain::contract::{Contract, ContractType, HokumVariant};
pub use domain::state::{team_of, GamePhase, Seat, Team};
pub use errors::domain::{BidError, DomainError};
pub use game::coordinator::{GameConfig, GameCoordinator};
pub use game::snapshot::GameSnapshot;
