//! Bot layer: card memory, inference, tactics, the endgame solver and the
//! priority-cascade brain that plays bot seats.
//!
//! Structure, leaves first:
//! - [`memory`] — per-seat voids, played set, Bayesian suit probabilities
//! - [`bid_reader`], [`partner_read`], [`opponent_model`], [`trick_review`]
//!   — pure inference over observable history
//! - [`lead_selector`], [`follow_optimizer`], [`trump_manager`],
//!   [`point_density`], [`cooperative`], [`galoss`] — tactical modules
//!   returning [`advice::Advice`]
//! - [`solver`] — alpha-beta minimax with Monte-Carlo determinization
//! - [`brain`] — the fusion layer; [`personality`] filters its picks
//! - [`sherlock`] — the detective that raises Qayd accusations
//!
//! Every module is a pure function of a read-only [`view::BotView`]; the
//! coordinator owns all mutation.

pub mod advice;
pub mod bid_reader;
pub mod brain;
pub mod calibration;
pub mod cooperative;
pub mod follow_optimizer;
pub mod galoss;
pub mod lead_selector;
pub mod memory;
pub mod opponent_model;
pub mod partner_read;
pub mod personality;
pub mod point_density;
pub mod random;
pub mod registry;
pub mod sherlock;
pub mod solver;
pub mod trait_def;
pub mod trick_review;
pub mod trump_manager;
pub mod view;

pub use advice::{Advice, Tactic};
pub use brain::BrainBot;
pub use memory::CardMemory;
pub use personality::PersonalityProfile;
pub use random::RandomPlayer;
pub use registry::create_bot;
pub use trait_def::{AiError, BidDecision, BotPlayer};
pub use view::{BidView, BotView};
