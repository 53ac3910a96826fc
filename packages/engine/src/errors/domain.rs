//! Domain-level error taxonomy.
//!
//! Rule, phase, turn and eligibility failures are returned as values and
//! never interrupt state: the game stays where it was and the caller may
//! retry. Only [`DomainError::Fatal`] (an invariant violation such as a
//! missing or duplicated card) forces round abandonment.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::state::Seat;

/// Central domain error type.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum DomainError {
    /// Malformed input: bad seat index, unknown action, out-of-range hand index.
    #[error("invalid input: {0}")]
    Input(String),

    /// Action not valid in the current phase.
    #[error("action not valid in this phase: {0}")]
    Phase(String),

    /// Not the acting seat's turn.
    #[error("not your turn (seat {expected} to act)")]
    Turn { expected: Seat },

    /// Illegal play under strict legality.
    #[error("illegal play: {0}")]
    Rule(String),

    /// Position/score/hand eligibility failure (Ashkal, Kawesh, firewall).
    #[error("not eligible: {0}")]
    Eligibility(String),

    /// The Qayd adjudicator could not reach a verdict.
    #[error("inconclusive")]
    Inconclusive,

    /// Invariant violation; the round must be abandoned rather than corrupted.
    #[error("fatal invariant violation: {0}")]
    Fatal(String),

    /// Auction-specific rejection.
    #[error(transparent)]
    Bid(#[from] BidError),
}

impl DomainError {
    pub fn input(detail: impl Into<String>) -> Self {
        Self::Input(detail.into())
    }
    pub fn phase(detail: impl Into<String>) -> Self {
        Self::Phase(detail.into())
    }
    pub fn rule(detail: impl Into<String>) -> Self {
        Self::Rule(detail.into())
    }
    pub fn eligibility(detail: impl Into<String>) -> Self {
        Self::Eligibility(detail.into())
    }
    pub fn fatal(detail: impl Into<String>) -> Self {
        Self::Fatal(detail.into())
    }
}

/// Rejections produced by the bidding engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum BidError {
    #[error("not your turn")]
    NotYourTurn,
    #[error("bid not valid in this phase")]
    IllegalBidForPhase,
    #[error("round 1 hokum must use the floor suit")]
    SuitMismatchR1,
    #[error("round 2 hokum cannot use the floor suit")]
    SuitConflictR2,
    #[error("ashkal is banned when the floor card is an ace")]
    AceForbidsAshkal,
    #[error("seat not eligible for ashkal")]
    AshkalNotEligible,
    #[error("sun double blocked by the score firewall")]
    FirewallViolation,
    #[error("contract already doubled")]
    AlreadyDoubled,
    #[error("wrong team for this doubling action")]
    WrongTeamForAction,
    #[error("kawesh requires a hand without court cards")]
    KaweshHandInvalid,
    #[error("bidding is finished")]
    BiddingFinished,
    #[error("invalid player index")]
    InvalidPlayerIndex,
    #[error("this bid requires a suit")]
    MissingSuit,
    #[error("not enough priority to hijack")]
    InsufficientPriority,
    #[error("only the buyer may choose the variant")]
    NotTheBuyer,
    #[error("variant must be open or closed")]
    InvalidVariant,
}
