//! Qayd forensic adjudicator.
//!
//! An accusation freezes play, the adjudicator re-scans the round evidence
//! (initial hand snapshots against the recorded plays), publishes a verdict,
//! and after a short hold window the coordinator applies the penalty. The
//! hold is an absolute deadline polled through `check_timeout`; no code path
//! here calls back into play routines.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::cards::{Card, GameMode, Suit};
use crate::domain::rules::legal_moves;
use crate::domain::state::{RoundState, Seat, TablePlay, SEATS};
use crate::errors::domain::DomainError;

/// Default hold between verdict and resolution.
pub const QAYD_HOLD_MS: i64 = 2_000;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum QaydStatus {
    Idle,
    Triggered,
    Review,
    Result,
    Resolved,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum QaydVerdict {
    /// A violation by the accused side was proven.
    Correct,
    /// No violation exists; the accusation was false.
    False,
    /// The evidence does not decide either way.
    Inconclusive,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum ViolationKind {
    /// Failed to follow the led suit while holding it.
    Revoke,
    /// Failed the over-trump duty while void.
    MustOverTrump,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub offender: Seat,
    pub kind: ViolationKind,
    /// Trick the crime happened in (0-based); the current table counts as
    /// the next index.
    pub trick_index: usize,
    pub card: Card,
    pub led_suit: Suit,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct QaydState {
    pub status: QaydStatus,
    pub accuser: Option<Seat>,
    pub verdict: Option<QaydVerdict>,
    pub violation: Option<Violation>,
    pub hold_deadline_ms: Option<i64>,
}

impl Default for QaydState {
    fn default() -> Self {
        Self {
            status: QaydStatus::Idle,
            accuser: None,
            verdict: None,
            violation: None,
            hold_deadline_ms: None,
        }
    }
}

impl QaydState {
    pub fn status(&self) -> QaydStatus {
        self.status
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.status(), QaydStatus::Idle | QaydStatus::Resolved)
    }

    /// An accuser raises the Qayd. Only valid while idle.
    pub fn raise(&mut self, accuser: Seat) -> Result<(), DomainError> {
        if self.status() != QaydStatus::Idle {
            return Err(DomainError::phase("a qayd is already in progress"));
        }
        self.status = QaydStatus::Triggered;
        self.accuser = Some(accuser);
        info!(accuser, "qayd raised");
        Ok(())
    }

    /// Scan the evidence and publish a verdict with a hold deadline.
    pub fn review(
        &mut self,
        round: &RoundState,
        mode: GameMode,
        trump: Option<Suit>,
        hold_ms: i64,
        now_ms: i64,
    ) -> QaydVerdict {
        self.status = QaydStatus::Review;

        let verdict = if round.initial_hands.iter().all(Vec::is_empty) {
            // No forensic snapshot (e.g. state restored without hands).
            warn!("qayd review without initial hands; inconclusive");
            QaydVerdict::Inconclusive
        } else {
            match scan_for_violations(round, mode, trump).into_iter().next() {
                Some(violation) => {
                    info!(
                        offender = violation.offender,
                        kind = ?violation.kind,
                        "qayd verdict: violation proven"
                    );
                    self.violation = Some(violation);
                    QaydVerdict::Correct
                }
                None => {
                    info!("qayd verdict: no violation found");
                    QaydVerdict::False
                }
            }
        };

        self.verdict = Some(verdict);
        self.status = QaydStatus::Result;
        self.hold_deadline_ms = Some(now_ms + hold_ms);
        verdict
    }

    /// Drive the hold deadline. Returns the verdict once resolved.
    pub fn check_timeout(&mut self, now_ms: i64) -> Option<QaydVerdict> {
        if self.status() != QaydStatus::Result {
            return None;
        }
        let deadline = self.hold_deadline_ms?;
        if now_ms < deadline {
            return None;
        }
        self.status = QaydStatus::Resolved;
        self.hold_deadline_ms = None;
        self.verdict
    }
}

/// Re-scan the whole round for revokes and over-trump violations.
///
/// Hands are reconstructed play by play from the initial snapshots, and each
/// recorded play is re-checked against the legal-move kernel at the moment
/// it happened. Chronological order: completed tricks, then the open table.
pub fn scan_for_violations(
    round: &RoundState,
    mode: GameMode,
    trump: Option<Suit>,
) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut remaining: Vec<Vec<Card>> = round.initial_hands.to_vec();
    if remaining.len() != SEATS {
        return violations;
    }

    let mut check_play = |prefix: &[TablePlay],
                          play: &TablePlay,
                          trick_index: usize,
                          remaining: &mut Vec<Vec<Card>>| {
        let seat = play.seat as usize % SEATS;
        let hand = remaining[seat].clone();
        let Some(pos) = hand.iter().position(|&c| c == play.card) else {
            // Card not in the reconstructed hand: evidence is corrupt, skip.
            warn!(seat, card = %play.card, "qayd scan: card missing from snapshot");
            return;
        };
        if let Some(led) = prefix.first().map(|p| p.card.suit) {
            let legal = legal_moves(&hand, prefix, mode, trump, play.seat);
            if !legal.contains(&pos) {
                let kind = if play.card.suit != led && hand.iter().any(|c| c.suit == led) {
                    ViolationKind::Revoke
                } else {
                    ViolationKind::MustOverTrump
                };
                violations.push(Violation {
                    offender: play.seat,
                    kind,
                    trick_index,
                    card: play.card,
                    led_suit: led,
                });
            }
        }
        remaining[seat].remove(pos);
    };

    for (trick_index, trick) in round.round_history.iter().enumerate() {
        for (i, play) in trick.plays.iter().enumerate() {
            check_play(&trick.plays[..i], play, trick_index, &mut remaining);
        }
    }
    let current_index = round.round_history.len();
    for (i, play) in round.table_cards.iter().enumerate() {
        check_play(&round.table_cards[..i], play, current_index, &mut remaining);
    }

    violations
}
