//! Snapshot/restore: the full serialisable state of one table.
//!
//! Hosts take snapshots at quiescent points (phase boundaries) and persist
//! them however they like; `snapshot → restore → snapshot` is a fixed point
//! in every phase, including GABLAK_WINDOW and CHALLENGE, because deadlines
//! are absolute timestamps carried in the state.

use serde::{Deserialize, Serialize};

use crate::ai::memory::CardMemory;
use crate::domain::baloot::BalootState;
use crate::domain::bidding::BiddingEngine;
use crate::domain::contract::Contract;
use crate::domain::projects::ProjectManager;
use crate::domain::qayd::QaydState;
use crate::domain::state::{GamePhase, MatchScores, RoundState, SEATS};
use crate::errors::domain::DomainError;
use crate::game::coordinator::{GameConfig, GameCoordinator, PlayerSlot, RoundOutcome};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub room_id: String,
    pub config: GameConfig,
    pub phase: GamePhase,
    pub players: Vec<PlayerSlot>,
    pub round: RoundState,
    pub bidding: Option<BiddingEngine>,
    pub contract: Option<Contract>,
    pub projects: ProjectManager,
    pub baloot: BalootState,
    pub qayd: QaydState,
    pub memory: CardMemory,
    pub match_scores: MatchScores,
    pub past_round_results: Vec<RoundOutcome>,
    pub round_no: u32,
    pub deal_counter: u64,
    pub is_locked: bool,
}

impl GameCoordinator {
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            room_id: self.room_id.clone(),
            config: self.config,
            phase: self.phase,
            players: self.players.clone(),
            round: self.round.clone(),
            bidding: self.bidding.clone(),
            contract: self.contract.clone(),
            projects: self.projects.clone(),
            baloot: self.baloot.clone(),
            qayd: self.qayd.clone(),
            memory: self.memory,
            match_scores: self.match_scores,
            past_round_results: self.past_round_results.clone(),
            round_no: self.round_no,
            deal_counter: self.deal_counter,
            is_locked: self.is_locked,
        }
    }

    /// Rebuild a coordinator from a snapshot, re-checking the invariants a
    /// host could have corrupted in storage.
    pub fn restore(snapshot: GameSnapshot) -> Result<Self, DomainError> {
        match snapshot.phase {
            GamePhase::Waiting => {}
            _ => {
                if snapshot.players.len() != SEATS {
                    return Err(DomainError::fatal(format!(
                        "snapshot has {} players",
                        snapshot.players.len()
                    )));
                }
                let total = snapshot.round.card_count_total();
                if total != 32 {
                    return Err(DomainError::fatal(format!(
                        "snapshot accounts for {total} cards, expected 32"
                    )));
                }
            }
        }

        Ok(Self {
            room_id: snapshot.room_id,
            config: snapshot.config,
            phase: snapshot.phase,
            players: snapshot.players,
            round: snapshot.round,
            bidding: snapshot.bidding,
            contract: snapshot.contract,
            projects: snapshot.projects,
            baloot: snapshot.baloot,
            qayd: snapshot.qayd,
            memory: snapshot.memory,
            match_scores: snapshot.match_scores,
            past_round_results: snapshot.past_round_results,
            round_no: snapshot.round_no,
            deal_counter: snapshot.deal_counter,
            is_locked: snapshot.is_locked,
        })
    }
}
