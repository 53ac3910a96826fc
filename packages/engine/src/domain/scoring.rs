//! Scoring engine: abnat tallying, GP conversion, Kaboot, Khasara, doubling,
//! Gahwa and the immune Baloot addition.
//!
//! The pipeline runs in a fixed order. Trick abnat and the last-trick bonus
//! come first; a sweep short-circuits conversion with a fixed pot; otherwise
//! the per-mode rounding produces game points that always pair-sum to the
//! mode total. Projects join before the Khasara check, multipliers after it,
//! and Baloot points land last, untouched by any multiplier.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::cards::GameMode;
use crate::domain::contract::Contract;
use crate::domain::state::{team_of, CompletedTrick, Team};
use crate::errors::domain::DomainError;

pub const TOTAL_ABNAT_SUN: u16 = 130;
pub const TOTAL_ABNAT_HOKUM: u16 = 162;
pub const TOTAL_GP_SUN: i32 = 26;
pub const TOTAL_GP_HOKUM: i32 = 16;
pub const LAST_TRICK_BONUS: u16 = 10;
pub const KABOOT_GP_SUN: i32 = 44;
pub const KABOOT_GP_HOKUM: i32 = 25;
/// Gahwa behaves as a 4x multiplier when neither team is shut out.
pub const GAHWA_MULTIPLIER: i32 = 4;
pub const GAHWA_SHUTOUT_GP: i32 = 152;

/// Everything the scoring engine needs about a finished round.
#[derive(Debug, Clone)]
pub struct ScoreInputs<'a> {
    pub round_history: &'a [CompletedTrick],
    pub contract: &'a Contract,
    /// Surviving project abnat per team (losers were discarded at trick 1).
    pub project_abnat_us: u16,
    pub project_abnat_them: u16,
    /// Committed Baloot GP per team.
    pub baloot_us: i32,
    pub baloot_them: i32,
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct TeamBreakdown {
    /// Final game points for the round.
    pub result: i32,
    /// Raw card abnat including the last-trick bonus.
    pub card_points: u16,
    /// Project game points (post conversion).
    pub project_points: i32,
    /// Won the last trick.
    pub ardh: bool,
    pub is_kaboot: bool,
    pub multiplier_applied: i32,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RoundScore {
    pub us: TeamBreakdown,
    pub them: TeamBreakdown,
    pub winner: Team,
    pub reason: String,
}

impl RoundScore {
    pub fn result(&self, team: Team) -> i32 {
        match team {
            Team::Us => self.us.result,
            Team::Them => self.them.result,
        }
    }
}

/// SUN conversion: `(raw * 2) / 10` rounded to the nearest point.
///
/// `raw * 2` is always even, so the tenths digit is never 5 and the
/// Kammelna-validated banker's rounding never actually meets a tie.
fn sun_gp(raw: u16) -> i32 {
    ((raw as i32) * 2 + 5) / 10
}

/// HOKUM conversion: `raw / 10` with half-down rounding. Exactly .5 rounds
/// down (65 -> 6), anything above rounds up (66 -> 7).
fn hokum_gp(raw: u16) -> i32 {
    (raw as i32) / 10 + i32::from(raw % 10 > 5)
}

pub fn score_round(inputs: &ScoreInputs) -> Result<RoundScore, DomainError> {
    let contract = inputs.contract;
    let mode = contract.mode();
    let buyer = contract.team;

    if inputs.round_history.len() != 8 {
        return Err(DomainError::fatal(format!(
            "scoring a round with {} tricks",
            inputs.round_history.len()
        )));
    }

    // ── Step 1: raw abnat per team, plus the Ardh bonus ──────────────
    let mut raw_us: u16 = 0;
    let mut raw_them: u16 = 0;
    for trick in inputs.round_history {
        match team_of(trick.winner) {
            Team::Us => raw_us += trick.points,
            Team::Them => raw_them += trick.points,
        }
    }
    let last_winner = team_of(
        inputs
            .round_history
            .last()
            .map(|t| t.winner)
            .unwrap_or_default(),
    );
    match last_winner {
        Team::Us => raw_us += LAST_TRICK_BONUS,
        Team::Them => raw_them += LAST_TRICK_BONUS,
    }

    let expected_total = match mode {
        GameMode::Sun => TOTAL_ABNAT_SUN,
        GameMode::Hokum => TOTAL_ABNAT_HOKUM,
    };
    if raw_us + raw_them != expected_total {
        return Err(DomainError::fatal(format!(
            "abnat total {} != {expected_total}",
            raw_us + raw_them
        )));
    }

    let tricks_us = inputs
        .round_history
        .iter()
        .filter(|t| team_of(t.winner) == Team::Us)
        .count();
    let kaboot_team = match tricks_us {
        8 => Some(Team::Us),
        0 => Some(Team::Them),
        _ => None,
    };

    // ── Steps 2-3: trick GP, by sweep pot or by conversion ───────────
    let (mut gp_us, mut gp_them) = match kaboot_team {
        Some(sweeper) => {
            let pot = match mode {
                GameMode::Sun => KABOOT_GP_SUN,
                GameMode::Hokum => KABOOT_GP_HOKUM,
            };
            info!(team = sweeper.label(), pot, "kaboot sweep");
            match sweeper {
                Team::Us => (pot, 0),
                Team::Them => (0, pot),
            }
        }
        None => {
            let (mut us, mut them) = match mode {
                GameMode::Sun => (sun_gp(raw_us), sun_gp(raw_them)),
                GameMode::Hokum => (hokum_gp(raw_us), hokum_gp(raw_them)),
            };
            let target = match mode {
                GameMode::Sun => TOTAL_GP_SUN,
                GameMode::Hokum => TOTAL_GP_HOKUM,
            };
            // Pair rounding: individual rounding may overshoot by one; the
            // team with the larger raw absorbs the correction.
            while us + them > target {
                if raw_us >= raw_them {
                    us -= 1;
                } else {
                    them -= 1;
                }
            }
            while us + them < target {
                if raw_us >= raw_them {
                    us += 1;
                } else {
                    them += 1;
                }
            }
            (us, them)
        }
    };

    // ── Step 4: project points ───────────────────────────────────────
    let convert_project = |abnat: u16| -> i32 {
        match mode {
            GameMode::Sun => (abnat as i32 * 2) / 10,
            GameMode::Hokum => abnat as i32 / 10,
        }
    };
    let proj_us = convert_project(inputs.project_abnat_us);
    let proj_them = convert_project(inputs.project_abnat_them);
    gp_us += proj_us;
    gp_them += proj_them;

    // ── Step 5: Khasara (contract loss). A sweep keeps its pot. ──────
    let mut reason = String::from("points");
    if kaboot_team.is_none() {
        let (buyer_gp, defender_gp) = match buyer {
            Team::Us => (gp_us, gp_them),
            Team::Them => (gp_them, gp_us),
        };
        if buyer_gp <= defender_gp {
            let pot = gp_us + gp_them;
            match buyer {
                Team::Us => {
                    gp_us = 0;
                    gp_them = pot;
                }
                Team::Them => {
                    gp_them = 0;
                    gp_us = pot;
                }
            }
            reason = format!("khasara: {} lost the contract", buyer.label());
            info!(buyer = buyer.label(), pot, "khasara");
        }
    } else {
        reason = String::from("kaboot");
    }

    // ── Steps 6-7: doubling multiplier, Gahwa resolution ─────────────
    let mut multiplier = 1;
    if contract.is_gahwa() {
        if gp_us == 0 || gp_them == 0 {
            let shut_out = if gp_us == 0 { Team::Us } else { Team::Them };
            match shut_out {
                Team::Us => gp_them = GAHWA_SHUTOUT_GP,
                Team::Them => gp_us = GAHWA_SHUTOUT_GP,
            }
            reason = format!("gahwa shutout against {}", shut_out.label());
            info!(shut_out = shut_out.label(), "gahwa shutout");
        } else {
            multiplier = GAHWA_MULTIPLIER;
            gp_us *= multiplier;
            gp_them *= multiplier;
            reason = String::from("gahwa");
        }
    } else if contract.multiplier() > 1 {
        multiplier = contract.multiplier();
        gp_us *= multiplier;
        gp_them *= multiplier;
    }

    // ── Step 8: Baloot, immune to every multiplier ───────────────────
    gp_us += inputs.baloot_us;
    gp_them += inputs.baloot_them;

    let winner = match gp_us.cmp(&gp_them) {
        std::cmp::Ordering::Greater => Team::Us,
        std::cmp::Ordering::Less => Team::Them,
        // Conceptually the last-trick bonus sides with the buyer on a tie.
        std::cmp::Ordering::Equal => buyer,
    };

    debug!(gp_us, gp_them, winner = winner.label(), %reason, "round scored");

    Ok(RoundScore {
        us: TeamBreakdown {
            result: gp_us,
            card_points: raw_us,
            project_points: proj_us,
            ardh: last_winner == Team::Us,
            is_kaboot: kaboot_team == Some(Team::Us),
            multiplier_applied: multiplier,
        },
        them: TeamBreakdown {
            result: gp_them,
            card_points: raw_them,
            project_points: proj_them,
            ardh: last_winner == Team::Them,
            is_kaboot: kaboot_team == Some(Team::Them),
            multiplier_applied: multiplier,
        },
        winner,
        reason,
    })
}
