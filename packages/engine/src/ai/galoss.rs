//! Galoss (Khasara) guard: mid-round contract-loss-risk detection and the
//! emergency overrides that switch the strategy from point-maximisation to
//! point-denial (or all-out rescue) when the contract is slipping.

use crate::ai::advice::{Advice, Tactic};
use crate::ai::view::BotView;
use crate::domain::cards::{card_points, rank_strength, GameMode, Rank};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum GalossRisk {
    None,
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GalossCheck {
    pub risk_level: GalossRisk,
    pub we_risk_galoss: bool,
    pub they_risk_galoss: bool,
    pub emergency_mode: bool,
    /// Positive when the buyer trails.
    pub buyer_deficit: i32,
    pub tricks_remaining: usize,
}

/// Estimate abnat still on the table from the scoring pace so far.
fn estimate_remaining(tricks_played: usize, scored: u16, mode: GameMode) -> i32 {
    let tricks_remaining = 8usize.saturating_sub(tricks_played);
    let avg_per_trick = if tricks_played > 0 {
        scored as f32 / tricks_played as f32
    } else if mode == GameMode::Sun {
        16.0
    } else {
        20.0
    };
    let mut estimate = (avg_per_trick * tricks_remaining as f32) as i32;
    if tricks_remaining > 0 {
        estimate += 10; // last-trick bonus still out there
    }
    estimate
}

pub fn galoss_check(view: &BotView) -> GalossCheck {
    let tricks_played = view.tricks_played();
    let tricks_remaining = view.tricks_remaining();
    let (our_points, their_points) = view.points_by_team();
    let we_are_buyers = view.we_are_buyers();

    let (buyer_pts, defender_pts) = if we_are_buyers {
        (our_points as i32, their_points as i32)
    } else {
        (their_points as i32, our_points as i32)
    };
    let buyer_tricks = view.tricks_won_by(view.contract.team);
    let buyer_deficit = defender_pts - buyer_pts;

    let est_remaining = estimate_remaining(tricks_played, our_points + their_points, view.mode);
    let buyer_can_recover = buyer_pts + est_remaining > defender_pts;

    let mut risk = GalossRisk::None;
    let mut emergency = false;

    if tricks_played < 2 {
        // Too early to read anything into the score.
    } else if buyer_deficit > 0 {
        if !buyer_can_recover {
            risk = GalossRisk::Critical;
            emergency = true;
        } else if buyer_deficit as f32 > est_remaining as f32 * 0.7 {
            risk = GalossRisk::High;
            emergency = true;
        } else if buyer_deficit as f32 > est_remaining as f32 * 0.4 {
            risk = GalossRisk::Medium;
        } else {
            risk = GalossRisk::Low;
        }
    } else if buyer_tricks == 0 && tricks_played >= 3 {
        // The buyer has not taken a single trick: a sweep is forming.
        risk = GalossRisk::Critical;
        emergency = true;
    } else if buyer_tricks == 0 && tricks_played >= 2 {
        risk = GalossRisk::High;
        emergency = true;
    }

    let serious = matches!(risk, GalossRisk::Medium | GalossRisk::High | GalossRisk::Critical);
    GalossCheck {
        risk_level: risk,
        we_risk_galoss: we_are_buyers && serious,
        they_risk_galoss: !we_are_buyers && serious,
        emergency_mode: emergency,
        buyer_deficit,
        tricks_remaining,
    }
}

/// Emergency override when the galoss check calls for one.
pub fn emergency_action(view: &BotView, check: &GalossCheck) -> Option<Advice> {
    if !check.emergency_mode || view.legal_indices.is_empty() {
        return None;
    }
    let mode = view.mode;
    let trump = view.trump_suit;
    let strength = |i: usize| {
        let is_trump = mode == GameMode::Hokum && trump == Some(view.hand[i].suit);
        rank_strength(view.hand[i].rank, mode, is_trump)
    };
    let points = |i: usize| card_points(view.hand[i], mode, trump);
    let highest = view
        .legal_indices
        .iter()
        .copied()
        .max_by_key(|&i| strength(i))?;

    if view.we_are_buyers() {
        // Buyer in danger: win tricks at all costs, or feed the partner.
        if view.leading() {
            return Some(Advice::new(
                highest,
                Tactic::GalossDesperation,
                0.85,
                format!("galoss alert: lead {}", view.hand[highest]),
            ));
        }
        if view.partner_winning() {
            let fat = view
                .legal_indices
                .iter()
                .copied()
                .max_by_key(|&i| points(i))?;
            if points(fat) >= 3 {
                return Some(Advice::new(
                    fat,
                    Tactic::GalossFeed,
                    0.8,
                    format!("galoss: feed {} to partner", view.hand[fat]),
                ));
            }
            return None;
        }
        return Some(Advice::new(
            highest,
            Tactic::GalossFight,
            0.8,
            format!("galoss: fight with {}", view.hand[highest]),
        ));
    }

    // Defender pressing a galoss onto the buyer: cash and deny.
    if view.leading() {
        let aces: Vec<usize> = view
            .legal_indices
            .iter()
            .copied()
            .filter(|&i| view.hand[i].rank == Rank::Ace)
            .collect();
        if let Some(&idx) = aces.first() {
            return Some(Advice::new(
                idx,
                Tactic::GalossPress,
                0.8,
                format!("press galoss: cash {}", view.hand[idx]),
            ));
        }
        let non_trump: Vec<usize> = view
            .legal_indices
            .iter()
            .copied()
            .filter(|&i| trump != Some(view.hand[i].suit))
            .collect();
        let pool = if non_trump.is_empty() {
            &view.legal_indices
        } else {
            &non_trump
        };
        let idx = pool.iter().copied().max_by_key(|&i| strength(i))?;
        return Some(Advice::new(
            idx,
            Tactic::GalossPress,
            0.7,
            format!("press galoss: lead {}", view.hand[idx]),
        ));
    }
    if !view.partner_winning() {
        return Some(Advice::new(
            highest,
            Tactic::GalossDeny,
            0.75,
            format!("deny the buyer with {}", view.hand[highest]),
        ));
    }
    None
}
