//! Personality profiles and the play filter.
//!
//! The filter runs after the brain decides but before the legality clamp.
//! It may swap the pick for another *legal* card when the profile's traits
//! say so (trump-lead bias, point greed, the occasional deceptive play).
//! It never produces an illegal move.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ai::view::BotView;
use crate::domain::cards::{card_points, rank_strength, GameMode};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalityProfile {
    pub name: String,
    /// Auction lean towards SUN / HOKUM contracts.
    pub sun_bias: f32,
    pub hokum_bias: f32,
    pub risk_tolerance: f32,
    pub point_greed: f32,
    pub trump_lead_bias: f32,
    pub partner_trust: f32,
    /// Chance per decision of a deliberately misleading card.
    pub false_signal_rate: f32,
    pub can_gamble: bool,
}

impl Default for PersonalityProfile {
    fn default() -> Self {
        Self::balanced()
    }
}

impl PersonalityProfile {
    pub fn balanced() -> Self {
        Self {
            name: "balanced".into(),
            sun_bias: 0.5,
            hokum_bias: 0.5,
            risk_tolerance: 0.5,
            point_greed: 0.5,
            trump_lead_bias: 0.5,
            partner_trust: 0.5,
            false_signal_rate: 0.0,
            can_gamble: false,
        }
    }

    pub fn aggressive() -> Self {
        Self {
            name: "aggressive".into(),
            sun_bias: 0.6,
            hokum_bias: 0.7,
            risk_tolerance: 0.85,
            point_greed: 0.8,
            trump_lead_bias: 0.75,
            partner_trust: 0.4,
            false_signal_rate: 0.05,
            can_gamble: true,
        }
    }

    pub fn cautious() -> Self {
        Self {
            name: "cautious".into(),
            sun_bias: 0.4,
            hokum_bias: 0.45,
            risk_tolerance: 0.2,
            point_greed: 0.25,
            trump_lead_bias: 0.3,
            partner_trust: 0.7,
            false_signal_rate: 0.0,
            can_gamble: false,
        }
    }

    pub fn tricky() -> Self {
        Self {
            name: "tricky".into(),
            sun_bias: 0.5,
            hokum_bias: 0.55,
            risk_tolerance: 0.6,
            point_greed: 0.55,
            trump_lead_bias: 0.5,
            partner_trust: 0.45,
            false_signal_rate: 0.25,
            can_gamble: true,
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "balanced" => Some(Self::balanced()),
            "aggressive" => Some(Self::aggressive()),
            "cautious" => Some(Self::cautious()),
            "tricky" => Some(Self::tricky()),
            _ => None,
        }
    }
}

/// Apply the personality to a chosen hand index. Returns a legal index.
pub fn apply_to_play<R: Rng>(
    profile: &PersonalityProfile,
    view: &BotView,
    chosen: usize,
    rng: &mut R,
) -> usize {
    let legal = &view.legal_indices;
    if legal.len() <= 1 {
        return chosen;
    }
    let points = |i: usize| card_points(view.hand[i], view.mode, view.trump_suit);
    let strength = |i: usize| {
        let is_trump = view.mode == GameMode::Hokum && view.trump_suit == Some(view.hand[i].suit);
        rank_strength(view.hand[i].rank, view.mode, is_trump)
    };

    // Deceptive play: underplay when leading, pick a non-obvious card when
    // following. Needs three or more options to hide in.
    if profile.false_signal_rate > 0.0
        && legal.len() >= 3
        && rng.random::<f32>() < profile.false_signal_rate
    {
        let pick = if view.leading() {
            let mut sorted: Vec<usize> = legal.clone();
            sorted.sort_by_key(|&i| points(i));
            sorted[sorted.len() / 2]
        } else {
            let alternatives: Vec<usize> =
                legal.iter().copied().filter(|&i| i != chosen).collect();
            alternatives[rng.random_range(0..alternatives.len())]
        };
        if pick != chosen {
            debug!(profile = %profile.name, "deceptive play");
            return pick;
        }
    }

    // Trump-lead bias when leading in HOKUM.
    if view.mode == GameMode::Hokum && view.leading() {
        if let Some(trump) = view.trump_suit {
            let trumps: Vec<usize> = legal
                .iter()
                .copied()
                .filter(|&i| view.hand[i].suit == trump)
                .collect();
            let side: Vec<usize> = legal
                .iter()
                .copied()
                .filter(|&i| view.hand[i].suit != trump)
                .collect();
            let chosen_is_trump = view.hand[chosen].suit == trump;
            if profile.trump_lead_bias > 0.6 && !chosen_is_trump && !trumps.is_empty() {
                if let Some(&idx) = trumps.iter().max_by_key(|&&i| strength(i)) {
                    debug!(profile = %profile.name, "trump lead bias");
                    return idx;
                }
            }
            if profile.trump_lead_bias < 0.4 && chosen_is_trump && !side.is_empty() {
                if let Some(&idx) = side.iter().min_by_key(|&&i| points(i)) {
                    debug!(profile = %profile.name, "trump avoidance");
                    return idx;
                }
            }
        }
    }

    // Point greed: chase fat tricks, protect points on thin ones.
    if !view.table_cards.is_empty() {
        let trick_value = view.trick_points();
        if profile.point_greed > 0.7 && trick_value >= 15 {
            if let Some(&idx) = legal.iter().max_by_key(|&&i| points(i)) {
                if idx != chosen {
                    debug!(profile = %profile.name, "point greed");
                    return idx;
                }
            }
        }
        if profile.point_greed < 0.3 && trick_value < 10 {
            if let Some(&idx) = legal.iter().min_by_key(|&&i| points(i)) {
                if idx != chosen {
                    return idx;
                }
            }
        }
    }

    chosen
}
