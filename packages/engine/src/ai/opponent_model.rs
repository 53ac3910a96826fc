//! Opponent modelling: threat profiles for both enemies, mirroring the
//! partner read but scored for danger instead of cooperation.

use crate::domain::bidding::{BidAction, BidRecord};
use crate::domain::cards::{GameMode, Rank, Suit};
use crate::domain::state::{partner_of, CompletedTrick, Seat};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayStyle {
    Aggressive,
    Passive,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpponentSignal {
    /// Discarded high cards while losing: desperation.
    Desperate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpponentProfile {
    pub seat: Seat,
    pub void_suits: Vec<Suit>,
    pub likely_short_suits: Vec<Suit>,
    pub estimated_trumps: u8,
    pub has_high_trumps: bool,
    pub strength_by_suit: [f32; 4],
    pub play_style: PlayStyle,
    pub danger_level: f32,
    pub signals: Vec<OpponentSignal>,
    /// Singleton leads and forced plays suggesting a bare honour.
    pub singleton_suspects: Vec<Suit>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpponentModel {
    pub opponents: Vec<OpponentProfile>,
    pub safe_lead_suits: Vec<Suit>,
    pub avoid_lead_suits: Vec<Suit>,
    pub combined_danger: f32,
}

fn is_high(rank: Rank) -> bool {
    matches!(rank, Rank::Ace | Rank::Ten | Rank::King)
}

fn is_low(rank: Rank) -> bool {
    matches!(rank, Rank::Seven | Rank::Eight)
}

pub fn model_opponents(
    me: Seat,
    bid_history: &[BidRecord],
    trick_history: &[CompletedTrick],
    mode: GameMode,
    trump: Option<Suit>,
) -> OpponentModel {
    let partner = partner_of(me);
    let opponents: Vec<Seat> = (0..4).filter(|&s| s != me && s != partner).collect();

    let mut profiles: Vec<OpponentProfile> = Vec::with_capacity(2);
    for &opp in &opponents {
        let mut strength = [0.0f32; 4];
        let mut voids: Vec<Suit> = Vec::new();
        let mut short: Vec<Suit> = Vec::new();
        let mut singleton_suspects: Vec<Suit> = Vec::new();
        let mut trump_count = 0u8;
        let mut high_trump = false;
        let mut aggressive_plays = 0u32;
        let mut total_plays = 0u32;
        let mut signals: Vec<OpponentSignal> = Vec::new();

        for record in bid_history.iter().filter(|r| r.seat == opp) {
            match record.action {
                BidAction::Hokum => {
                    if let Some(suit) = record.suit {
                        strength[suit.index()] += 3.0;
                    }
                }
                BidAction::Sun => {
                    for s in Suit::ALL {
                        strength[s.index()] += 1.0;
                    }
                }
                BidAction::Pass => {
                    for s in Suit::ALL {
                        strength[s.index()] -= 0.3;
                    }
                }
                _ => {}
            }
        }

        for trick in trick_history {
            let Some(led) = trick.led_suit() else { continue };
            let Some(play) = trick.plays.iter().find(|p| p.seat == opp) else {
                continue;
            };
            total_plays += 1;
            let suit = play.card.suit;
            let rank = play.card.rank;
            let is_leader = trick.leader == opp;

            if suit != led {
                if !voids.contains(&led) {
                    voids.push(led);
                }
                strength[led.index()] = -5.0;
                let is_ruff = mode == GameMode::Hokum && trump == Some(suit);
                if is_ruff {
                    trump_count += 1;
                    if matches!(rank, Rank::Jack | Rank::Nine) {
                        high_trump = true;
                    }
                    aggressive_plays += 1;
                } else {
                    strength[suit.index()] -= 1.0;
                    if is_low(rank) && !short.contains(&suit) {
                        short.push(suit);
                    }
                    if is_high(rank) && !signals.contains(&OpponentSignal::Desperate) {
                        signals.push(OpponentSignal::Desperate);
                    }
                }
                continue;
            }

            if is_leader {
                if is_high(rank) {
                    strength[suit.index()] += 2.0;
                    aggressive_plays += 1;
                } else if is_low(rank) {
                    strength[suit.index()] -= 0.5;
                    // A bare low lead early often covers a short holding.
                    if trick_history.len() <= 2 && !singleton_suspects.contains(&suit) {
                        singleton_suspects.push(suit);
                    }
                }
            } else if is_high(rank) {
                strength[suit.index()] += 1.0;
            }

            if mode == GameMode::Hokum && trump == Some(suit) && led == suit {
                trump_count += 1;
                if matches!(rank, Rank::Jack | Rank::Nine) {
                    high_trump = true;
                }
            }
        }

        let strong_count = strength.iter().filter(|&&v| v > 1.0).count();
        let style_ratio = aggressive_plays as f32 / total_plays.max(1) as f32;
        let play_style = if style_ratio > 0.6 {
            PlayStyle::Aggressive
        } else if style_ratio < 0.4 && total_plays > 0 {
            PlayStyle::Passive
        } else {
            PlayStyle::Unknown
        };
        let trump_for_danger = if mode == GameMode::Hokum { trump_count } else { 0 };
        let danger = (trump_for_danger as f32 * 0.15 + strong_count as f32 * 0.1
            + style_ratio * 0.2)
            .min(1.0);

        profiles.push(OpponentProfile {
            seat: opp,
            void_suits: voids,
            likely_short_suits: short,
            estimated_trumps: trump_for_danger,
            has_high_trumps: high_trump,
            strength_by_suit: strength,
            play_style,
            danger_level: danger,
            signals,
            singleton_suspects,
        });
    }

    let mut avoid: Vec<Suit> = Vec::new();
    for profile in &profiles {
        for &suit in &profile.void_suits {
            if !avoid.contains(&suit) {
                avoid.push(suit);
            }
        }
    }
    let safe: Vec<Suit> = Suit::ALL
        .into_iter()
        .filter(|&s| {
            Some(s) != trump
                && !avoid.contains(&s)
                && profiles.iter().all(|p| p.strength_by_suit[s.index()] <= 1.0)
        })
        .collect();

    let combined = profiles.iter().map(|p| p.danger_level).sum::<f32>()
        / profiles.len().max(1) as f32;

    OpponentModel {
        opponents: profiles,
        safe_lead_suits: safe,
        avoid_lead_suits: avoid,
        combined_danger: combined,
    }
}
