//! Partner inference: deduce what the partner likely holds from their bids,
//! leads, discards and trump plays. Pure heuristics over observable history.

use crate::ai::calibration::DISCARD_SHORTEST_SUIT_RELIABILITY;
use crate::domain::bidding::{BidAction, BidRecord};
use crate::domain::cards::{card_points, GameMode, Rank, Suit};
use crate::domain::state::{partner_of, CompletedTrick, Seat};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartnerSignal {
    /// Partner dumped an A/10/K into our winning trick.
    Feeding,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartnerRead {
    pub likely_strong_suits: Vec<Suit>,
    pub likely_void_suits: Vec<Suit>,
    pub likely_short_suits: Vec<Suit>,
    pub feeding: bool,
    pub estimated_trumps: u8,
    pub has_high_trumps: bool,
    pub confidence: f32,
    pub signals: Vec<PartnerSignal>,
}

fn is_high(rank: Rank) -> bool {
    matches!(rank, Rank::Ace | Rank::Ten | Rank::King)
}

fn is_low(rank: Rank) -> bool {
    matches!(rank, Rank::Seven | Rank::Eight)
}

pub fn read_partner(
    partner: Seat,
    bid_history: &[BidRecord],
    trick_history: &[CompletedTrick],
    mode: GameMode,
    trump: Option<Suit>,
) -> PartnerRead {
    let me = partner_of(partner);
    let mut strength = [0.0f32; 4];
    let mut voids: Vec<Suit> = Vec::new();
    let mut short: Vec<Suit> = Vec::new();
    let mut trumps_seen = 0u8;
    let mut trump_estimate = 0u8;
    let mut high_trumps = false;
    let mut feeding = false;
    let mut evidence = 0u32;

    // ── Bid inference ────────────────────────────────────────────────
    for record in bid_history.iter().filter(|r| r.seat == partner) {
        match record.action {
            BidAction::Sun => {
                for s in Suit::ALL {
                    strength[s.index()] += 1.0;
                }
                evidence += 3;
            }
            BidAction::Hokum => {
                if let Some(suit) = record.suit {
                    strength[suit.index()] += 3.0;
                    high_trumps = true;
                    trump_estimate = trump_estimate.max(3);
                }
                evidence += 3;
            }
            BidAction::Pass => {
                for s in Suit::ALL {
                    strength[s.index()] -= 0.3;
                }
                evidence += 1;
            }
            _ => {}
        }
    }

    // ── Trick inference ──────────────────────────────────────────────
    for trick in trick_history {
        let Some(led) = trick.led_suit() else { continue };
        let Some(play) = trick.plays.iter().find(|p| p.seat == partner) else {
            continue;
        };
        evidence += 1;
        let suit = play.card.suit;
        let rank = play.card.rank;

        if suit != led {
            voids.push(led);
            strength[led.index()] = -5.0;
            let is_ruff = mode == GameMode::Hokum && trump == Some(suit);
            if is_ruff {
                trumps_seen += 1;
                trump_estimate = trump_estimate.max(trumps_seen + 1);
                if matches!(rank, Rank::Jack | Rank::Nine) {
                    high_trumps = true;
                }
                strength[suit.index()] += 1.5;
            } else {
                // A discard: likely short in the thrown suit, and a fat
                // discard into our winning trick is a feeding signal.
                if mode == GameMode::Hokum && trump.is_some() && trumps_seen > 0 {
                    trump_estimate = trumps_seen;
                }
                strength[suit.index()] -= 1.0;
                if !short.contains(&suit) {
                    short.push(suit);
                }
                if trick.winner == me
                    && is_high(rank)
                    && card_points(play.card, mode, trump) >= 4
                {
                    feeding = true;
                }
            }
            continue;
        }

        if mode == GameMode::Hokum && trump == Some(suit) {
            trumps_seen += 1;
            trump_estimate = trump_estimate.max(trumps_seen);
            if matches!(rank, Rank::Jack | Rank::Nine) {
                high_trumps = true;
            }
        }
        let led_by_partner = trick.leader == partner;
        if is_high(rank) {
            strength[suit.index()] += if led_by_partner { 2.0 } else { 1.0 };
        } else if is_low(rank) {
            strength[suit.index()] -= if led_by_partner { 0.5 } else { 0.3 };
        }
    }

    let mut strong: Vec<Suit> = Suit::ALL
        .into_iter()
        .filter(|&s| strength[s.index()] >= 1.0)
        .collect();
    strong.sort_by(|a, b| {
        strength[b.index()]
            .partial_cmp(&strength[a.index()])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut void_list: Vec<Suit> = Suit::ALL
        .into_iter()
        .filter(|&s| voids.contains(&s) || strength[s.index()] <= -3.0)
        .collect();
    void_list.dedup();

    let mut confidence = (evidence as f32 / 12.0).min(1.0);
    if !short.is_empty() {
        confidence = confidence.max(DISCARD_SHORTEST_SUIT_RELIABILITY);
    }

    PartnerRead {
        likely_strong_suits: strong,
        likely_void_suits: void_list,
        likely_short_suits: short,
        feeding,
        estimated_trumps: if mode == GameMode::Hokum {
            trump_estimate
        } else {
            0
        },
        has_high_trumps: high_trumps,
        confidence,
        signals: if feeding {
            vec![PartnerSignal::Feeding]
        } else {
            Vec::new()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cards::Card;
    use crate::domain::state::TablePlay;

    fn play(seat: Seat, suit: Suit, rank: Rank) -> TablePlay {
        TablePlay {
            seat,
            card: Card::new(suit, rank),
            is_illegal: false,
        }
    }

    fn trick(plays: Vec<TablePlay>, winner: Seat) -> CompletedTrick {
        let leader = plays[0].seat;
        CompletedTrick {
            plays,
            leader,
            winner,
            points: 0,
        }
    }

    #[test]
    fn hokum_bid_reads_as_trump_strength() {
        let bids = vec![BidRecord {
            seat: 2,
            action: BidAction::Hokum,
            suit: Some(Suit::Spades),
        }];
        let read = read_partner(2, &bids, &[], GameMode::Hokum, Some(Suit::Spades));
        assert!(read.has_high_trumps);
        assert!(read.estimated_trumps >= 3);
        assert_eq!(read.likely_strong_suits.first(), Some(&Suit::Spades));
    }

    #[test]
    fn discard_marks_void_and_short() {
        // Partner (seat 2) throws a low club on a heart lead.
        let history = vec![trick(
            vec![
                play(0, Suit::Hearts, Rank::Ace),
                play(1, Suit::Hearts, Rank::Seven),
                play(2, Suit::Clubs, Rank::Seven),
                play(3, Suit::Hearts, Rank::Eight),
            ],
            0,
        )];
        let read = read_partner(2, &[], &history, GameMode::Sun, None);
        assert!(read.likely_void_suits.contains(&Suit::Hearts));
        assert!(read.likely_short_suits.contains(&Suit::Clubs));
        assert!(!read.feeding);
    }

    #[test]
    fn fat_discard_into_our_trick_is_feeding() {
        // We (seat 0) win; partner seat 2 throws the ten of clubs off-suit.
        let history = vec![trick(
            vec![
                play(0, Suit::Hearts, Rank::Ace),
                play(1, Suit::Hearts, Rank::Seven),
                play(2, Suit::Clubs, Rank::Ten),
                play(3, Suit::Hearts, Rank::Eight),
            ],
            0,
        )];
        let read = read_partner(2, &[], &history, GameMode::Sun, None);
        assert!(read.feeding);
        assert_eq!(read.signals, vec![PartnerSignal::Feeding]);
    }

    #[test]
    fn high_leads_read_as_strength() {
        let history = vec![trick(
            vec![
                play(2, Suit::Diamonds, Rank::Ace),
                play(3, Suit::Diamonds, Rank::Seven),
                play(0, Suit::Diamonds, Rank::Eight),
                play(1, Suit::Diamonds, Rank::Nine),
            ],
            2,
        )];
        let read = read_partner(2, &[], &history, GameMode::Sun, None);
        assert!(read.likely_strong_suits.contains(&Suit::Diamonds));
    }
}
