//! Bidding inference: what the auction reveals about each hand.
//!
//! Every action leaks information — a HOKUM bid promises top trumps, SUN
//! promises aces, a Round-1 pass denies interest in the floor suit. The
//! play phase consumes these predictions as avoid/target suit lists.

use crate::domain::bidding::{BidAction, BidRecord};
use crate::domain::cards::{Card, Rank, Suit};
use crate::domain::state::{partner_of, Seat, SEATS};

/// Per-opponent prediction extracted from the auction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BidProfile {
    pub likely_trumps: Vec<Rank>,
    pub likely_aces: u8,
    pub weak_suits: Vec<Suit>,
    pub strong_suits: Vec<Suit>,
    pub bid_action: Option<BidAction>,
    pub confidence: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BidInference {
    /// Profiles for the three other seats; `None` for the viewer's own.
    pub players: [Option<BidProfile>; 4],
    pub declarer: Option<Seat>,
    pub declarer_trump: Option<Suit>,
    /// Suits where the declarer is strong: do not lead these.
    pub avoid_suits: Vec<Suit>,
    /// Suits where the declarer is weak: attack these.
    pub target_suits: Vec<Suit>,
}

pub fn infer_from_bids(
    me: Seat,
    bid_history: &[BidRecord],
    floor_card: Option<Card>,
    bidding_round: u8,
) -> BidInference {
    let mut inference = BidInference::default();
    for seat in 0..SEATS as Seat {
        if seat != me {
            inference.players[seat as usize] = Some(BidProfile::default());
        }
    }

    let floor_suit = floor_card.map(|c| c.suit);
    let floor_rank = floor_card.map(|c| c.rank);

    for record in bid_history {
        if record.seat == me {
            continue;
        }
        let Some(profile) = inference.players[record.seat as usize].as_mut() else {
            continue;
        };
        profile.bid_action = Some(record.action);

        match record.action {
            BidAction::Hokum => {
                let Some(suit) = record.suit else { continue };
                inference.declarer = Some(record.seat);
                inference.declarer_trump = Some(suit);
                profile.strong_suits.push(suit);
                profile.confidence = 0.7;
                // A hokum bidder almost certainly holds J or 9 of trump,
                // and collects the floor card in round 1.
                profile.likely_trumps = vec![Rank::Jack, Rank::Nine];
                if floor_suit == Some(suit) {
                    if let Some(rank) = floor_rank {
                        profile.likely_trumps.push(rank);
                    }
                }
                for s in Suit::ALL {
                    if s != suit {
                        profile.weak_suits.push(s);
                    }
                }
            }
            BidAction::Sun => {
                inference.declarer = Some(record.seat);
                inference.declarer_trump = None;
                profile.likely_aces = 2;
                profile.confidence = 0.6;
                profile.strong_suits = Suit::ALL.to_vec();
            }
            BidAction::Ashkal => {
                inference.declarer = Some(partner_of(record.seat));
                profile.likely_aces = 3;
                profile.confidence = 0.8;
                profile.strong_suits = Suit::ALL.to_vec();
            }
            BidAction::Pass => {
                profile.confidence = profile.confidence.max(0.3);
                if let Some(floor) = floor_suit {
                    if !profile.weak_suits.contains(&floor) {
                        profile.weak_suits.push(floor);
                    }
                }
                if bidding_round >= 2 {
                    profile.likely_aces = 0;
                }
            }
            _ => {}
        }
    }

    if let Some(declarer) = inference.declarer {
        if declarer != partner_of(me) && declarer != me {
            if let Some(profile) = inference.players[declarer as usize].as_ref() {
                inference.avoid_suits = profile.strong_suits.clone();
                inference.target_suits = profile.weak_suits.clone();
            }
        }
    }

    inference
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(seat: Seat, action: BidAction, suit: Option<Suit>) -> BidRecord {
        BidRecord { seat, action, suit }
    }

    #[test]
    fn hokum_bid_promises_trumps_and_floor_pickup() {
        let floor = Card::new(Suit::Spades, Rank::King);
        let history = vec![record(1, BidAction::Hokum, Some(Suit::Spades))];
        let inference = infer_from_bids(0, &history, Some(floor), 1);

        let profile = inference.players[1].as_ref().unwrap();
        assert!(profile.likely_trumps.contains(&Rank::Jack));
        assert!(profile.likely_trumps.contains(&Rank::Nine));
        assert!(profile.likely_trumps.contains(&Rank::King));
        assert_eq!(inference.declarer, Some(1));
        assert_eq!(inference.declarer_trump, Some(Suit::Spades));
        // The enemy declarer's trump suit is on the avoid list.
        assert!(inference.avoid_suits.contains(&Suit::Spades));
        assert_eq!(inference.target_suits.len(), 3);
    }

    #[test]
    fn round_two_pass_denies_aces() {
        let floor = Card::new(Suit::Hearts, Rank::Seven);
        let history = vec![record(3, BidAction::Pass, None)];
        let inference = infer_from_bids(0, &history, Some(floor), 2);
        let profile = inference.players[3].as_ref().unwrap();
        assert_eq!(profile.likely_aces, 0);
        assert!(profile.weak_suits.contains(&Suit::Hearts));
    }

    #[test]
    fn partner_declarer_yields_no_attack_plan() {
        let history = vec![record(2, BidAction::Sun, None)];
        let inference = infer_from_bids(0, &history, None, 1);
        // Seat 2 is seat 0's partner: no avoid/target lists against them.
        assert!(inference.avoid_suits.is_empty());
        assert!(inference.target_suits.is_empty());
    }
}
