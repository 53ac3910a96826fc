//! Deterministic dealing for the 32-card deck.
//!
//! Baloot deals in two stages: five cards per seat plus one face-up floor
//! card before bidding, then the remainder once the contract is known (the
//! buyer takes the floor card plus two, everyone else three).

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::domain::cards::{Card, Rank, Suit};
use crate::domain::state::{Seat, SEATS};
use crate::errors::domain::DomainError;

/// All 32 cards in suit-then-rank order.
pub fn full_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(32);
    for suit in Suit::ALL {
        for rank in Rank::ALL {
            deck.push(Card::new(suit, rank));
        }
    }
    deck
}

/// The opening deal: five cards per seat and a face-up floor card.
#[derive(Debug, Clone)]
pub struct InitialDeal {
    pub hands: [Vec<Card>; 4],
    pub floor_card: Card,
    /// Eleven cards still face-down after the floor card is shown.
    pub undealt: Vec<Card>,
}

/// Deal the opening hands deterministically from a seed.
pub fn deal_initial(seed: u64) -> InitialDeal {
    let mut deck = full_deck();
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    deck.shuffle(&mut rng);

    let mut hands: [Vec<Card>; 4] = Default::default();
    for (seat, hand) in hands.iter_mut().enumerate() {
        let start = seat * 5;
        let mut cards = deck[start..start + 5].to_vec();
        cards.sort();
        *hand = cards;
    }

    let floor_card = deck[20];
    let undealt = deck[21..].to_vec();

    InitialDeal {
        hands,
        floor_card,
        undealt,
    }
}

/// Complete the deal after bidding: the buyer takes the floor card plus two
/// from the talon, the other seats three each. Every hand ends at eight.
pub fn complete_deal(
    hands: &mut [Vec<Card>; 4],
    floor_card: Card,
    undealt: &mut Vec<Card>,
    buyer: Seat,
) -> Result<(), DomainError> {
    if undealt.len() != 11 {
        return Err(DomainError::fatal(format!(
            "talon has {} cards, expected 11",
            undealt.len()
        )));
    }

    hands[buyer as usize].push(floor_card);
    for offset in 0..SEATS {
        let seat = (buyer as usize + offset) % SEATS;
        let take = if seat == buyer as usize { 2 } else { 3 };
        for _ in 0..take {
            match undealt.pop() {
                Some(card) => hands[seat].push(card),
                None => return Err(DomainError::fatal("talon exhausted mid-deal")),
            }
        }
    }

    for (seat, hand) in hands.iter_mut().enumerate() {
        if hand.len() != 8 {
            return Err(DomainError::fatal(format!(
                "seat {seat} holds {} cards after deal completion",
                hand.len()
            )));
        }
        hand.sort();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn deal_is_deterministic() {
        let a = deal_initial(12345);
        let b = deal_initial(12345);
        assert_eq!(a.hands, b.hands);
        assert_eq!(a.floor_card, b.floor_card);
        assert_eq!(a.undealt, b.undealt);
    }

    #[test]
    fn different_seeds_differ() {
        let a = deal_initial(12345);
        let b = deal_initial(54321);
        assert_ne!(a.hands, b.hands);
    }

    #[test]
    fn initial_deal_conserves_deck() {
        let deal = deal_initial(7);
        let mut seen: HashSet<Card> = HashSet::new();
        for hand in &deal.hands {
            assert_eq!(hand.len(), 5);
            seen.extend(hand.iter().copied());
        }
        seen.insert(deal.floor_card);
        seen.extend(deal.undealt.iter().copied());
        assert_eq!(seen.len(), 32);
        assert_eq!(deal.undealt.len(), 11);
    }

    #[test]
    fn complete_deal_reaches_eight_everywhere() {
        let deal = deal_initial(99);
        let mut hands = deal.hands.clone();
        let mut undealt = deal.undealt.clone();
        complete_deal(&mut hands, deal.floor_card, &mut undealt, 2).unwrap();

        let mut seen: HashSet<Card> = HashSet::new();
        for hand in &hands {
            assert_eq!(hand.len(), 8);
            seen.extend(hand.iter().copied());
        }
        assert_eq!(seen.len(), 32);
        assert!(undealt.is_empty());
        assert!(hands[2].contains(&deal.floor_card));
    }
}
