//! Card memory: per-seat voids, the played-card set, and Bayesian suit
//! probabilities.
//!
//! Memory is a pure function of observable history — it can always be
//! rebuilt from the round record, which is how bot seats get their own copy
//! without ever seeing a private hand. Cards are tracked in a 32-bit set
//! (suit * 8 + natural rank index) shared with the endgame solver.

use serde::{Deserialize, Serialize};

use crate::domain::cards::{rank_strength, Card, GameMode, Rank, Suit};
use crate::domain::state::{RoundState, Seat, SEATS};

/// Bit position of a card in the 32-card set.
pub fn card_bit(card: Card) -> u32 {
    (card.suit.index() * 8 + card.rank.natural_index()) as u32
}

pub fn card_from_bit(bit: u32) -> Option<Card> {
    let suit = Suit::from_index((bit / 8) as usize)?;
    let rank = Rank::ALL.get((bit % 8) as usize).copied()?;
    Some(Card::new(suit, rank))
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct CardMemory {
    /// Set of cards seen on the table this round.
    played: u32,
    /// Per-seat suit-void bitmask, set on an observed non-follow.
    voids: [u8; 4],
    /// Cards each seat has played this round.
    played_count: [u8; 4],
}

impl CardMemory {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Rebuild memory from the observable round record.
    pub fn from_round(round: &RoundState) -> Self {
        let mut memory = Self::default();
        for trick in &round.round_history {
            let led = trick.plays.first().map(|p| p.card.suit);
            for play in &trick.plays {
                memory.observe_play(play.seat, play.card, led);
            }
        }
        let led = round.table_cards.first().map(|p| p.card.suit);
        for play in &round.table_cards {
            memory.observe_play(play.seat, play.card, led);
        }
        memory
    }

    /// Record one play. `led` is the suit of the trick's first card.
    pub fn observe_play(&mut self, seat: Seat, card: Card, led: Option<Suit>) {
        let idx = seat as usize % SEATS;
        self.played |= 1 << card_bit(card);
        self.played_count[idx] = self.played_count[idx].saturating_add(1);
        if let Some(led) = led {
            if card.suit != led {
                self.voids[idx] |= 1 << led.index();
            }
        }
    }

    pub fn has_been_played(&self, card: Card) -> bool {
        self.played & (1 << card_bit(card)) != 0
    }

    pub fn is_void(&self, seat: Seat, suit: Suit) -> bool {
        self.voids[seat as usize % SEATS] & (1 << suit.index()) != 0
    }

    pub fn voids_of(&self, seat: Seat) -> Vec<Suit> {
        Suit::ALL
            .into_iter()
            .filter(|&s| self.is_void(seat, s))
            .collect()
    }

    /// Seats observed void in `suit`.
    pub fn seats_void_in(&self, suit: Suit) -> Vec<Seat> {
        (0..SEATS as Seat)
            .filter(|&s| self.is_void(s, suit))
            .collect()
    }

    /// Remaining hand size of a seat, assuming the 8-card deal.
    pub fn hand_size(&self, seat: Seat) -> u8 {
        8u8.saturating_sub(self.played_count[seat as usize % SEATS])
    }

    /// Cards neither played nor in the viewer's hand.
    pub fn unseen_cards(&self, my_hand: &[Card]) -> Vec<Card> {
        let mut mine = 0u32;
        for &card in my_hand {
            mine |= 1 << card_bit(card);
        }
        let visible = self.played | mine;
        (0..32)
            .filter(|&bit| visible & (1 << bit) == 0)
            .filter_map(card_from_bit)
            .collect()
    }

    /// Is this card the top remaining card of its suit from the viewer's
    /// perspective? (Unseen cards only; a master can still be ruffed.)
    pub fn is_master(&self, card: Card, mode: GameMode, trump: Option<Suit>, my_hand: &[Card]) -> bool {
        let is_trump = mode == GameMode::Hokum && trump == Some(card.suit);
        let my_strength = rank_strength(card.rank, mode, is_trump);
        self.unseen_cards(my_hand)
            .into_iter()
            .filter(|c| c.suit == card.suit)
            .all(|c| rank_strength(c.rank, mode, is_trump) <= my_strength)
    }

    /// A seat playing a suit it was previously marked void in contradicts
    /// the record: one of the two plays broke the follow rules.
    pub fn check_contradiction(&self, seat: Seat, card: Card) -> Option<Suit> {
        if self.is_void(seat, card.suit) {
            Some(card.suit)
        } else {
            None
        }
    }

    /// Per-seat probability of holding at least one card of each suit.
    ///
    /// Model: unseen cards are dealt uniformly across the hidden hands, with
    /// hand sizes as the prior weight (hypergeometric). An observed
    /// non-follow collapses the seat's probability in the led suit to zero;
    /// the uniform deal over the remaining pool is the renormalisation.
    pub fn suit_probabilities(&self, me: Seat, my_hand: &[Card]) -> [[f64; 4]; 4] {
        let unseen = self.unseen_cards(my_hand);
        let pool = unseen.len();
        let mut per_suit = [0usize; 4];
        for card in &unseen {
            per_suit[card.suit.index()] += 1;
        }

        let mut probs = [[0.0f64; 4]; 4];
        for seat in 0..SEATS as Seat {
            for suit in Suit::ALL {
                let p = if seat == me {
                    if my_hand.iter().any(|c| c.suit == suit) {
                        1.0
                    } else {
                        0.0
                    }
                } else if self.is_void(seat, suit) {
                    0.0
                } else {
                    at_least_one(pool, per_suit[suit.index()], self.hand_size(seat) as usize)
                };
                probs[seat as usize][suit.index()] = p;
            }
        }
        probs
    }
}

/// P(at least one of `n` marked cards lands in a hand of `h` drawn from a
/// pool of `pool`), computed as 1 - C(pool-n, h)/C(pool, h).
fn at_least_one(pool: usize, n: usize, h: usize) -> f64 {
    if n == 0 || h == 0 || pool == 0 {
        return 0.0;
    }
    if n + h > pool {
        return 1.0;
    }
    let mut none = 1.0f64;
    for i in 0..h {
        none *= (pool - n - i) as f64 / (pool - i) as f64;
    }
    1.0 - none
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(suit: Suit, rank: Rank) -> Card {
        Card::new(suit, rank)
    }

    #[test]
    fn card_bits_round_trip() {
        for suit in Suit::ALL {
            for rank in Rank::ALL {
                let card = c(suit, rank);
                assert_eq!(card_from_bit(card_bit(card)), Some(card));
            }
        }
    }

    #[test]
    fn non_follow_marks_void() {
        let mut memory = CardMemory::default();
        memory.observe_play(0, c(Suit::Hearts, Rank::Ace), None);
        memory.observe_play(1, c(Suit::Spades, Rank::Seven), Some(Suit::Hearts));
        assert!(memory.is_void(1, Suit::Hearts));
        assert!(!memory.is_void(1, Suit::Spades));
        assert_eq!(memory.voids_of(1), vec![Suit::Hearts]);
    }

    #[test]
    fn void_collapses_probability_to_zero() {
        let mut memory = CardMemory::default();
        memory.observe_play(0, c(Suit::Hearts, Rank::Ace), None);
        memory.observe_play(1, c(Suit::Clubs, Rank::Seven), Some(Suit::Hearts));
        let probs = memory.suit_probabilities(2, &[c(Suit::Hearts, Rank::King)]);
        assert_eq!(probs[1][Suit::Hearts.index()], 0.0);
        assert!(probs[3][Suit::Hearts.index()] > 0.0);
        // My own row reflects my actual holding.
        assert_eq!(probs[2][Suit::Hearts.index()], 1.0);
        assert_eq!(probs[2][Suit::Diamonds.index()], 0.0);
    }

    #[test]
    fn probabilities_shrink_as_suit_drains() {
        let mut memory = CardMemory::default();
        let before = memory.suit_probabilities(0, &[])[1][Suit::Hearts.index()];
        for rank in [Rank::Seven, Rank::Eight, Rank::Nine, Rank::Ten, Rank::Jack, Rank::Queen] {
            memory.observe_play(2, c(Suit::Hearts, rank), Some(Suit::Hearts));
        }
        let after = memory.suit_probabilities(0, &[])[1][Suit::Hearts.index()];
        assert!(after < before);
    }

    #[test]
    fn master_tracking() {
        let mut memory = CardMemory::default();
        let king = c(Suit::Hearts, Rank::King);
        // In SUN, the king is not master while A and 10 are unseen.
        assert!(!memory.is_master(king, GameMode::Sun, None, &[king]));
        memory.observe_play(1, c(Suit::Hearts, Rank::Ace), None);
        memory.observe_play(2, c(Suit::Hearts, Rank::Ten), Some(Suit::Hearts));
        assert!(memory.is_master(king, GameMode::Sun, None, &[king]));
    }

    #[test]
    fn master_accounts_for_own_hand() {
        let memory = CardMemory::default();
        let hand = vec![c(Suit::Hearts, Rank::Ace), c(Suit::Hearts, Rank::Ten)];
        // Holding A and 10 ourselves, the ace is master immediately.
        assert!(memory.is_master(hand[0], GameMode::Sun, None, &hand));
        assert!(!memory.is_master(hand[1], GameMode::Sun, None, &hand));
    }

    #[test]
    fn contradiction_detection() {
        let mut memory = CardMemory::default();
        memory.observe_play(0, c(Suit::Hearts, Rank::Ace), None);
        memory.observe_play(1, c(Suit::Clubs, Rank::Seven), Some(Suit::Hearts));
        assert_eq!(
            memory.check_contradiction(1, c(Suit::Hearts, Rank::King)),
            Some(Suit::Hearts)
        );
        assert!(memory
            .check_contradiction(3, c(Suit::Hearts, Rank::King))
            .is_none());
    }
}
