//! Rule kernel: legal-move predicate, trick winner resolution, abnat sums.
//!
//! This module is the single authority on play legality. The trick manager
//! enforces it in strict mode; the Qayd adjudicator and the endgame solver
//! re-run it over reconstructed states.

use crate::domain::cards::{card_points, rank_strength, Card, GameMode, Suit};
use crate::domain::state::{team_of, Seat, TablePlay};

/// Indices into `table` and the winning play so far.
pub fn current_winner<'a>(
    table: &'a [TablePlay],
    mode: GameMode,
    trump: Option<Suit>,
) -> Option<(usize, &'a TablePlay)> {
    let first = table.first()?;
    let led = first.card.suit;
    let mut best = (0usize, first);
    for (i, play) in table.iter().enumerate().skip(1) {
        if beats(play.card, best.1.card, led, mode, trump) {
            best = (i, play);
        }
    }
    Some(best)
}

/// Does `candidate` beat `incumbent` given the led suit?
fn beats(candidate: Card, incumbent: Card, led: Suit, mode: GameMode, trump: Option<Suit>) -> bool {
    let cand_trump = mode == GameMode::Hokum && trump == Some(candidate.suit);
    let inc_trump = mode == GameMode::Hokum && trump == Some(incumbent.suit);
    match (cand_trump, inc_trump) {
        (true, false) => true,
        (false, true) => false,
        (true, true) => {
            rank_strength(candidate.rank, mode, true) > rank_strength(incumbent.rank, mode, true)
        }
        (false, false) => {
            if candidate.suit != led {
                false
            } else if incumbent.suit != led {
                true
            } else {
                rank_strength(candidate.rank, mode, false)
                    > rank_strength(incumbent.rank, mode, false)
            }
        }
    }
}

/// The seat that wins a completed trick.
pub fn trick_winner(plays: &[TablePlay], mode: GameMode, trump: Option<Suit>) -> Option<Seat> {
    current_winner(plays, mode, trump).map(|(_, p)| p.seat)
}

/// Abnat value of a set of plays.
pub fn trick_points(plays: &[TablePlay], mode: GameMode, trump: Option<Suit>) -> u16 {
    plays
        .iter()
        .map(|p| card_points(p.card, mode, trump))
        .sum()
}

/// Legal hand indices for `seat` facing `table`.
///
/// Rules, in order:
/// 1. Leader: everything is legal.
/// 2. Holding the led suit: those cards only.
/// 3. Void, opponent winning with trump, and we can over-trump: the
///    over-trumps only.
/// 4. Void, opponent winning without trump, and we hold trump (HOKUM):
///    trumps only.
/// 5. Otherwise (partner winning, or nothing to play over): everything.
pub fn legal_moves(
    hand: &[Card],
    table: &[TablePlay],
    mode: GameMode,
    trump: Option<Suit>,
    seat: Seat,
) -> Vec<usize> {
    let all: Vec<usize> = (0..hand.len()).collect();
    let Some(first) = table.first() else {
        return all;
    };

    let led = first.card.suit;
    let follow: Vec<usize> = all
        .iter()
        .copied()
        .filter(|&i| hand[i].suit == led)
        .collect();
    if !follow.is_empty() {
        return follow;
    }

    // Void in the led suit. The over-trump duty only applies against an
    // opposing winner in HOKUM.
    let Some((_, winner)) = current_winner(table, mode, trump) else {
        return all;
    };
    if team_of(winner.seat) == team_of(seat) || mode != GameMode::Hokum {
        return all;
    }
    let Some(trump_suit) = trump else {
        return all;
    };

    let trumps: Vec<usize> = all
        .iter()
        .copied()
        .filter(|&i| hand[i].suit == trump_suit)
        .collect();
    if trumps.is_empty() {
        return all;
    }

    if winner.card.suit == trump_suit {
        let winner_strength = rank_strength(winner.card.rank, mode, true);
        let over: Vec<usize> = trumps
            .iter()
            .copied()
            .filter(|&i| rank_strength(hand[i].rank, mode, true) > winner_strength)
            .collect();
        if over.is_empty() {
            all
        } else {
            over
        }
    } else {
        trumps
    }
}

/// True when a hand qualifies for Kawesh: no A, 10, K, Q or J anywhere.
pub fn is_kawesh_hand(hand: &[Card]) -> bool {
    use crate::domain::cards::Rank;
    !hand.is_empty()
        && hand.iter().all(|c| {
            matches!(c.rank, Rank::Seven | Rank::Eight | Rank::Nine)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cards::Rank;

    fn play(seat: Seat, suit: Suit, rank: Rank) -> TablePlay {
        TablePlay {
            seat,
            card: Card::new(suit, rank),
            is_illegal: false,
        }
    }

    fn c(suit: Suit, rank: Rank) -> Card {
        Card::new(suit, rank)
    }

    #[test]
    fn leader_may_play_anything() {
        let hand = vec![c(Suit::Hearts, Rank::Ace), c(Suit::Spades, Rank::Seven)];
        let legal = legal_moves(&hand, &[], GameMode::Sun, None, 0);
        assert_eq!(legal, vec![0, 1]);
    }

    #[test]
    fn must_follow_suit() {
        let hand = vec![
            c(Suit::Hearts, Rank::King),
            c(Suit::Spades, Rank::Ace),
            c(Suit::Hearts, Rank::Seven),
        ];
        let table = vec![play(1, Suit::Hearts, Rank::Queen)];
        let legal = legal_moves(&hand, &table, GameMode::Sun, None, 2);
        assert_eq!(legal, vec![0, 2]);
    }

    #[test]
    fn void_against_winning_opponent_must_trump() {
        // Seat 2 (us) void in hearts; opponent seat 1 winning a non-trump
        // trick; seat 2 holds a trump, so only the trump is legal.
        let hand = vec![c(Suit::Spades, Rank::Seven), c(Suit::Diamonds, Rank::Ace)];
        let table = vec![play(1, Suit::Hearts, Rank::Ace)];
        let legal = legal_moves(&hand, &table, GameMode::Hokum, Some(Suit::Spades), 2);
        assert_eq!(legal, vec![0]);
    }

    #[test]
    fn must_over_trump_when_possible() {
        // Opponent already ruffed with the trump ten; we hold 9 (stronger in
        // ORDER_HOKUM) and 8 (weaker). Only the nine is legal.
        let hand = vec![c(Suit::Spades, Rank::Eight), c(Suit::Spades, Rank::Nine)];
        let table = vec![
            play(1, Suit::Hearts, Rank::Ace),
            play(2, Suit::Hearts, Rank::Seven),
            play(3, Suit::Spades, Rank::Ten),
        ];
        let legal = legal_moves(&hand, &table, GameMode::Hokum, Some(Suit::Spades), 0);
        assert_eq!(legal, vec![1]);
    }

    #[test]
    fn under_trump_allowed_when_no_over_trump_exists() {
        let hand = vec![c(Suit::Spades, Rank::Seven), c(Suit::Diamonds, Rank::Ten)];
        let table = vec![
            play(1, Suit::Hearts, Rank::Ace),
            play(2, Suit::Spades, Rank::Jack),
        ];
        let legal = legal_moves(&hand, &table, GameMode::Hokum, Some(Suit::Spades), 3);
        assert_eq!(legal, vec![0, 1]);
    }

    #[test]
    fn partner_winning_lifts_trump_duty() {
        // Seat 2's partner (seat 0) leads and wins so far; seat 2 is void but
        // free to discard anything.
        let hand = vec![c(Suit::Spades, Rank::Seven), c(Suit::Diamonds, Rank::Ten)];
        let table = vec![play(0, Suit::Hearts, Rank::Ace)];
        let legal = legal_moves(&hand, &table, GameMode::Hokum, Some(Suit::Spades), 2);
        assert_eq!(legal, vec![0, 1]);
    }

    #[test]
    fn sun_void_has_no_trump_duty() {
        let hand = vec![c(Suit::Spades, Rank::Ace), c(Suit::Diamonds, Rank::Ten)];
        let table = vec![play(1, Suit::Hearts, Rank::Ace)];
        let legal = legal_moves(&hand, &table, GameMode::Sun, None, 2);
        assert_eq!(legal, vec![0, 1]);
    }

    #[test]
    fn trump_beats_lead_in_hokum() {
        let table = vec![
            play(0, Suit::Hearts, Rank::Ace),
            play(1, Suit::Spades, Rank::Seven),
        ];
        assert_eq!(
            trick_winner(&table, GameMode::Hokum, Some(Suit::Spades)),
            Some(1)
        );
        assert_eq!(trick_winner(&table, GameMode::Sun, None), Some(0));
    }

    #[test]
    fn hokum_trump_order_nine_over_ace() {
        let table = vec![
            play(0, Suit::Spades, Rank::Ace),
            play(1, Suit::Spades, Rank::Nine),
            play(2, Suit::Spades, Rank::King),
            play(3, Suit::Spades, Rank::Jack),
        ];
        assert_eq!(
            trick_winner(&table, GameMode::Hokum, Some(Suit::Spades)),
            Some(3)
        );
        // Same cards in SUN: the ace holds.
        assert_eq!(trick_winner(&table, GameMode::Sun, None), Some(0));
    }

    #[test]
    fn ten_over_king_in_sun() {
        let table = vec![
            play(0, Suit::Hearts, Rank::King),
            play(1, Suit::Hearts, Rank::Ten),
        ];
        assert_eq!(trick_winner(&table, GameMode::Sun, None), Some(1));
    }

    #[test]
    fn legal_moves_is_idempotent() {
        let hand = vec![
            c(Suit::Hearts, Rank::King),
            c(Suit::Spades, Rank::Ace),
            c(Suit::Clubs, Rank::Nine),
        ];
        let table = vec![play(1, Suit::Hearts, Rank::Queen)];
        let a = legal_moves(&hand, &table, GameMode::Hokum, Some(Suit::Spades), 2);
        let b = legal_moves(&hand, &table, GameMode::Hokum, Some(Suit::Spades), 2);
        assert_eq!(a, b);
    }

    #[test]
    fn kawesh_hand_detection() {
        let kawesh = vec![
            c(Suit::Hearts, Rank::Seven),
            c(Suit::Spades, Rank::Eight),
            c(Suit::Clubs, Rank::Nine),
            c(Suit::Diamonds, Rank::Seven),
            c(Suit::Diamonds, Rank::Eight),
        ];
        assert!(is_kawesh_hand(&kawesh));

        let mut with_court = kawesh.clone();
        with_court[0] = c(Suit::Hearts, Rank::Jack);
        assert!(!is_kawesh_hand(&with_court));

        let mut with_ten = kawesh;
        with_ten[4] = c(Suit::Diamonds, Rank::Ten);
        assert!(!is_kawesh_hand(&with_ten));
    }
}
