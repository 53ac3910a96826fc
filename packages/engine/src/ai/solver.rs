//! Endgame solver: exhaustive alpha-beta minimax over bitset hands once
//! every seat is down to four cards, with Monte-Carlo determinization over
//! the unseen cards when opponent hands are unknown.
//!
//! Cards are u8 ids (`suit * 8 + natural rank index`), hands are u32 masks,
//! and the in-solver legality mirrors the rule kernel exactly, including
//! the over-trump duty.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

use crate::ai::advice::{Advice, Tactic};
use crate::ai::view::BotView;
use crate::domain::cards::GameMode;
use crate::domain::state::{Seat, SEATS};

const INF: i16 = 1000;
const NO_CARD: u8 = 0xFF;

/// Determinization sample count (within the 8..=16 envelope).
const SAMPLES: usize = 12;

// Strength and point tables indexed by natural rank (7,8,9,10,J,Q,K,A).
const STRENGTH_SUN: [i16; 8] = [0, 1, 2, 6, 3, 4, 5, 7];
const STRENGTH_TRUMP: [i16; 8] = [0, 1, 6, 4, 7, 2, 3, 5];
const POINTS_SUN: [i16; 8] = [0, 0, 0, 10, 2, 3, 4, 11];
const POINTS_TRUMP: [i16; 8] = [0, 0, 14, 10, 20, 3, 4, 11];

fn suit_of(card: u8) -> u8 {
    card / 8
}

fn rank_of(card: u8) -> usize {
    (card % 8) as usize
}

fn suit_mask(suit: u8) -> u32 {
    0xFFu32 << (suit * 8)
}

#[derive(Debug, Clone)]
struct FastState {
    hands: [u32; 4],
    trick_cards: [u8; 4],
    trick_seats: [u8; 4],
    trick_len: u8,
    current_player: u8,
    points: [i16; 2],
    mode: GameMode,
    trump: Option<u8>,
}

impl FastState {
    fn new(mode: GameMode, trump: Option<u8>) -> Self {
        Self {
            hands: [0; 4],
            trick_cards: [NO_CARD; 4],
            trick_seats: [NO_CARD; 4],
            trick_len: 0,
            current_player: 0,
            points: [0; 2],
            mode,
            trump,
        }
    }

    fn is_trump(&self, card: u8) -> bool {
        self.mode == GameMode::Hokum && self.trump == Some(suit_of(card))
    }

    fn card_points(&self, card: u8) -> i16 {
        if self.is_trump(card) {
            POINTS_TRUMP[rank_of(card)]
        } else {
            POINTS_SUN[rank_of(card)]
        }
    }

    /// Sortable trick strength given the led suit.
    fn trick_strength(&self, card: u8, led: u8) -> i16 {
        if self.is_trump(card) {
            100 + STRENGTH_TRUMP[rank_of(card)]
        } else if suit_of(card) != led {
            -1
        } else {
            STRENGTH_SUN[rank_of(card)]
        }
    }

    fn winner_so_far(&self) -> Option<(u8, u8)> {
        if self.trick_len == 0 {
            return None;
        }
        let led = suit_of(self.trick_cards[0]);
        let mut best = (self.trick_seats[0], self.trick_cards[0]);
        for i in 1..self.trick_len as usize {
            let card = self.trick_cards[i];
            if self.trick_strength(card, led) > self.trick_strength(best.1, led) {
                best = (self.trick_seats[i], card);
            }
        }
        Some(best)
    }

    /// Legal moves for the current player; mirrors the rule kernel.
    fn legal_moves_mask(&self) -> u32 {
        let hand = self.hands[self.current_player as usize];
        if self.trick_len == 0 {
            return hand;
        }
        let led = suit_of(self.trick_cards[0]);
        let follow = hand & suit_mask(led);
        if follow != 0 {
            return follow;
        }
        let Some((winner_seat, winner_card)) = self.winner_so_far() else {
            return hand;
        };
        if winner_seat % 2 == self.current_player % 2 || self.mode != GameMode::Hokum {
            return hand;
        }
        let Some(trump) = self.trump else { return hand };
        let trumps = hand & suit_mask(trump);
        if trumps == 0 {
            return hand;
        }
        if suit_of(winner_card) == trump {
            let winner_strength = STRENGTH_TRUMP[rank_of(winner_card)];
            let mut over = 0u32;
            let mut rest = trumps;
            while rest != 0 {
                let bit = rest.trailing_zeros();
                rest &= rest - 1;
                if STRENGTH_TRUMP[rank_of(bit as u8)] > winner_strength {
                    over |= 1 << bit;
                }
            }
            if over != 0 {
                over
            } else {
                hand
            }
        } else {
            trumps
        }
    }

    fn play_card(&mut self, card: u8) {
        let player = self.current_player;
        self.hands[player as usize] &= !(1u32 << card);
        let len = self.trick_len as usize;
        self.trick_cards[len] = card;
        self.trick_seats[len] = player;
        self.trick_len += 1;

        if self.trick_len < 4 {
            self.current_player = (player + 1) % 4;
            return;
        }

        // Trick complete: score it to the winner's team.
        let led = suit_of(self.trick_cards[0]);
        let mut best = 0usize;
        for i in 1..4 {
            if self.trick_strength(self.trick_cards[i], led)
                > self.trick_strength(self.trick_cards[best], led)
            {
                best = i;
            }
        }
        let winner = self.trick_seats[best];
        let mut trick_points: i16 = self
            .trick_cards
            .iter()
            .map(|&c| self.card_points(c))
            .sum();
        if self.hands.iter().all(|&h| h == 0) {
            trick_points += 10; // last trick
        }
        self.points[(winner % 2) as usize] += trick_points;
        self.trick_cards = [NO_CARD; 4];
        self.trick_seats = [NO_CARD; 4];
        self.trick_len = 0;
        self.current_player = winner;
    }

    fn is_terminal(&self) -> bool {
        self.trick_len == 0 && self.hands.iter().all(|&h| h == 0)
    }

    fn value_for(&self, team: u8) -> i16 {
        self.points[team as usize] - self.points[(1 - team) as usize]
    }
}

/// Alpha-beta minimax; value is the point differential for `my_team`.
fn minimax(state: &FastState, mut alpha: i16, mut beta: i16, my_team: u8) -> i16 {
    if state.is_terminal() {
        return state.value_for(my_team);
    }

    let maximizing = state.current_player % 2 == my_team;
    let mut moves: Vec<u8> = Vec::with_capacity(8);
    let mut mask = state.legal_moves_mask();
    while mask != 0 {
        let bit = mask.trailing_zeros() as u8;
        mask &= mask - 1;
        moves.push(bit);
    }
    // Move ordering: strong cards first for better pruning.
    moves.sort_by_key(|&c| {
        let strength = if state.is_trump(c) {
            100 + STRENGTH_TRUMP[rank_of(c)]
        } else {
            STRENGTH_SUN[rank_of(c)]
        };
        std::cmp::Reverse(strength)
    });

    let mut best = if maximizing { -INF } else { INF };
    for card in moves {
        let mut next = state.clone();
        next.play_card(card);
        let value = minimax(&next, alpha, beta, my_team);
        if maximizing {
            best = best.max(value);
            alpha = alpha.max(best);
        } else {
            best = best.min(value);
            beta = beta.min(best);
        }
        if beta <= alpha {
            break;
        }
    }
    best
}

/// Best move and value for the configured root hands.
fn find_best_move(state: &FastState, my_team: u8) -> Option<(u8, i16)> {
    let mut best: Option<(u8, i16)> = None;
    let mut mask = state.legal_moves_mask();
    while mask != 0 {
        let bit = mask.trailing_zeros() as u8;
        mask &= mask - 1;
        let mut next = state.clone();
        next.play_card(bit);
        let value = minimax(&next, -INF, INF, my_team);
        if best.map(|(_, v)| value > v).unwrap_or(true) {
            best = Some((bit, value));
        }
    }
    best
}

fn card_id(card: crate::domain::cards::Card) -> u8 {
    (card.suit.index() * 8 + card.rank.natural_index()) as u8
}

/// The solver triggers once every seat holds four cards or fewer.
pub fn endgame_reached(view: &BotView) -> bool {
    if view.hand.len() > 4 {
        return false;
    }
    (0..SEATS as Seat).all(|s| view.memory.hand_size(s) <= 4)
}

/// Solve the endgame from a bot view: exhaustive when a single deal is
/// consistent with the evidence, Monte-Carlo vote otherwise.
pub fn solve_endgame(view: &BotView, seed: u64) -> Option<Advice> {
    if view.hand.is_empty() {
        return None;
    }

    let me = view.seat;
    let my_team = me % 2;
    let trump = view.trump_suit.map(|s| s.index() as u8);

    // Remaining hand sizes for the hidden seats.
    let mut needed: [usize; 4] = [0; 4];
    for seat in 0..SEATS as Seat {
        needed[seat as usize] = if seat == me {
            view.hand.len()
        } else {
            view.memory.hand_size(seat) as usize
        };
    }

    let unseen = view.memory.unseen_cards(&view.hand);
    let total_needed: usize = (0..SEATS).filter(|&s| s != me as usize).map(|s| needed[s]).sum();
    if unseen.len() < total_needed {
        return None;
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut votes: [u32; 32] = [0; 32];
    let mut value_sums: [i64; 32] = [0; 32];
    let mut samples_done = 0usize;
    let mut attempts = 0usize;

    while samples_done < SAMPLES && attempts < SAMPLES * 10 {
        attempts += 1;
        let mut pool = unseen.clone();
        pool.shuffle(&mut rng);

        let mut state = FastState::new(view.mode, trump);
        state.hands[me as usize] = view.hand.iter().fold(0u32, |m, &c| m | 1 << card_id(c));
        state.current_player = me;
        for (i, play) in view.table_cards.iter().enumerate() {
            state.trick_cards[i] = card_id(play.card);
            state.trick_seats[i] = play.seat;
        }
        state.trick_len = view.table_cards.len() as u8;

        let mut valid = true;
        let mut cursor = 0usize;
        for seat in 0..SEATS as Seat {
            if seat == me {
                continue;
            }
            let take = needed[seat as usize];
            let segment = &pool[cursor..cursor + take];
            cursor += take;
            // Reject deals that contradict an observed void.
            if segment
                .iter()
                .any(|c| view.memory.is_void(seat, c.suit))
            {
                valid = false;
                break;
            }
            state.hands[seat as usize] =
                segment.iter().fold(0u32, |m, &c| m | 1 << card_id(c));
        }
        if !valid {
            continue;
        }

        if let Some((card, value)) = find_best_move(&state, my_team) {
            votes[card as usize] += 1;
            value_sums[card as usize] += i64::from(value);
            samples_done += 1;
        }
    }

    if samples_done == 0 {
        return None;
    }

    // Vote by mode; ties broken by average value.
    let best_card = (0..32u8).max_by_key(|&c| {
        (
            votes[c as usize],
            if votes[c as usize] > 0 {
                value_sums[c as usize] / i64::from(votes[c as usize])
            } else {
                i64::MIN
            },
        )
    })?;
    let card_index = view
        .hand
        .iter()
        .position(|&c| card_id(c) == best_card)?;
    let avg = value_sums[best_card as usize] / i64::from(votes[best_card as usize].max(1));

    debug!(samples = samples_done, card = %view.hand[card_index], avg, "endgame solved");
    Some(Advice::new(
        card_index,
        Tactic::Solver,
        0.9,
        format!(
            "minimax over {samples_done} deals: {} averages {avg:+}",
            view.hand[card_index]
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cards::{Card, Rank, Suit};

    fn id(suit: Suit, rank: Rank) -> u8 {
        card_id(Card::new(suit, rank))
    }

    fn state_with(mode: GameMode, trump: Option<u8>, hands: [&[u8]; 4], current: u8) -> FastState {
        let mut state = FastState::new(mode, trump);
        for (seat, cards) in hands.iter().enumerate() {
            state.hands[seat] = cards.iter().fold(0u32, |m, &c| m | 1 << c);
        }
        state.current_player = current;
        state
    }

    #[test]
    fn last_trick_goes_to_the_trump_ace() {
        // Seat 0 leads the trump ace into three losers: 11 + 10 last-trick.
        let state = state_with(
            GameMode::Hokum,
            Some(Suit::Hearts.index() as u8),
            [
                &[id(Suit::Hearts, Rank::Ace)],
                &[id(Suit::Hearts, Rank::Seven)],
                &[id(Suit::Hearts, Rank::Eight)],
                &[id(Suit::Spades, Rank::Nine)],
            ],
            0,
        );
        let (card, value) = find_best_move(&state, 0).unwrap();
        assert_eq!(card, id(Suit::Hearts, Rank::Ace));
        assert_eq!(value, 21);
    }

    #[test]
    fn two_trick_runout_counts_everything() {
        // Seat 0 holds the two top hearts; everyone else has losers.
        let state = state_with(
            GameMode::Hokum,
            Some(Suit::Hearts.index() as u8),
            [
                &[id(Suit::Hearts, Rank::Ace), id(Suit::Hearts, Rank::King)],
                &[id(Suit::Hearts, Rank::Seven), id(Suit::Hearts, Rank::Eight)],
                &[id(Suit::Spades, Rank::Seven), id(Suit::Spades, Rank::Eight)],
                &[id(Suit::Spades, Rank::Nine), id(Suit::Spades, Rank::Ten)],
            ],
            0,
        );
        let (_, value) = find_best_move(&state, 0).unwrap();
        // T1: A(11) + 7 + 7♠ + 9♠ = 11; T2: K(4) + 8 + 8♠ + 10♠(10) = 14
        // plus the 10-point last trick = 35.
        assert_eq!(value, 35);
    }

    #[test]
    fn solver_legality_enforces_over_trump() {
        // Opponent ruffed with the trump ten; our seat holds trump 9 and a
        // side card. Only the over-trump is legal in-solver.
        let mut state = state_with(
            GameMode::Hokum,
            Some(Suit::Spades.index() as u8),
            [
                &[],
                &[id(Suit::Spades, Rank::Nine), id(Suit::Clubs, Rank::Seven)],
                &[],
                &[],
            ],
            1,
        );
        state.trick_cards[0] = id(Suit::Hearts, Rank::Ace);
        state.trick_seats[0] = 0;
        state.trick_cards[1] = id(Suit::Spades, Rank::Ten);
        state.trick_seats[1] = 3;
        state.trick_len = 2;

        let legal = state.legal_moves_mask();
        assert_eq!(legal, 1u32 << id(Suit::Spades, Rank::Nine));
    }

    #[test]
    fn sun_mode_uses_sun_order() {
        // In SUN the ten outranks the king.
        let state = state_with(
            GameMode::Sun,
            None,
            [
                &[id(Suit::Hearts, Rank::Ten)],
                &[id(Suit::Hearts, Rank::King)],
                &[id(Suit::Hearts, Rank::Seven)],
                &[id(Suit::Hearts, Rank::Eight)],
            ],
            0,
        );
        let (_, value) = find_best_move(&state, 0).unwrap();
        // 10 + K + nothing + nothing = 14 abnat + 10 last trick, all ours.
        assert_eq!(value, 24);
    }
}
