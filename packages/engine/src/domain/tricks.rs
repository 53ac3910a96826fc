//! Trick manager: applies plays to the round state, enforces legality,
//! resolves completed tricks and rotates the turn to the winner.

use tracing::debug;

use crate::domain::cards::{GameMode, Suit};
use crate::domain::rules::{legal_moves, trick_points, trick_winner};
use crate::domain::state::{next_seat, CompletedTrick, RoundState, Seat, TablePlay};
use crate::errors::domain::DomainError;

/// Result of one accepted play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayOutcome {
    /// The card that landed on the table.
    pub play: TablePlay,
    /// Set when this play completed the trick.
    pub completed: Option<CompletedTrick>,
    /// Index of the trick this play belongs to (0-based).
    pub trick_index: usize,
}

/// Validate and apply one play.
///
/// In strict mode an illegal card is rejected outright. In permissive mode it
/// is accepted but tagged `is_illegal`, which is what the Qayd scanner and
/// the bots' detective logic look for. Permissive mode must not be used in
/// competitive play.
pub fn play_card(
    round: &mut RoundState,
    seat: Seat,
    hand_index: usize,
    strict: bool,
) -> Result<PlayOutcome, DomainError> {
    let Some(mode) = round.mode else {
        return Err(DomainError::phase("round has no contract yet"));
    };
    if seat != round.current_turn {
        return Err(DomainError::Turn {
            expected: round.current_turn,
        });
    }
    let hand = &round.hands[seat as usize];
    if hand_index >= hand.len() {
        return Err(DomainError::input(format!(
            "hand index {hand_index} out of range ({} cards)",
            hand.len()
        )));
    }

    let legal = legal_moves(hand, &round.table_cards, mode, round.trump_suit, seat);
    let is_legal = legal.contains(&hand_index);
    if strict && !is_legal {
        return Err(DomainError::rule(format!(
            "card {} does not satisfy the follow/trump duty",
            hand[hand_index]
        )));
    }

    let card = round.hands[seat as usize].remove(hand_index);
    let play = TablePlay {
        seat,
        card,
        is_illegal: !is_legal,
    };
    round.table_cards.push(play.clone());
    let trick_index = round.round_history.len();
    debug!(seat, %card, trick = trick_index, "card played");

    if round.table_cards.len() < 4 {
        round.current_turn = next_seat(seat);
        return Ok(PlayOutcome {
            play,
            completed: None,
            trick_index,
        });
    }

    let completed = resolve_table(round, mode, round.trump_suit)?;
    round.current_turn = completed.winner;
    Ok(PlayOutcome {
        play,
        completed: Some(completed),
        trick_index,
    })
}

/// Fold a full table into the round history.
fn resolve_table(
    round: &mut RoundState,
    mode: GameMode,
    trump: Option<Suit>,
) -> Result<CompletedTrick, DomainError> {
    let plays = std::mem::take(&mut round.table_cards);
    let leader = plays
        .first()
        .map(|p| p.seat)
        .ok_or_else(|| DomainError::fatal("resolving an empty table"))?;
    let winner = trick_winner(&plays, mode, trump)
        .ok_or_else(|| DomainError::fatal("trick has no resolvable winner"))?;
    let points = trick_points(&plays, mode, trump);
    let trick = CompletedTrick {
        plays,
        leader,
        winner,
        points,
    };
    debug!(winner, points, "trick resolved");
    round.round_history.push(trick.clone());
    Ok(trick)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cards::{Card, Rank};

    fn round_with_mode(mode: GameMode, trump: Option<Suit>) -> RoundState {
        let mut round = RoundState::new(3);
        round.mode = Some(mode);
        round.trump_suit = trump;
        round
    }

    fn hand(cards: &[(Suit, Rank)]) -> Vec<Card> {
        cards.iter().map(|&(s, r)| Card::new(s, r)).collect()
    }

    #[test]
    fn rejects_out_of_turn() {
        let mut round = round_with_mode(GameMode::Sun, None);
        round.hands[1] = hand(&[(Suit::Hearts, Rank::Ace)]);
        let err = play_card(&mut round, 1, 0, true).unwrap_err();
        assert!(matches!(err, DomainError::Turn { expected: 0 }));
    }

    #[test]
    fn strict_mode_rejects_revoke() {
        let mut round = round_with_mode(GameMode::Sun, None);
        round.hands[0] = hand(&[(Suit::Hearts, Rank::Queen)]);
        round.hands[1] = hand(&[(Suit::Hearts, Rank::King), (Suit::Spades, Rank::Ace)]);
        play_card(&mut round, 0, 0, true).unwrap();

        let err = play_card(&mut round, 1, 1, true).unwrap_err();
        assert!(matches!(err, DomainError::Rule(_)));
        // State unchanged: the card is still in hand and the table holds one.
        assert_eq!(round.hands[1].len(), 2);
        assert_eq!(round.table_cards.len(), 1);
    }

    #[test]
    fn permissive_mode_flags_revoke() {
        let mut round = round_with_mode(GameMode::Sun, None);
        round.hands[0] = hand(&[(Suit::Hearts, Rank::Queen)]);
        round.hands[1] = hand(&[(Suit::Hearts, Rank::King), (Suit::Spades, Rank::Ace)]);
        play_card(&mut round, 0, 0, false).unwrap();

        let outcome = play_card(&mut round, 1, 1, false).unwrap();
        assert!(outcome.play.is_illegal);
        assert!(round.table_cards[1].is_illegal);
    }

    #[test]
    fn full_trick_resolves_and_winner_leads() {
        let mut round = round_with_mode(GameMode::Hokum, Some(Suit::Spades));
        round.hands[0] = hand(&[(Suit::Hearts, Rank::Ace)]);
        round.hands[1] = hand(&[(Suit::Hearts, Rank::Seven)]);
        round.hands[2] = hand(&[(Suit::Hearts, Rank::Ten)]);
        round.hands[3] = hand(&[(Suit::Spades, Rank::Seven)]);
        round.current_turn = 0;

        play_card(&mut round, 0, 0, true).unwrap();
        play_card(&mut round, 1, 0, true).unwrap();
        play_card(&mut round, 2, 0, true).unwrap();
        let outcome = play_card(&mut round, 3, 0, true).unwrap();

        let trick = outcome.completed.expect("trick should complete");
        // The lone trump ruffs the ace.
        assert_eq!(trick.winner, 3);
        assert_eq!(trick.leader, 0);
        // A(11) + 7(0) + 10(10) + trump 7(0).
        assert_eq!(trick.points, 21);
        assert_eq!(round.current_turn, 3);
        assert!(round.table_cards.is_empty());
        assert_eq!(round.round_history.len(), 1);
    }
}
