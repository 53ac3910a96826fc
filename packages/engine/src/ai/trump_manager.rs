//! Trump management (HOKUM): decide between drawing enemy trumps,
//! preserving ours, setting up a cross-ruff, or playing neutrally.

use crate::domain::cards::{Card, Rank, Suit};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrumpAction {
    Draw,
    Preserve,
    CrossRuff,
    Neutral,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrumpPlan {
    pub action: TrumpAction,
    pub lead_trump: bool,
    pub safe_side_suits: Vec<Suit>,
    pub ruff_target_suits: Vec<Suit>,
    pub reasoning: String,
}

fn plan(
    action: TrumpAction,
    lead_trump: bool,
    safe: Vec<Suit>,
    ruffs: Vec<Suit>,
    reasoning: impl Into<String>,
) -> TrumpPlan {
    TrumpPlan {
        action,
        lead_trump,
        safe_side_suits: safe,
        ruff_target_suits: ruffs,
        reasoning: reasoning.into(),
    }
}

#[allow(clippy::too_many_arguments)]
pub fn manage_trumps(
    hand: &[Card],
    trump_suit: Suit,
    enemy_trumps_estimate: u8,
    partner_trumps_estimate: u8,
    tricks_played: usize,
    we_are_buyers: bool,
    partner_void_suits: &[Suit],
    enemy_void_suits: &[Suit],
) -> TrumpPlan {
    let my_trumps = hand.iter().filter(|c| c.suit == trump_suit).count() as u8;
    let trump_ranks: Vec<Rank> = hand
        .iter()
        .filter(|c| c.suit == trump_suit)
        .map(|c| c.rank)
        .collect();
    let has_j = trump_ranks.contains(&Rank::Jack);
    let has_9 = trump_ranks.contains(&Rank::Nine);
    let has_j9 = has_j && has_9;

    let side_suits: Vec<Suit> = Suit::ALL.into_iter().filter(|&s| s != trump_suit).collect();
    let safe_sides: Vec<Suit> = side_suits
        .iter()
        .copied()
        .filter(|s| !enemy_void_suits.contains(s))
        .collect();
    let my_void_sides: Vec<Suit> = side_suits
        .iter()
        .copied()
        .filter(|&s| !hand.iter().any(|c| c.suit == s))
        .collect();
    let ruff_targets = if my_trumps > 0 {
        my_void_sides
    } else {
        Vec::new()
    };

    // All enemy trumps gone: cash winners freely.
    if enemy_trumps_estimate == 0 {
        return plan(
            TrumpAction::Neutral,
            false,
            safe_sides,
            ruff_targets,
            "enemy trumps exhausted, cash winners",
        );
    }

    // Late game with a single trump left: keep it for the critical ruff.
    if tricks_played >= 5 && my_trumps == 1 {
        return plan(
            TrumpAction::Preserve,
            false,
            safe_sides,
            ruff_targets,
            "late game, last trump saved",
        );
    }

    // Defenders short on trumps never waste them.
    if !we_are_buyers && my_trumps <= 2 {
        return plan(
            TrumpAction::Preserve,
            false,
            safe_sides,
            ruff_targets,
            format!("defending with {my_trumps} trumps"),
        );
    }

    // J+9 is a dominant holding: strip the enemy.
    if has_j9 {
        return plan(
            TrumpAction::Draw,
            true,
            safe_sides,
            ruff_targets,
            format!("J+9 against {enemy_trumps_estimate} enemy trumps"),
        );
    }

    // Buyers with one top honour and length draw offensively — but a single
    // honour with only three trumps draws early and preserves later.
    if we_are_buyers && (has_j || has_9) {
        if my_trumps >= 4 || (my_trumps == 3 && tricks_played < 3) {
            return plan(
                TrumpAction::Draw,
                true,
                safe_sides,
                ruff_targets,
                format!(
                    "buyer with {} and {my_trumps} trumps",
                    if has_j { "J" } else { "9" }
                ),
            );
        }
        if my_trumps == 3 {
            return plan(
                TrumpAction::Preserve,
                false,
                safe_sides,
                ruff_targets,
                "single honour, three trumps, past the early tricks",
            );
        }
    }

    // Five-plus trumps draw even without a top honour.
    if we_are_buyers && my_trumps >= 5 {
        return plan(
            TrumpAction::Draw,
            true,
            safe_sides,
            ruff_targets,
            format!("{my_trumps} trumps, length draw"),
        );
    }

    // Partner voids plus our trumps: cross-ruff.
    if !partner_void_suits.is_empty() && my_trumps > 0 {
        return plan(
            TrumpAction::CrossRuff,
            false,
            safe_sides,
            ruff_targets,
            format!("partner void, {partner_trumps_estimate} partner trumps"),
        );
    }

    // Outnumbered: preserve.
    if my_trumps <= 2 && enemy_trumps_estimate > my_trumps {
        return plan(
            TrumpAction::Preserve,
            false,
            safe_sides,
            ruff_targets,
            format!("{my_trumps} trumps vs {enemy_trumps_estimate} enemy"),
        );
    }

    plan(
        TrumpAction::Neutral,
        false,
        safe_sides,
        ruff_targets,
        format!("{my_trumps} trumps vs {enemy_trumps_estimate} enemy, no signal"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand(cards: &[(Suit, Rank)]) -> Vec<Card> {
        cards.iter().map(|&(s, r)| Card::new(s, r)).collect()
    }

    #[test]
    fn j9_draws() {
        let h = hand(&[
            (Suit::Spades, Rank::Jack),
            (Suit::Spades, Rank::Nine),
            (Suit::Hearts, Rank::Seven),
        ]);
        let plan = manage_trumps(&h, Suit::Spades, 3, 1, 0, true, &[], &[]);
        assert_eq!(plan.action, TrumpAction::Draw);
        assert!(plan.lead_trump);
    }

    #[test]
    fn single_honour_three_trumps_draws_only_early() {
        let h = hand(&[
            (Suit::Spades, Rank::Jack),
            (Suit::Spades, Rank::Eight),
            (Suit::Spades, Rank::Seven),
            (Suit::Hearts, Rank::Ace),
        ]);
        let early = manage_trumps(&h, Suit::Spades, 3, 0, 1, true, &[], &[]);
        assert_eq!(early.action, TrumpAction::Draw);
        let late = manage_trumps(&h, Suit::Spades, 3, 0, 4, true, &[], &[]);
        assert_eq!(late.action, TrumpAction::Preserve);
    }

    #[test]
    fn exhausted_enemy_goes_neutral() {
        let h = hand(&[(Suit::Spades, Rank::Jack), (Suit::Hearts, Rank::Ace)]);
        let plan = manage_trumps(&h, Suit::Spades, 0, 0, 4, true, &[], &[]);
        assert_eq!(plan.action, TrumpAction::Neutral);
    }

    #[test]
    fn defender_with_two_trumps_preserves() {
        let h = hand(&[
            (Suit::Spades, Rank::Jack),
            (Suit::Spades, Rank::Nine),
            (Suit::Hearts, Rank::Seven),
        ]);
        let plan = manage_trumps(&h, Suit::Spades, 4, 0, 1, false, &[], &[]);
        assert_eq!(plan.action, TrumpAction::Preserve);
    }

    #[test]
    fn partner_void_cross_ruffs() {
        let h = hand(&[
            (Suit::Spades, Rank::Seven),
            (Suit::Spades, Rank::Eight),
            (Suit::Spades, Rank::Ten),
            (Suit::Hearts, Rank::Seven),
        ]);
        let plan = manage_trumps(&h, Suit::Spades, 2, 2, 2, true, &[Suit::Diamonds], &[]);
        assert_eq!(plan.action, TrumpAction::CrossRuff);
    }
}
