//! Lead selection: the opening-card cascade for when the table is empty.
//!
//! First satisfied strategy wins: desperation, master cash, trump draw,
//! defensive priority, partner feed, long run, safe lead. Bayesian suit
//! safety from card memory breaks ties between otherwise equal suits.

use crate::ai::advice::{Advice, Tactic};
use crate::ai::partner_read::PartnerRead;
use crate::ai::trump_manager::{TrumpAction, TrumpPlan};
use crate::ai::view::BotView;
use crate::domain::cards::{rank_strength, GameMode, Suit};

/// Defensive guidance distilled from the opponent model and bid reader.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefensePlan {
    pub priority_suits: Vec<Suit>,
    pub avoid_suits: Vec<Suit>,
}

pub fn select_lead(
    view: &BotView,
    partner: Option<&PartnerRead>,
    defense: Option<&DefensePlan>,
    trump_plan: Option<&TrumpPlan>,
) -> Advice {
    let hand = &view.hand;
    let legal = &view.legal_indices;
    if legal.is_empty() {
        return Advice::new(0, Tactic::SafeLead, 0.0, "nothing to lead");
    }

    let mode = view.mode;
    let trump = view.trump_suit;
    let strength = |i: usize| {
        let card = hand[i];
        let is_trump = mode == GameMode::Hokum && trump == Some(card.suit);
        rank_strength(card.rank, mode, is_trump)
    };
    let best_of = |indices: &[usize]| indices.iter().copied().max_by_key(|&i| strength(i));
    let lowest_of = |indices: &[usize]| indices.iter().copied().min_by_key(|&i| strength(i));

    let suits = view.suits_in_hand();
    let suit_len = |s: Suit| suits[s.index()].len();

    // Suits some opponent is known void in: leads there get ruffed.
    let voided: Vec<Suit> = Suit::ALL
        .into_iter()
        .filter(|&s| !view.memory.seats_void_in(s).is_empty())
        .collect();

    // Bayesian safety: 1 - average opponent probability of holding the suit.
    let probs = view.memory.suit_probabilities(view.seat, hand);
    let safety = |s: Suit| {
        let opponents: Vec<f64> = (0..4u8)
            .filter(|&seat| seat != view.seat && seat != (view.seat + 2) % 4)
            .map(|seat| probs[seat as usize][s.index()])
            .collect();
        1.0 - opponents.iter().sum::<f64>() / opponents.len().max(1) as f64
    };

    // ── 1. Desperation: late and losing ──────────────────────────────
    let played = view.tricks_played();
    let won = view.tricks_won_by(view.my_team());
    if view.tricks_remaining() <= 2 && won < played - won {
        if let Some(idx) = best_of(legal) {
            return Advice::new(
                idx,
                Tactic::Desperation,
                0.4,
                format!("late and losing {won}/{played}, lead {}", hand[idx]),
            );
        }
    }

    // ── 2. Master cash: guaranteed winner, shortest suit first ───────
    let masters: Vec<usize> = view
        .master_indices()
        .into_iter()
        .filter(|&i| !voided.contains(&hand[i].suit))
        .collect();
    if let Some(&idx) = masters
        .iter()
        .min_by_key(|&&i| (suit_len(hand[i].suit), std::cmp::Reverse(strength(i))))
    {
        return Advice::new(
            idx,
            Tactic::MasterCash,
            0.9,
            format!(
                "{} is master in a {}-card suit",
                hand[idx],
                suit_len(hand[idx].suit)
            ),
        );
    }

    // ── 3. Trump draw per the trump manager's plan ───────────────────
    if mode == GameMode::Hokum {
        if let (Some(trump_suit), Some(plan)) = (trump, trump_plan) {
            if plan.action == TrumpAction::Draw || plan.lead_trump {
                let trumps = &suits[trump_suit.index()];
                if let Some(idx) = best_of(trumps) {
                    return Advice::new(
                        idx,
                        Tactic::TrumpDraw,
                        0.85,
                        format!("draw trumps with {}", hand[idx]),
                    );
                }
            }
        }
    }

    // ── 4. Defensive priority suits ──────────────────────────────────
    if !view.we_are_buyers() {
        if let Some(defense) = defense {
            for &suit in &defense.priority_suits {
                if voided.contains(&suit) {
                    continue;
                }
                if let Some(idx) = best_of(&suits[suit.index()]) {
                    return Advice::new(
                        idx,
                        Tactic::DefensePriority,
                        0.75,
                        format!("attack the declarer's weak {suit}"),
                    );
                }
            }
        }
    }

    // ── 5. Feed the partner's inferred strong suit, low ──────────────
    if let Some(partner) = partner {
        if partner.confidence >= 0.4 {
            for &suit in &partner.likely_strong_suits {
                if Some(suit) == trump || voided.contains(&suit) {
                    continue;
                }
                if let Some(idx) = lowest_of(&suits[suit.index()]) {
                    return Advice::new(
                        idx,
                        Tactic::PartnerFeed,
                        0.7,
                        format!("feed partner's strong {suit} with {}", hand[idx]),
                    );
                }
            }
        }
    }

    // ── 6. Long run: establish a 4+ card side suit ───────────────────
    let mut long_suits: Vec<Suit> = Suit::ALL
        .into_iter()
        .filter(|&s| Some(s) != trump && !voided.contains(&s) && suit_len(s) >= 4)
        .collect();
    long_suits.sort_by(|&a, &b| {
        suit_len(b).cmp(&suit_len(a)).then(
            safety(b)
                .partial_cmp(&safety(a))
                .unwrap_or(std::cmp::Ordering::Equal),
        )
    });
    if let Some(&suit) = long_suits.first() {
        if let Some(idx) = best_of(&suits[suit.index()]) {
            let conf = if safety(suit) > 0.7 { 0.75 } else { 0.65 };
            return Advice::new(
                idx,
                Tactic::LongRun,
                conf,
                format!("{}-card {suit}, lead {}", suit_len(suit), hand[idx]),
            );
        }
    }

    // ── 7. Safe lead: longest live side suit, safety-weighted ────────
    let mut candidates: Vec<Suit> = Suit::ALL
        .into_iter()
        .filter(|&s| Some(s) != trump && !voided.contains(&s) && suit_len(s) > 0)
        .collect();
    candidates.sort_by(|&a, &b| {
        suit_len(b).cmp(&suit_len(a)).then(
            safety(b)
                .partial_cmp(&safety(a))
                .unwrap_or(std::cmp::Ordering::Equal),
        )
    });
    if let Some(&suit) = candidates.first() {
        if let Some(idx) = best_of(&suits[suit.index()]) {
            return Advice::new(
                idx,
                Tactic::SafeLead,
                0.5,
                format!("safe lead {} from a {}-card {suit}", hand[idx], suit_len(suit)),
            );
        }
    }

    // Everything is problematic: lead the strongest card anyway.
    let idx = best_of(legal).unwrap_or(legal[0]);
    Advice::new(
        idx,
        Tactic::SafeLead,
        0.3,
        format!("all suits problematic, lead {}", hand[idx]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::memory::CardMemory;
    use crate::domain::bidding::BidRecord;
    use crate::domain::cards::{Card, Rank};
    use crate::domain::contract::{Contract, ContractType};
    use crate::domain::state::{MatchScores, Team};

    fn view_with_hand(cards: &[(Suit, Rank)], mode: GameMode, trump: Option<Suit>) -> BotView {
        let hand: Vec<Card> = cards.iter().map(|&(s, r)| Card::new(s, r)).collect();
        let legal = (0..hand.len()).collect();
        BotView {
            seat: 0,
            legal_indices: legal,
            table_cards: Vec::new(),
            mode,
            trump_suit: trump,
            contract: Contract {
                contract_type: match mode {
                    GameMode::Hokum => ContractType::Hokum,
                    GameMode::Sun => ContractType::Sun,
                },
                suit: trump,
                bidder_seat: 0,
                team: Team::Us,
                level: 1,
                variant: None,
                is_ashkal: false,
                round: 1,
            },
            bid_history: Vec::<BidRecord>::new(),
            round_history: Vec::new(),
            floor_card: None,
            match_scores: MatchScores::default(),
            memory: CardMemory::default(),
            baloot_ready: false,
            hand,
        }
    }

    #[test]
    fn master_cash_wins_over_safe_lead() {
        let mut view = view_with_hand(
            &[
                (Suit::Hearts, Rank::Ace),
                (Suit::Clubs, Rank::Seven),
                (Suit::Clubs, Rank::Eight),
            ],
            GameMode::Sun,
            None,
        );
        // Nothing played yet: the ace of hearts is master.
        view.memory = CardMemory::default();
        let advice = select_lead(&view, None, None, None);
        assert_eq!(advice.tactic, Tactic::MasterCash);
        assert_eq!(view.hand[advice.card_index].rank, Rank::Ace);
    }

    #[test]
    fn trump_draw_follows_the_plan() {
        let view = view_with_hand(
            &[
                (Suit::Spades, Rank::Jack),
                (Suit::Spades, Rank::Seven),
                (Suit::Hearts, Rank::King),
            ],
            GameMode::Hokum,
            Some(Suit::Spades),
        );
        let plan = TrumpPlan {
            action: TrumpAction::Draw,
            lead_trump: true,
            safe_side_suits: vec![],
            ruff_target_suits: vec![],
            reasoning: String::new(),
        };
        let advice = select_lead(&view, None, None, Some(&plan));
        assert_eq!(advice.tactic, Tactic::TrumpDraw);
        assert_eq!(view.hand[advice.card_index].rank, Rank::Jack);
    }

    #[test]
    fn partner_feed_leads_low_in_their_suit() {
        let view = view_with_hand(
            &[
                (Suit::Diamonds, Rank::King),
                (Suit::Diamonds, Rank::Seven),
                (Suit::Clubs, Rank::Nine),
            ],
            GameMode::Sun,
            None,
        );
        let partner = PartnerRead {
            likely_strong_suits: vec![Suit::Diamonds],
            confidence: 0.6,
            ..Default::default()
        };
        let advice = select_lead(&view, Some(&partner), None, None);
        assert_eq!(advice.tactic, Tactic::PartnerFeed);
        assert_eq!(view.hand[advice.card_index].rank, Rank::Seven);
    }

    #[test]
    fn falls_back_to_safe_lead() {
        let view = view_with_hand(
            &[(Suit::Clubs, Rank::Nine), (Suit::Clubs, Rank::Seven)],
            GameMode::Sun,
            None,
        );
        let advice = select_lead(&view, None, None, None);
        assert_eq!(advice.tactic, Tactic::SafeLead);
    }
}
