//! Cooperative play: partnership-level overrides bridging the partner read
//! with lead/follow decisions. Returns `None` when the default play is fine.

use crate::ai::advice::{Advice, Tactic};
use crate::ai::calibration::DISCARD_SHORTEST_SUIT_RELIABILITY;
use crate::ai::partner_read::PartnerRead;
use crate::ai::view::BotView;
use crate::domain::cards::{card_points, rank_strength, GameMode, Rank, Suit};

/// Cooperative lead override, consulted before the default lead selector.
pub fn cooperative_lead(view: &BotView, partner: &PartnerRead) -> Option<Advice> {
    if view.hand.is_empty() || partner.confidence < 0.25 {
        return None;
    }
    let mode = view.mode;
    let trump = view.trump_suit;
    let conf = partner.confidence;
    let suits = view.suits_in_hand();
    let strength = |i: usize| {
        let is_trump = mode == GameMode::Hokum && trump == Some(view.hand[i].suit);
        rank_strength(view.hand[i].rank, mode, is_trump)
    };

    // DRAW_TRUMP: partner has trump length but no honours; clear enemies.
    if mode == GameMode::Hokum && !partner.has_high_trumps && partner.estimated_trumps >= 2 {
        if let Some(trump_suit) = trump {
            let high: Vec<usize> = suits[trump_suit.index()]
                .iter()
                .copied()
                .filter(|&i| {
                    matches!(view.hand[i].rank, Rank::Jack | Rank::Nine | Rank::Ace)
                })
                .collect();
            if let Some(&idx) = high.iter().max_by_key(|&&i| strength(i)) {
                return Some(Advice::new(
                    idx,
                    Tactic::DrawTrump,
                    conf * 0.9,
                    format!("draw trumps with {} for partner", view.hand[idx]),
                ));
            }
        }
    }

    // SETUP_RUN: we hold 3+ in a suit the partner is strong in.
    for &suit in &partner.likely_strong_suits {
        if suits[suit.index()].len() >= 3 {
            let idx = *suits[suit.index()]
                .iter()
                .max_by_key(|&&i| strength(i))?;
            return Some(Advice::new(
                idx,
                Tactic::SetupRun,
                conf * 0.8,
                format!("set up the shared {suit} run"),
            ));
        }
    }

    // FEED_STRONG: lead low into the partner's strong suit.
    for &suit in &partner.likely_strong_suits {
        if Some(suit) == trump || partner.likely_void_suits.contains(&suit) {
            continue;
        }
        let low: Vec<usize> = suits[suit.index()]
            .iter()
            .copied()
            .filter(|&i| strength(i) <= 3)
            .collect();
        if let Some(&idx) = low.iter().min_by_key(|&&i| strength(i)) {
            return Some(Advice::new(
                idx,
                Tactic::FeedStrong,
                conf * 0.8,
                format!("feed {} into partner's {suit}", view.hand[idx]),
            ));
        }
    }

    // ENTRY_TRANSFER: a short holding with very low cards hands the lead
    // to the partner's masters.
    for &suit in &partner.likely_strong_suits {
        if Some(suit) == trump || partner.likely_void_suits.contains(&suit) {
            continue;
        }
        let cands = &suits[suit.index()];
        if cands.is_empty() || cands.len() > 2 {
            continue;
        }
        let very_low: Vec<usize> = cands
            .iter()
            .copied()
            .filter(|&i| strength(i) <= 2)
            .collect();
        if let Some(&idx) = very_low.iter().min_by_key(|&&i| strength(i)) {
            return Some(Advice::new(
                idx,
                Tactic::EntryTransfer,
                conf * 0.85,
                format!("entry transfer via {}", view.hand[idx]),
            ));
        }
    }

    // VOID_ENTRY: lead a suit the partner can ruff to take the lead.
    if mode == GameMode::Hokum && partner.estimated_trumps >= 1 {
        for suit in Suit::ALL {
            if Some(suit) == trump || partner.likely_strong_suits.contains(&suit) {
                continue;
            }
            if !partner.likely_void_suits.contains(&suit) {
                continue;
            }
            if let Some(&idx) = suits[suit.index()].iter().min_by_key(|&&i| strength(i)) {
                return Some(Advice::new(
                    idx,
                    Tactic::VoidEntry,
                    conf * 0.7,
                    format!("partner can ruff {suit} and take the lead"),
                ));
            }
        }
    }

    None
}

/// Cooperative follow override.
pub fn cooperative_follow(view: &BotView, partner: &PartnerRead) -> Option<Advice> {
    if view.legal_indices.is_empty() || partner.confidence < 0.2 {
        return None;
    }
    let mode = view.mode;
    let trump = view.trump_suit;
    let led = view.led_suit()?;
    let points = |i: usize| card_points(view.hand[i], mode, trump);
    let strength = |i: usize| {
        let is_trump = mode == GameMode::Hokum && trump == Some(view.hand[i].suit);
        rank_strength(view.hand[i].rank, mode, is_trump)
    };

    // TRUMP_SUPPORT: partner led trump holding honours; follow low.
    if mode == GameMode::Hokum
        && trump == Some(led)
        && view.table_cards.first().map(|p| p.seat) == Some((view.seat + 2) % 4)
        && partner.has_high_trumps
    {
        let trump_legal: Vec<usize> = view
            .legal_indices
            .iter()
            .copied()
            .filter(|&i| view.hand[i].suit == led)
            .collect();
        if let Some(&idx) = trump_legal.iter().min_by_key(|&&i| strength(i)) {
            return Some(Advice::new(
                idx,
                Tactic::TrumpSupport,
                0.7,
                format!("support the trump draw low with {}", view.hand[idx]),
            ));
        }
    }

    let following = view
        .legal_indices
        .iter()
        .any(|&i| view.hand[i].suit == led);
    if !following {
        // SIGNAL_SHAPE: discard from the shortest suit (a reliable signal),
        // lowest card on ties.
        let suits = view.suits_in_hand();
        let discards: Vec<usize> = view
            .legal_indices
            .iter()
            .copied()
            .filter(|&i| !(mode == GameMode::Hokum && trump == Some(view.hand[i].suit)))
            .collect();
        if let Some(&idx) = discards
            .iter()
            .min_by_key(|&&i| (suits[view.hand[i].suit.index()].len(), points(i)))
        {
            return Some(Advice::new(
                idx,
                Tactic::SignalShape,
                DISCARD_SHORTEST_SUIT_RELIABILITY,
                format!(
                    "signal shape: discard {} from the shortest suit",
                    view.hand[idx]
                ),
            ));
        }

        // SMART_DISCARD: prefer suits the partner is void in too.
        let from_partner_void: Vec<usize> = view
            .legal_indices
            .iter()
            .copied()
            .filter(|&i| partner.likely_void_suits.contains(&view.hand[i].suit))
            .collect();
        if let Some(&idx) = from_partner_void.iter().min_by_key(|&&i| points(i)) {
            return Some(Advice::new(
                idx,
                Tactic::SmartDiscard,
                0.65,
                format!("discard {} (partner void too)", view.hand[idx]),
            ));
        }
    }

    // SACRIFICE: protect the partner's valuable trick with a high card.
    if view.partner_winning() && view.trick_points() >= 15 {
        let beaters: Vec<usize> = view
            .legal_indices
            .iter()
            .copied()
            .filter(|&i| {
                points(i) >= 4 && !partner.likely_strong_suits.contains(&view.hand[i].suit)
            })
            .collect();
        if let Some(&idx) = beaters.iter().max_by_key(|&&i| strength(i)) {
            return Some(Advice::new(
                idx,
                Tactic::Sacrifice,
                0.6,
                format!("sacrifice {} to protect the pot", view.hand[idx]),
            ));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::memory::CardMemory;
    use crate::domain::cards::Card;
    use crate::domain::contract::{Contract, ContractType};
    use crate::domain::state::{MatchScores, Team};

    fn lead_view(hand: &[(Suit, Rank)], mode: GameMode, trump: Option<Suit>) -> BotView {
        let hand: Vec<Card> = hand.iter().map(|&(s, r)| Card::new(s, r)).collect();
        BotView {
            seat: 0,
            legal_indices: (0..hand.len()).collect(),
            table_cards: Vec::new(),
            mode,
            trump_suit: trump,
            contract: Contract {
                contract_type: ContractType::Hokum,
                suit: trump,
                bidder_seat: 0,
                team: Team::Us,
                level: 1,
                variant: None,
                is_ashkal: false,
                round: 1,
            },
            bid_history: Vec::new(),
            round_history: Vec::new(),
            floor_card: None,
            match_scores: MatchScores::default(),
            memory: CardMemory::default(),
            baloot_ready: false,
            hand,
        }
    }

    #[test]
    fn low_confidence_partner_gives_no_override() {
        let view = lead_view(
            &[(Suit::Hearts, Rank::Ace)],
            GameMode::Hokum,
            Some(Suit::Spades),
        );
        let partner = PartnerRead {
            confidence: 0.1,
            ..Default::default()
        };
        assert!(cooperative_lead(&view, &partner).is_none());
    }

    #[test]
    fn draws_trump_for_a_weak_trump_partner() {
        let view = lead_view(
            &[
                (Suit::Spades, Rank::Jack),
                (Suit::Hearts, Rank::Seven),
                (Suit::Clubs, Rank::Eight),
            ],
            GameMode::Hokum,
            Some(Suit::Spades),
        );
        let partner = PartnerRead {
            estimated_trumps: 3,
            has_high_trumps: false,
            confidence: 0.5,
            ..Default::default()
        };
        let advice = cooperative_lead(&view, &partner).unwrap();
        assert_eq!(advice.tactic, Tactic::DrawTrump);
        assert_eq!(view.hand[advice.card_index].rank, Rank::Jack);
    }

    #[test]
    fn feeds_low_into_partner_strength() {
        let view = lead_view(
            &[
                (Suit::Diamonds, Rank::Seven),
                (Suit::Diamonds, Rank::Eight),
                (Suit::Clubs, Rank::King),
            ],
            GameMode::Hokum,
            Some(Suit::Spades),
        );
        let partner = PartnerRead {
            likely_strong_suits: vec![Suit::Diamonds],
            confidence: 0.5,
            ..Default::default()
        };
        let advice = cooperative_lead(&view, &partner).unwrap();
        // Two diamonds only, so FEED_STRONG (not SETUP_RUN) fires low.
        assert_eq!(advice.tactic, Tactic::FeedStrong);
        assert_eq!(view.hand[advice.card_index].rank, Rank::Seven);
    }
}
