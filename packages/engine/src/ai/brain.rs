//! The "Brain": priority-weighted fusion of every strategy module into one
//! play, clamped to the legal set and filtered by personality.
//!
//! Cascade order on a lead: kaboot pursuit, trump plan, opponent model,
//! defense plan, partner signal, cooperative override, then the default
//! lead selector. On a follow: point density, cooperative override, then
//! the follow optimizer. The first opinion whose confidence clears the
//! dynamic threshold wins; agreement from a second module adds +0.1. The
//! endgame solver preempts the cascade entirely once every seat is down to
//! four cards.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::ai::advice::{Advice, Tactic};
use crate::ai::bid_reader::infer_from_bids;
use crate::ai::cooperative::{cooperative_follow, cooperative_lead};
use crate::ai::follow_optimizer::optimize_follow;
use crate::ai::galoss::{emergency_action, galoss_check};
use crate::ai::lead_selector::{select_lead, DefensePlan};
use crate::ai::opponent_model::model_opponents;
use crate::ai::partner_read::read_partner;
use crate::ai::personality::{apply_to_play, PersonalityProfile};
use crate::ai::point_density::evaluate_trick_value;
use crate::ai::point_density::Density;
use crate::ai::sherlock::scan_for_crimes;
use crate::ai::solver::{endgame_reached, solve_endgame};
use crate::ai::trait_def::{AiError, BidDecision, BotPlayer};
use crate::ai::trick_review::{review_tricks, Momentum, StrategyShift};
use crate::ai::trump_manager::{manage_trumps, TrumpAction};
use crate::ai::view::{BidView, BotView};
use crate::domain::bidding::{BidAction, BidPhase};
use crate::domain::cards::{card_points, rank_strength, GameMode, Rank, Suit};
use crate::domain::rules::is_kawesh_hand;
use crate::domain::state::{partner_of, Seat};

pub struct BrainBot {
    personality: PersonalityProfile,
    rng: Mutex<StdRng>,
}

impl BrainBot {
    pub const NAME: &'static str = "brain";

    pub fn new(seed: Option<u64>) -> Self {
        Self::with_personality(PersonalityProfile::balanced(), seed)
    }

    pub fn with_personality(personality: PersonalityProfile, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        Self {
            personality,
            rng: Mutex::new(rng),
        }
    }

    // ── Hand evaluation for the auction ──────────────────────────────

    fn hokum_quality(hand: &[Rank], side_aces: usize) -> f32 {
        let mut quality = 0.0;
        for &rank in hand {
            quality += match rank {
                Rank::Jack => 2.0,
                Rank::Nine => 1.5,
                Rank::Ace => 1.0,
                Rank::Ten => 0.8,
                Rank::King => 0.5,
                Rank::Queen => 0.4,
                _ => 0.3,
            };
        }
        quality + side_aces as f32 * 0.4
    }

    fn sun_quality(view: &BidView) -> f32 {
        let aces = view.hand.iter().filter(|c| c.rank == Rank::Ace).count() as f32;
        let tens = view.hand.iter().filter(|c| c.rank == Rank::Ten).count() as f32;
        let kings = view.hand.iter().filter(|c| c.rank == Rank::King).count() as f32;
        aces + tens * 0.6 + kings * 0.3
    }

    fn hokum_candidate(&self, view: &BidView) -> (Suit, f32) {
        let floor_suit = view.floor_card.suit;
        let evaluate = |suit: Suit| {
            let in_suit: Vec<Rank> = view
                .hand
                .iter()
                .filter(|c| c.suit == suit)
                .map(|c| c.rank)
                .collect();
            let side_aces = view
                .hand
                .iter()
                .filter(|c| c.suit != suit && c.rank == Rank::Ace)
                .count();
            if in_suit.is_empty() {
                0.0
            } else {
                Self::hokum_quality(&in_suit, side_aces)
            }
        };
        match view.phase {
            BidPhase::RoundTwo => Suit::ALL
                .into_iter()
                .filter(|&s| s != floor_suit)
                .map(|s| (s, evaluate(s)))
                .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
                .unwrap_or((floor_suit, 0.0)),
            _ => (floor_suit, evaluate(floor_suit)),
        }
    }

    fn auction_decision(&self, view: &BidView) -> BidDecision {
        if is_kawesh_hand(&view.hand) {
            return BidDecision {
                action: BidAction::Kawesh,
                suit: None,
            };
        }

        let (hokum_suit, hokum_eval) = self.hokum_candidate(view);
        let sun_eval = Self::sun_quality(view);
        let p = &self.personality;

        let mut hokum_threshold = 3.4 - p.hokum_bias;
        let mut sun_threshold = 3.0 - p.sun_bias * 0.8;
        if p.can_gamble {
            hokum_threshold -= 0.2;
            sun_threshold -= 0.2;
        }

        // Inside a Gablak window only a SUN hijack (or a waive) makes sense.
        if view.phase == BidPhase::GablakWindow {
            if sun_eval >= sun_threshold + (1.0 - p.risk_tolerance) * 0.5 {
                return BidDecision {
                    action: BidAction::Sun,
                    suit: None,
                };
            }
            return BidDecision::pass();
        }

        if sun_eval >= sun_threshold && sun_eval >= hokum_eval * 0.8 {
            return BidDecision {
                action: BidAction::Sun,
                suit: None,
            };
        }
        if hokum_eval >= hokum_threshold {
            return BidDecision {
                action: BidAction::Hokum,
                suit: Some(hokum_suit),
            };
        }
        // A weak hand in an eligible seat hands the buy to the partner.
        if view.ashkal_eligible()
            && view.floor_card.rank != Rank::Ace
            && view.phase == BidPhase::RoundOne
            && sun_eval < 1.0
            && hokum_eval < 1.8
            && p.partner_trust >= 0.5
        {
            return BidDecision {
                action: BidAction::Ashkal,
                suit: None,
            };
        }
        BidDecision::pass()
    }

    fn doubling_decision(&self, view: &BidView) -> BidDecision {
        let p = &self.personality;
        if let Some(contract) = &view.contract {
            if !view.on_buying_team()
                && contract.level == 1
                && p.can_gamble
                && p.risk_tolerance > 0.6
                && Self::sun_quality(view) >= 2.5
            {
                // The engine rejects firewalled SUN doubles; the coordinator
                // degrades that to a pass.
                return BidDecision {
                    action: BidAction::Double,
                    suit: None,
                };
            }
        }
        BidDecision::pass()
    }

    fn variant_decision(&self, view: &BidView) -> BidDecision {
        let action = if view.is_buyer() && self.personality.risk_tolerance >= 0.5 {
            BidAction::Open
        } else {
            BidAction::Closed
        };
        BidDecision { action, suit: None }
    }

    // ── Play cascade ─────────────────────────────────────────────────

    fn dynamic_threshold(shift: StrategyShift, momentum: Momentum) -> f32 {
        match shift {
            StrategyShift::Aggressive => 0.4,
            StrategyShift::DamageControl => 0.6,
            StrategyShift::Conservative => 0.55,
            StrategyShift::None => {
                if momentum == Momentum::Collapsing {
                    0.6
                } else {
                    0.5
                }
            }
        }
    }

    fn lead_opinions(&self, view: &BotView) -> (Vec<Advice>, Advice) {
        let mode = view.mode;
        let trump = view.trump_suit;
        let strength = |i: usize| {
            let is_trump = mode == GameMode::Hokum && trump == Some(view.hand[i].suit);
            rank_strength(view.hand[i].rank, mode, is_trump)
        };
        let mut opinions: Vec<Advice> = Vec::new();

        let partner = read_partner(
            partner_of(view.seat),
            &view.bid_history,
            &view.round_history,
            mode,
            trump,
        );
        let opponents = model_opponents(
            view.seat,
            &view.bid_history,
            &view.round_history,
            mode,
            trump,
        );
        let bids = infer_from_bids(view.seat, &view.bid_history, view.floor_card, 1);

        // 1. Kaboot pursuit: sweeping buyers keep the pedal down.
        let played = view.tricks_played();
        if view.we_are_buyers() && played > 0 && view.tricks_won_by(view.my_team()) == played {
            let masters = view.master_indices();
            if let Some(&idx) = masters.first() {
                opinions.push(Advice::new(
                    idx,
                    Tactic::KabootPursuit,
                    0.9,
                    format!("kaboot: cash the master {}", view.hand[idx]),
                ));
            } else if let Some(&idx) = view.legal_indices.iter().max_by_key(|&&i| strength(i)) {
                opinions.push(Advice::new(
                    idx,
                    Tactic::KabootPursuit,
                    0.6,
                    format!("kaboot: no master, lead {}", view.hand[idx]),
                ));
            }
        }

        // 3. Trump manager plan (HOKUM leads).
        let mut trump_plan = None;
        if mode == GameMode::Hokum {
            if let Some(trump_suit) = trump {
                let enemy_estimate = {
                    let known: u8 = opponents.opponents.iter().map(|o| o.estimated_trumps).sum();
                    let my_trumps =
                        view.hand.iter().filter(|c| c.suit == trump_suit).count() as u8;
                    8u8.saturating_sub(my_trumps)
                        .saturating_sub(partner.estimated_trumps)
                        .max(known)
                };
                let partner_voids = partner.likely_void_suits.clone();
                let enemy_voids = opponents.avoid_lead_suits.clone();
                let plan = manage_trumps(
                    &view.hand,
                    trump_suit,
                    enemy_estimate,
                    partner.estimated_trumps,
                    played,
                    view.we_are_buyers(),
                    &partner_voids,
                    &enemy_voids,
                );
                if plan.action == TrumpAction::Draw || plan.lead_trump {
                    let trumps: Vec<usize> = view
                        .legal_indices
                        .iter()
                        .copied()
                        .filter(|&i| view.hand[i].suit == trump_suit)
                        .collect();
                    if let Some(&idx) = trumps.iter().max_by_key(|&&i| strength(i)) {
                        opinions.push(Advice::new(
                            idx,
                            Tactic::TrumpDraw,
                            0.8,
                            plan.reasoning.clone(),
                        ));
                    }
                }
                trump_plan = Some(plan);
            }
        }

        // 4. Opponent model: safe leads scale with danger.
        if !opponents.safe_lead_suits.is_empty() {
            let safe: Vec<usize> = view
                .legal_indices
                .iter()
                .copied()
                .filter(|&i| {
                    opponents.safe_lead_suits.contains(&view.hand[i].suit)
                        && trump != Some(view.hand[i].suit)
                })
                .collect();
            if let Some(&idx) = safe.iter().max_by_key(|&&i| {
                (card_points(view.hand[i], mode, trump), strength(i))
            }) {
                let conf = (0.45 + opponents.combined_danger * 0.4).min(0.85);
                opinions.push(Advice::new(
                    idx,
                    Tactic::SafeLead,
                    conf,
                    format!(
                        "opponent danger {:.0}%, safe lead {}",
                        opponents.combined_danger * 100.0,
                        view.hand[idx]
                    ),
                ));
            }
        }

        // 5. Defense plan: defenders attack the declarer's weak suits.
        let defense = DefensePlan {
            priority_suits: bids.target_suits.clone(),
            avoid_suits: bids.avoid_suits.clone(),
        };
        if !view.we_are_buyers() {
            let live: Vec<usize> = view
                .legal_indices
                .iter()
                .copied()
                .filter(|&i| {
                    let s = view.hand[i].suit;
                    trump != Some(s)
                        && !opponents.avoid_lead_suits.contains(&s)
                        && !defense.avoid_suits.contains(&s)
                })
                .collect();
            if let Some(&idx) = live.iter().max_by_key(|&&i| {
                (card_points(view.hand[i], mode, trump), strength(i))
            }) {
                opinions.push(Advice::new(
                    idx,
                    Tactic::DefensePriority,
                    0.55,
                    format!("defend: lead {}", view.hand[idx]),
                ));
            }
        }

        // 6. Partner signal: lead into their inferred strength.
        if partner.confidence >= 0.3 {
            if let Some(&suit) = partner.likely_strong_suits.first() {
                let cands: Vec<usize> = view
                    .legal_indices
                    .iter()
                    .copied()
                    .filter(|&i| view.hand[i].suit == suit)
                    .collect();
                if let Some(&idx) = cands.first() {
                    opinions.push(Advice::new(
                        idx,
                        Tactic::PartnerFeed,
                        (partner.confidence * 0.8).min(1.0),
                        format!("partner strong in {suit}"),
                    ));
                }
            }
        }

        // Cooperative override slots in just above the default.
        if let Some(advice) = cooperative_lead(view, &partner) {
            opinions.push(advice);
        }

        // 7. Default heuristic lead.
        let default = select_lead(view, Some(&partner), Some(&defense), trump_plan.as_ref());
        (opinions, default)
    }

    fn follow_opinions(&self, view: &BotView) -> (Vec<Advice>, Advice) {
        let mode = view.mode;
        let trump = view.trump_suit;
        let strength = |i: usize| {
            let is_trump = mode == GameMode::Hokum && trump == Some(view.hand[i].suit);
            rank_strength(view.hand[i].rank, mode, is_trump)
        };
        let mut opinions: Vec<Advice> = Vec::new();

        // 2. Point density: fight or shed on crowded tricks.
        let value = evaluate_trick_value(&view.table_cards, mode, trump);
        let partner_winning = view.partner_winning();
        match value.density {
            Density::Critical => {
                if let Some(&idx) = view.legal_indices.iter().max_by_key(|&&i| strength(i)) {
                    opinions.push(Advice::new(
                        idx,
                        Tactic::PointDensity,
                        0.85,
                        format!("{} abnat critical, fight", value.current_points),
                    ));
                }
            }
            Density::High if !partner_winning => {
                if let Some(&idx) = view.legal_indices.iter().max_by_key(|&&i| strength(i)) {
                    opinions.push(Advice::new(
                        idx,
                        Tactic::PointDensity,
                        0.7,
                        format!("{} abnat on the table, fight", value.current_points),
                    ));
                }
            }
            _ if partner_winning && value.current_points < 16 => {
                if let Some(&idx) = view
                    .legal_indices
                    .iter()
                    .min_by_key(|&&i| card_points(view.hand[i], mode, trump))
                {
                    opinions.push(Advice::new(
                        idx,
                        Tactic::PointDensity,
                        0.6,
                        "partner winning a thin trick, shed".to_string(),
                    ));
                }
            }
            _ => {}
        }

        let partner = read_partner(
            partner_of(view.seat),
            &view.bid_history,
            &view.round_history,
            mode,
            trump,
        );
        if let Some(advice) = cooperative_follow(view, &partner) {
            opinions.push(advice);
        }

        let default = optimize_follow(view);
        (opinions, default)
    }

    fn decide(&self, view: &BotView) -> Advice {
        // Endgame: the solver preempts the cascade.
        if endgame_reached(view) {
            let seed = self
                .rng
                .lock()
                .map(|mut rng| rng.random::<u64>())
                .unwrap_or(0);
            if let Some(advice) = solve_endgame(view, seed) {
                return advice;
            }
        }

        let review = review_tricks(
            view.seat,
            &view.round_history,
            view.mode,
            view.trump_suit,
            view.we_are_buyers(),
        );
        let threshold = Self::dynamic_threshold(review.strategy_shift, review.momentum);

        // Emergency overrides outrank the whole cascade.
        let galoss = galoss_check(view);
        if let Some(advice) = emergency_action(view, &galoss) {
            if advice.confidence >= threshold {
                return advice;
            }
        }

        let (opinions, default) = if view.leading() {
            self.lead_opinions(view)
        } else {
            self.follow_opinions(view)
        };

        let mut winner = opinions
            .iter()
            .find(|a| a.confidence >= threshold)
            .cloned()
            .unwrap_or(default);

        // Agreement boost: a second module on the same index adds +0.1.
        let agreers = opinions
            .iter()
            .filter(|a| a.card_index == winner.card_index && a.tactic != winner.tactic)
            .count();
        if agreers > 0 {
            winner.confidence = (winner.confidence + 0.1).min(1.0);
        }
        debug!(
            seat = view.seat,
            tactic = %winner.tactic,
            confidence = winner.confidence,
            threshold,
            "brain decision"
        );
        winner
    }
}

impl BotPlayer for BrainBot {
    fn choose_bid(&self, view: &BidView) -> Result<BidDecision, AiError> {
        let decision = match view.phase {
            BidPhase::RoundOne | BidPhase::RoundTwo | BidPhase::GablakWindow => {
                self.auction_decision(view)
            }
            BidPhase::Doubling => self.doubling_decision(view),
            BidPhase::VariantSelection => self.variant_decision(view),
            BidPhase::Finished => BidDecision::pass(),
        };
        Ok(decision)
    }

    fn choose_play(&self, view: &BotView) -> Result<usize, AiError> {
        if view.legal_indices.is_empty() {
            return Err(AiError::NoLegalMove);
        }
        if view.legal_indices.len() == 1 {
            return Ok(view.legal_indices[0]);
        }
        let advice = self.decide(view);

        // Personality filter, then the hard legality clamp.
        let mut chosen = advice.card_index;
        if let Ok(mut rng) = self.rng.lock() {
            chosen = apply_to_play(&self.personality, view, chosen, &mut rng);
        }
        if !view.legal_indices.contains(&chosen) {
            // Fall back to the best legal card by value: highest when
            // sweeping, cheapest shed otherwise.
            let kaboot = view.we_are_buyers()
                && view.tricks_played() > 0
                && view.tricks_won_by(view.my_team()) == view.tricks_played();
            chosen = if kaboot {
                view.legal_indices
                    .iter()
                    .copied()
                    .max_by_key(|&i| {
                        let is_trump = view.mode == GameMode::Hokum
                            && view.trump_suit == Some(view.hand[i].suit);
                        rank_strength(view.hand[i].rank, view.mode, is_trump)
                    })
                    .unwrap_or(view.legal_indices[0])
            } else {
                view.legal_indices
                    .iter()
                    .copied()
                    .min_by_key(|&i| card_points(view.hand[i], view.mode, view.trump_suit))
                    .unwrap_or(view.legal_indices[0])
            };
        }
        Ok(chosen)
    }

    fn consider_qayd(&self, view: &BotView) -> Option<Seat> {
        scan_for_crimes(view)
    }
}
