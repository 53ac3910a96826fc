//! Follow-suit optimisation: the tactic cascade for seats 2-4 of a trick.
//!
//! Covers feeding a winning partner, second-hand-low discipline, cheap and
//! big wins, over-trumping, ruffing thresholds and safe shedding. The
//! thresholds are the pro-calibrated values in [`crate::ai::calibration`].

use crate::ai::advice::{Advice, Tactic};
use crate::ai::calibration::{FEED_HIGH_SEAT4, SEAT4_TRUMP_IN_THRESHOLD, WIN_BIG_THRESHOLD};
use crate::ai::view::BotView;
use crate::domain::cards::{card_points, rank_strength, GameMode, Suit};
use crate::domain::rules::current_winner;

pub fn optimize_follow(view: &BotView) -> Advice {
    let hand = &view.hand;
    let legal = &view.legal_indices;
    if legal.is_empty() {
        return Advice::new(0, Tactic::ShedSafe, 0.0, "no legal cards");
    }
    if legal.len() == 1 {
        return Advice::new(
            legal[0],
            Tactic::ShedSafe,
            1.0,
            format!("only legal card: {}", hand[legal[0]]),
        );
    }

    let mode = view.mode;
    let trump = view.trump_suit;
    let Some(led) = view.led_suit() else {
        return Advice::new(legal[0], Tactic::ShedSafe, 0.0, "not following");
    };
    let seat_pos = view.trick_position(); // 2..=4 when following
    let trick_points = view.trick_points();
    let partner_winning = view.partner_winning();
    let points = |i: usize| card_points(hand[i], mode, trump);
    let strength = |i: usize| {
        let is_trump = mode == GameMode::Hokum && trump == Some(hand[i].suit);
        rank_strength(hand[i].rank, mode, is_trump)
    };

    let winner = current_winner(&view.table_cards, mode, trump).map(|(_, p)| p);
    let winner_is_trump = winner
        .map(|w| mode == GameMode::Hokum && trump == Some(w.card.suit))
        .unwrap_or(false);

    let same_suit: Vec<usize> = legal
        .iter()
        .copied()
        .filter(|&i| hand[i].suit == led)
        .collect();
    let off_suit: Vec<usize> = legal
        .iter()
        .copied()
        .filter(|&i| hand[i].suit != led)
        .collect();

    // Cards that beat the current winner if played now.
    let beats_winner = |i: usize| -> bool {
        let Some(w) = winner else { return true };
        let my_trump = mode == GameMode::Hokum && trump == Some(hand[i].suit);
        let w_trump = mode == GameMode::Hokum && trump == Some(w.card.suit);
        match (my_trump, w_trump) {
            (true, false) => true,
            (false, true) => false,
            (true, true) => strength(i) > rank_strength(w.card.rank, mode, true),
            (false, false) => {
                hand[i].suit == led
                    && (w.card.suit != led
                        || strength(i) > rank_strength(w.card.rank, mode, false))
            }
        }
    };

    // ──────────────── Following suit ────────────────
    if !same_suit.is_empty() {
        let beaters: Vec<usize> = same_suit
            .iter()
            .copied()
            .filter(|&i| beats_winner(i))
            .collect();
        let lowest = same_suit
            .iter()
            .copied()
            .min_by_key(|&i| strength(i))
            .unwrap_or(same_suit[0]);

        if partner_winning {
            // Feed fat cards into the partner's trick, else dodge low.
            let big: Vec<usize> = same_suit
                .iter()
                .copied()
                .filter(|&i| points(i) >= 10)
                .collect();
            if let Some(&idx) = big.iter().max_by_key(|&&i| points(i)) {
                let conf = if seat_pos == 4 { 0.88 } else { 0.82 };
                return Advice::new(
                    idx,
                    Tactic::FeedPartner,
                    conf,
                    format!("feed {} ({} abnat) to partner", hand[idx], points(idx)),
                );
            }
            let mid: Vec<usize> = same_suit
                .iter()
                .copied()
                .filter(|&i| points(i) >= 3)
                .collect();
            if trick_points >= 5 {
                if let Some(&idx) = mid.iter().max_by_key(|&&i| points(i)) {
                    let conf = if seat_pos == 4 { 0.78 } else { 0.70 };
                    return Advice::new(
                        idx,
                        Tactic::FeedPartner,
                        conf,
                        format!("feed {} to partner's trick", hand[idx]),
                    );
                }
            }
            return Advice::new(
                lowest,
                Tactic::Dodge,
                0.85,
                format!("partner winning, dodge with {}", hand[lowest]),
            );
        }

        // Second-hand-low discipline, master exception on valuable tricks.
        if seat_pos == 2 && !beaters.is_empty() {
            let masters: Vec<usize> = beaters
                .iter()
                .copied()
                .filter(|&i| strength(i) == 7)
                .collect();
            if !masters.is_empty() && trick_points >= 10 {
                let idx = masters
                    .into_iter()
                    .min_by_key(|&i| strength(i))
                    .unwrap_or(beaters[0]);
                return Advice::new(
                    idx,
                    Tactic::SecondHandHigh,
                    0.75,
                    format!("second seat takes {trick_points} abnat with {}", hand[idx]),
                );
            }
            if trick_points < 10 {
                let conf = if view.tricks_remaining() >= 6 { 0.75 } else { 0.65 };
                return Advice::new(
                    lowest,
                    Tactic::SecondHandLow,
                    conf,
                    format!("second hand low: {}", hand[lowest]),
                );
            }
        }

        if !beaters.is_empty() {
            let cheapest = beaters
                .iter()
                .copied()
                .min_by_key(|&i| strength(i))
                .unwrap_or(beaters[0]);

            if trick_points >= WIN_BIG_THRESHOLD {
                return Advice::new(
                    cheapest,
                    Tactic::WinBig,
                    0.88,
                    format!("{} abnat on the table, take it with {}", trick_points, hand[cheapest]),
                );
            }
            if seat_pos == 4 && trick_points >= 10 {
                let conf = if view.tricks_remaining() <= 3 { 0.78 } else { 0.72 };
                return Advice::new(
                    cheapest,
                    Tactic::Desperation,
                    conf,
                    format!("fourth seat must win {trick_points} abnat"),
                );
            }
            if seat_pos == 4 {
                return Advice::new(
                    cheapest,
                    Tactic::WinCheap,
                    0.9,
                    format!("fourth seat guaranteed win with {}", hand[cheapest]),
                );
            }
            // Third seat wins cheap only with a top card.
            if seat_pos == 3 && strength(cheapest) >= 5 {
                return Advice::new(
                    cheapest,
                    Tactic::WinCheap,
                    0.65,
                    format!("{} likely holds", hand[cheapest]),
                );
            }
        }

        return Advice::new(
            lowest,
            Tactic::ShedSafe,
            0.6,
            format!("cannot beat the winner, shed {}", hand[lowest]),
        );
    }

    // ──────────────── Void in the led suit ────────────────
    let trumps: Vec<usize> = off_suit
        .iter()
        .copied()
        .filter(|&i| trump == Some(hand[i].suit))
        .collect();
    let non_trump: Vec<usize> = off_suit
        .iter()
        .copied()
        .filter(|&i| trump != Some(hand[i].suit))
        .collect();

    if partner_winning {
        let pool = if non_trump.is_empty() { &off_suit } else { &non_trump };
        let feedable: Vec<usize> = pool.iter().copied().filter(|&i| points(i) >= 4).collect();
        if let Some(&idx) = feedable.iter().max_by_key(|&&i| points(i)) {
            let conf = if seat_pos == 4 { FEED_HIGH_SEAT4 + 0.3 } else { 0.75 };
            return Advice::new(
                idx,
                Tactic::FeedOffsuit,
                conf,
                format!("feed {} off-suit to partner", hand[idx]),
            );
        }
        let idx = pool
            .iter()
            .copied()
            .min_by_key(|&i| points(i))
            .unwrap_or(off_suit[0]);
        return Advice::new(
            idx,
            Tactic::Dodge,
            0.8,
            format!("partner winning, discard {}", hand[idx]),
        );
    }

    if mode == GameMode::Hokum && !trumps.is_empty() {
        // Opponent already trumped: over-trump if the duty allows.
        if winner_is_trump {
            let over: Vec<usize> = trumps
                .iter()
                .copied()
                .filter(|&i| beats_winner(i))
                .collect();
            if let Some(&idx) = over.iter().min_by_key(|&&i| strength(i)) {
                return Advice::new(
                    idx,
                    Tactic::TrumpOver,
                    0.7,
                    format!("over-trump with {}", hand[idx]),
                );
            }
        }

        // Ruff only for pots worth it; seat 4 relaxes the threshold.
        let threshold = if seat_pos == 4 {
            SEAT4_TRUMP_IN_THRESHOLD
        } else {
            WIN_BIG_THRESHOLD
        };
        if trick_points >= threshold && !winner_is_trump {
            let idx = trumps
                .iter()
                .copied()
                .min_by_key(|&i| strength(i))
                .unwrap_or(trumps[0]);
            let conf = if trick_points >= WIN_BIG_THRESHOLD { 0.78 } else { 0.65 };
            return Advice::new(
                idx,
                Tactic::TrumpIn,
                conf,
                format!("ruff a {trick_points}-abnat trick with {}", hand[idx]),
            );
        }

        if !non_trump.is_empty() {
            let idx = non_trump
                .iter()
                .copied()
                .min_by_key(|&i| points(i))
                .unwrap_or(non_trump[0]);
            return Advice::new(
                idx,
                Tactic::ShedSafe,
                0.6,
                format!("save trump ({trick_points} abnat), shed {}", hand[idx]),
            );
        }
    }

    // Shed the cheapest card; prefer shortening suits and dead suits.
    let pool = if non_trump.is_empty() { &off_suit } else { &non_trump };
    let suits = view.suits_in_hand();
    let probs = view.memory.suit_probabilities(view.seat, hand);
    let shed_key = |i: usize| {
        let s = hand[i].suit;
        let opp_hold: f64 = (0..4u8)
            .filter(|&seat| seat != view.seat && seat != (view.seat + 2) % 4)
            .map(|seat| probs[seat as usize][s.index()])
            .sum::<f64>()
            / 2.0;
        (
            suits[s.index()].len(),
            (opp_hold * 100.0) as i64,
            points(i),
            strength(i),
        )
    };
    let idx = pool
        .iter()
        .copied()
        .min_by_key(|&i| shed_key(i))
        .unwrap_or(legal[0]);
    Advice::new(
        idx,
        Tactic::ShedSafe,
        0.5,
        format!("void, discard {}", hand[idx]),
    )
}
