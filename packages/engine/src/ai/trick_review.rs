//! Trick review: momentum and strategy-shift detection over the completed
//! tricks. The brain shifts its confidence threshold on this output.

use crate::domain::cards::{GameMode, Suit};
use crate::domain::state::{team_of, CompletedTrick, Seat, Team};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Momentum {
    Winning,
    Tied,
    Losing,
    Collapsing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyShift {
    None,
    Conservative,
    Aggressive,
    DamageControl,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrickReview {
    pub our_tricks: usize,
    pub their_tricks: usize,
    pub momentum: Momentum,
    pub points_won_by_us: u16,
    pub points_won_by_them: u16,
    pub strategy_shift: StrategyShift,
    /// Suits that got trumped or keep losing when we lead them.
    pub avoid_suits: Vec<Suit>,
    pub strong_suits: Vec<Suit>,
}

pub fn review_tricks(
    me: Seat,
    trick_history: &[CompletedTrick],
    mode: GameMode,
    trump: Option<Suit>,
    we_are_buyers: bool,
) -> TrickReview {
    let my_team = team_of(me);
    let mut our_tricks = 0usize;
    let mut their_tricks = 0usize;
    let mut our_points = 0u16;
    let mut their_points = 0u16;
    let mut last_winners: Vec<Team> = Vec::new();
    // Per-suit: (led, won, got_trumped)
    let mut suit_results = [(0usize, 0usize, false); 4];

    for trick in trick_history {
        let Some(led) = trick.led_suit() else { continue };
        let winner_team = team_of(trick.winner);
        if winner_team == my_team {
            our_tricks += 1;
            our_points += trick.points;
        } else {
            their_tricks += 1;
            their_points += trick.points;
        }
        last_winners.push(winner_team);

        let entry = &mut suit_results[led.index()];
        entry.0 += 1;
        if winner_team == my_team {
            entry.1 += 1;
        }
        if mode == GameMode::Hokum {
            if let Some(trump) = trump {
                let enemy_trumped = trick.plays.iter().any(|p| {
                    p.card.suit == trump && led != trump && team_of(p.seat) != my_team
                });
                if enemy_trumped {
                    entry.2 = true;
                }
            }
        }
    }

    let momentum = match last_winners.last() {
        None => Momentum::Tied,
        Some(&last) => {
            if our_tricks > their_tricks && last == my_team {
                Momentum::Winning
            } else if their_tricks > our_tricks && last != my_team {
                let prev_lost = last_winners
                    .len()
                    .checked_sub(2)
                    .map(|i| last_winners[i] != my_team)
                    .unwrap_or(false);
                if prev_lost {
                    Momentum::Collapsing
                } else {
                    Momentum::Losing
                }
            } else {
                Momentum::Tied
            }
        }
    };

    let played = our_tricks + their_tricks;
    let diff = our_tricks as i32 - their_tricks as i32;
    let strategy_shift = if played >= 4 && diff <= -2 {
        StrategyShift::DamageControl
    } else if diff >= 2 && we_are_buyers {
        StrategyShift::Conservative
    } else if diff < 0 && we_are_buyers {
        StrategyShift::Aggressive
    } else {
        StrategyShift::None
    };

    let avoid_suits = Suit::ALL
        .into_iter()
        .filter(|&s| {
            let (led, won, trumped) = suit_results[s.index()];
            trumped || (led > 0 && (won as f32 / led as f32) < 0.3)
        })
        .collect();
    let strong_suits = Suit::ALL
        .into_iter()
        .filter(|&s| {
            let (led, won, _) = suit_results[s.index()];
            led > 0 && (won as f32 / led as f32) >= 0.7
        })
        .collect();

    TrickReview {
        our_tricks,
        their_tricks,
        momentum,
        points_won_by_us: our_points,
        points_won_by_them: their_points,
        strategy_shift,
        avoid_suits,
        strong_suits,
    }
}
