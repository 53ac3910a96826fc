//! Point density: how many abnat are at stake on the table right now, and
//! whether committing a high card is worth it. Stops the bot wasting aces
//! on empty tricks and makes it fight for the critical pots.

use crate::ai::calibration::{DENSITY_CRITICAL, DENSITY_HIGH, DENSITY_MEDIUM};
use crate::domain::cards::{card_points, GameMode, Rank, Suit};
use crate::domain::state::TablePlay;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Density {
    Empty,
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrickValue {
    pub current_points: u16,
    pub density: Density,
    pub worth_fighting: bool,
    pub point_cards_on_table: usize,
}

pub fn evaluate_trick_value(
    table: &[TablePlay],
    mode: GameMode,
    trump: Option<Suit>,
) -> TrickValue {
    let mut total = 0u16;
    let mut point_cards = 0usize;
    for play in table {
        let p = card_points(play.card, mode, trump);
        total += p;
        if p > 0 {
            point_cards += 1;
        }
    }
    let density = classify(total);
    TrickValue {
        current_points: total,
        density,
        worth_fighting: matches!(density, Density::Medium | Density::High | Density::Critical),
        point_cards_on_table: point_cards,
    }
}

fn classify(points: u16) -> Density {
    if points >= DENSITY_CRITICAL {
        Density::Critical
    } else if points >= DENSITY_HIGH {
        Density::High
    } else if points >= DENSITY_MEDIUM {
        Density::Medium
    } else if points >= 6 {
        Density::Low
    } else {
        Density::Empty
    }
}

/// Should a high card be committed to this trick?
pub fn should_play_high(
    table: &[TablePlay],
    my_rank: Rank,
    mode: GameMode,
    trump: Option<Suit>,
    partner_is_winning: bool,
    cards_remaining: usize,
) -> bool {
    let value = evaluate_trick_value(table, mode, trump);

    // Partner already has it and the pot is modest: hold.
    if partner_is_winning && !matches!(value.density, Density::High | Density::Critical) {
        return false;
    }
    if value.density == Density::Critical {
        return true;
    }
    // Endgame: every point matters.
    if cards_remaining <= 2 {
        return true;
    }
    // Empty trick and a premium card: do not waste it.
    if value.density == Density::Empty && matches!(my_rank, Rank::Ace | Rank::Ten) {
        return false;
    }
    if value.density == Density::High
        && matches!(my_rank, Rank::Ace | Rank::Ten | Rank::King | Rank::Jack)
    {
        return true;
    }
    value.worth_fighting && !partner_is_winning
}
