//! The detective: scans the table and the round record for provable
//! violations and decides whether to raise a Qayd.
//!
//! Two sources of evidence exist from a bot's seat: plays the engine tagged
//! illegal in permissive mode, and record contradictions (a seat that showed
//! void in a suit later following it). Team loyalty is absolute — a bot
//! never accuses its own partner.

use tracing::info;

use crate::ai::memory::CardMemory;
use crate::ai::view::BotView;
use crate::domain::state::{partner_of, Seat};

/// Return the seat to accuse, if the view contains a provable crime by an
/// opponent.
pub fn scan_for_crimes(view: &BotView) -> Option<Seat> {
    let me = view.seat;
    let partner = partner_of(me);
    let is_accusable = |seat: Seat| seat != me && seat != partner;

    // Flagged plays on the open table.
    for play in &view.table_cards {
        if play.is_illegal && is_accusable(play.seat) {
            info!(offender = play.seat, "detective: flagged play on the table");
            return Some(play.seat);
        }
    }

    // Flagged plays in the record.
    for trick in &view.round_history {
        for play in &trick.plays {
            if play.is_illegal && is_accusable(play.seat) {
                info!(offender = play.seat, "detective: flagged play in history");
                return Some(play.seat);
            }
        }
    }

    // Contradictions: replay the record and watch for a seat following a
    // suit it previously renounced.
    let mut memory = CardMemory::default();
    let mut check = |seat: Seat, card, led| -> bool {
        let contradiction = memory.check_contradiction(seat, card).is_some();
        memory.observe_play(seat, card, led);
        contradiction && is_accusable(seat)
    };
    for trick in &view.round_history {
        let led = trick.led_suit();
        for play in &trick.plays {
            if check(play.seat, play.card, led) {
                info!(offender = play.seat, "detective: record contradiction");
                return Some(play.seat);
            }
        }
    }
    let led = view.table_cards.first().map(|p| p.card.suit);
    for play in &view.table_cards {
        if check(play.seat, play.card, led) {
            info!(offender = play.seat, "detective: live contradiction");
            return Some(play.seat);
        }
    }

    None
}
