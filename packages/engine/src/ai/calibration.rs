//! Calibration constants mined from professional game records.
//!
//! Thresholds and signal reliabilities shared by the tactical modules.
//! Values come from an analysis of 109 pro games (12,693 follow plays);
//! the modules reference these instead of hard-coding magic numbers.

/// How often a discard comes from the player's shortest suit.
pub const DISCARD_SHORTEST_SUIT_RELIABILITY: f32 = 0.785;

/// A high discard (A/10/K) while the partner is winning means feeding.
pub const DISCARD_HIGH_PARTNER_WINNING: f32 = 0.414;

/// Seat 4 feeds high noticeably more often.
pub const FEED_HIGH_SEAT4: f32 = 0.518;

/// Share of early-trick seat-2 plays that are the lowest legal card.
pub const SECOND_HAND_LOW_EARLY: f32 = 0.427;

/// Pros ruff only about a quarter of their void opportunities.
pub const TRUMP_IN_WHEN_VOID: f32 = 0.268;

/// Share of pro HOKUM leads that are trumps.
pub const HOKUM_TRUMP_LEAD_PCT: f32 = 0.272;

/// Point-density brackets (abnat on the table).
pub const DENSITY_MEDIUM: u16 = 15;
/// Raised from 16 after calibration against pro fight/fold decisions.
pub const DENSITY_HIGH: u16 = 18;
pub const DENSITY_CRITICAL: u16 = 26;

/// Trick value at which a follow fights regardless of seat.
pub const WIN_BIG_THRESHOLD: u16 = 15;
/// Seat 4 relaxes the ruff threshold to this.
pub const SEAT4_TRUMP_IN_THRESHOLD: u16 = 10;
