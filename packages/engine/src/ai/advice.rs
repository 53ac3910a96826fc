//! The advice structure every tactical module speaks.

use std::fmt;

/// Named tactic or strategy behind a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tactic {
    // Lead strategies
    Desperation,
    MasterCash,
    TrumpDraw,
    DefensePriority,
    PartnerFeed,
    LongRun,
    SafeLead,
    // Follow tactics
    FeedPartner,
    FeedOffsuit,
    Dodge,
    SecondHandLow,
    SecondHandHigh,
    WinBig,
    WinCheap,
    TrumpOver,
    TrumpIn,
    ShedSafe,
    // Cooperative overrides
    DrawTrump,
    SetupRun,
    FeedStrong,
    EntryTransfer,
    VoidEntry,
    TrumpSupport,
    SmartDiscard,
    SignalShape,
    Sacrifice,
    // Emergency overrides
    GalossDesperation,
    GalossFeed,
    GalossFight,
    GalossPress,
    GalossDeny,
    // Brain-level strategies
    KabootPursuit,
    PointDensity,
    Solver,
    Fallback,
}

impl fmt::Display for Tactic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// One module's recommendation: a hand index with a confidence in [0, 1]
/// and a short human-readable reasoning string.
#[derive(Debug, Clone, PartialEq)]
pub struct Advice {
    pub card_index: usize,
    pub tactic: Tactic,
    pub confidence: f32,
    pub reasoning: String,
}

impl Advice {
    pub fn new(
        card_index: usize,
        tactic: Tactic,
        confidence: f32,
        reasoning: impl Into<String>,
    ) -> Self {
        Self {
            card_index,
            tactic,
            confidence: confidence.clamp(0.0, 1.0),
            reasoning: reasoning.into(),
        }
    }
}
