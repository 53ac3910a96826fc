//! Game layer: the coordinator, snapshots and redacted views.

pub mod coordinator;
pub mod player_view;
pub mod snapshot;

#[cfg(test)]
mod tests_lifecycle;
#[cfg(test)]
mod tests_scenarios;

pub use coordinator::{
    GameConfig, GameCoordinator, PlayResult, PlayerSlot, RoundOutcome, TimeoutEvent,
};
pub use player_view::PlayerView;
pub use snapshot::GameSnapshot;
