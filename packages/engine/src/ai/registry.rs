//! Bot registry: instantiate bot players by name.

use crate::ai::brain::BrainBot;
use crate::ai::personality::PersonalityProfile;
use crate::ai::random::RandomPlayer;
use crate::ai::trait_def::BotPlayer;

/// Known bot kinds: `random`, `brain`, or a brain with a named personality
/// (`balanced`, `aggressive`, `cautious`, `tricky`).
pub fn create_bot(kind: &str, seed: Option<u64>) -> Option<Box<dyn BotPlayer>> {
    match kind {
        RandomPlayer::NAME => Some(Box::new(RandomPlayer::new(seed))),
        BrainBot::NAME => Some(Box::new(BrainBot::new(seed))),
        other => PersonalityProfile::by_name(other)
            .map(|p| Box::new(BrainBot::with_personality(p, seed)) as Box<dyn BotPlayer>),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_kinds_resolve() {
        assert!(create_bot("random", Some(1)).is_some());
        assert!(create_bot("brain", Some(1)).is_some());
        assert!(create_bot("aggressive", Some(1)).is_some());
        assert!(create_bot("nope", Some(1)).is_none());
    }
}
