//! Reference bot: uniformly random legal moves, deterministic when seeded.
//! Useful as a baseline opponent and in engine tests.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use crate::ai::trait_def::{AiError, BidDecision, BotPlayer};
use crate::ai::view::{BidView, BotView};
use crate::domain::bidding::{BidAction, BidPhase};
use crate::domain::rules::is_kawesh_hand;

pub struct RandomPlayer {
    rng: Mutex<StdRng>,
}

impl RandomPlayer {
    pub const NAME: &'static str = "random";

    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }
}

impl BotPlayer for RandomPlayer {
    fn choose_bid(&self, view: &BidView) -> Result<BidDecision, AiError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|e| AiError::Internal(format!("rng lock poisoned: {e}")))?;

        match view.phase {
            BidPhase::RoundOne | BidPhase::RoundTwo => {
                if is_kawesh_hand(&view.hand) {
                    return Ok(BidDecision {
                        action: BidAction::Kawesh,
                        suit: None,
                    });
                }
                // Mostly pass, with an occasional legal contract bid.
                let roll: f32 = rng.random();
                if roll < 0.8 {
                    Ok(BidDecision::pass())
                } else if roll < 0.9 && view.phase == BidPhase::RoundOne {
                    Ok(BidDecision {
                        action: BidAction::Hokum,
                        suit: Some(view.floor_card.suit),
                    })
                } else {
                    Ok(BidDecision {
                        action: BidAction::Sun,
                        suit: None,
                    })
                }
            }
            BidPhase::VariantSelection => Ok(BidDecision {
                action: if rng.random::<bool>() {
                    BidAction::Open
                } else {
                    BidAction::Closed
                },
                suit: None,
            }),
            _ => Ok(BidDecision::pass()),
        }
    }

    fn choose_play(&self, view: &BotView) -> Result<usize, AiError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|e| AiError::Internal(format!("rng lock poisoned: {e}")))?;
        view.legal_indices
            .choose(&mut *rng)
            .copied()
            .ok_or(AiError::NoLegalMove)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::memory::CardMemory;
    use crate::domain::cards::{Card, GameMode, Rank, Suit};
    use crate::domain::contract::{Contract, ContractType};
    use crate::domain::state::{MatchScores, Team};

    #[test]
    fn seeded_player_is_deterministic() {
        let hand = vec![
            Card::new(Suit::Hearts, Rank::Ace),
            Card::new(Suit::Hearts, Rank::Seven),
            Card::new(Suit::Clubs, Rank::Nine),
        ];
        let view = BotView {
            seat: 0,
            legal_indices: vec![0, 1, 2],
            table_cards: Vec::new(),
            mode: GameMode::Sun,
            trump_suit: None,
            contract: Contract {
                contract_type: ContractType::Sun,
                suit: None,
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
        };

        let a: Vec<usize> = {
            let bot = RandomPlayer::new(Some(9));
            (0..8).map(|_| bot.choose_play(&view).unwrap()).collect()
        };
        let b: Vec<usize> = {
            let bot = RandomPlayer::new(Some(9));
            (0..8).map(|_| bot.choose_play(&view).unwrap()).collect()
        };
        assert_eq!(a, b);
        assert!(a.iter().all(|i| view.legal_indices.contains(i)));
    }
}
