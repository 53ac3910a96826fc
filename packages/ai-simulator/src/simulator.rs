//! In-memory game driver: four bots, a simulated clock, no transport.

use baloot_engine::ai::trait_def::BotPlayer;
use baloot_engine::domain::bidding::BidPhase;
use baloot_engine::domain::state::GamePhase;
use baloot_engine::game::coordinator::{GameConfig, GameCoordinator};
use tracing::{debug, warn};

use crate::types::{GameResult, RoundSummary};

/// Hard cap on driver steps per game; a healthy game finishes well under it.
const MAX_STEPS: usize = 100_000;

pub struct Simulator {
    pub bots: [Box<dyn BotPlayer>; 4],
}

impl Simulator {
    pub fn run_game(&self, game_no: u32, seed: u64) -> GameResult {
        let mut game = GameCoordinator::new(GameConfig {
            seed,
            ..GameConfig::default()
        });
        for i in 0..4 {
            game.add_player(format!("bot{i}"), format!("Bot {i}"))
                .expect("empty table has room");
        }
        game.start_game().expect("four players seated");

        let mut now_ms: i64 = 0;
        let mut steps = 0usize;
        while game.phase() != GamePhase::GameOver && steps < MAX_STEPS {
            steps += 1;
            now_ms += 50;
            match game.phase() {
                GamePhase::Bidding => {
                    let seat = game.current_turn();
                    if let Err(err) = game.auto_bid(seat, self.bots[seat as usize].as_ref(), now_ms)
                    {
                        warn!(seat, %err, "bid rejected; aborting game");
                        game.abort();
                        break;
                    }
                    // Expire any armed Gablak window instead of stalling on it.
                    if game.get_state(None).bidding_phase == Some(BidPhase::GablakWindow) {
                        now_ms += GameConfig::default().gablak_window_ms + 100;
                        if let Err(err) = game.check_timeout_at(now_ms) {
                            warn!(%err, "timeout poll failed; aborting game");
                            game.abort();
                            break;
                        }
                    }
                }
                GamePhase::Playing => {
                    let seat = game.current_turn();

                    // Detective pass before the play itself.
                    if let Ok(view) = game.bot_view(seat) {
                        if let Some(offender) =
                            self.bots[seat as usize].consider_qayd(&view)
                        {
                            debug!(accuser = seat, offender, "bot raises qayd");
                            if game.raise_qayd_at(seat, now_ms).is_ok() {
                                continue;
                            }
                        }
                    }

                    if let Err(err) =
                        game.auto_play_card(seat, self.bots[seat as usize].as_ref())
                    {
                        warn!(seat, %err, "play rejected; aborting game");
                        game.abort();
                        break;
                    }
                }
                GamePhase::Challenge => {
                    now_ms += GameConfig::default().qayd_hold_ms + 100;
                    if let Err(err) = game.check_timeout_at(now_ms) {
                        warn!(%err, "qayd poll failed; aborting game");
                        game.abort();
                        break;
                    }
                }
                _ => break,
            }
        }

        summarise(game_no, seed, &game)
    }
}

fn summarise(game_no: u32, seed: u64, game: &GameCoordinator) -> GameResult {
    let scores = game.match_scores();
    let rounds: Vec<RoundSummary> = game
        .past_round_results()
        .iter()
        .map(|o| RoundSummary {
            round_no: o.round_no,
            us: o.us,
            them: o.them,
            reason: o.reason.clone(),
        })
        .collect();
    let kaboot_rounds = game
        .past_round_results()
        .iter()
        .filter(|o| o.reason.contains("kaboot"))
        .count();
    let khasara_rounds = game
        .past_round_results()
        .iter()
        .filter(|o| o.reason.contains("khasara"))
        .count();
    let qayd_rounds = game
        .past_round_results()
        .iter()
        .filter(|o| o.reason.contains("qayd"))
        .count();

    GameResult {
        game_no,
        seed,
        rounds_played: rounds.len(),
        final_us: scores.us,
        final_them: scores.them,
        winner: if scores.us >= scores.them { "us" } else { "them" }.to_string(),
        kaboot_rounds,
        khasara_rounds,
        qayd_rounds,
        rounds,
    }
}
