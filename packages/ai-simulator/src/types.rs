//! Result types for simulated games.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct RoundSummary {
    pub round_no: u32,
    pub us: i32,
    pub them: i32,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GameResult {
    pub game_no: u32,
    pub seed: u64,
    pub rounds_played: usize,
    pub final_us: i32,
    pub final_them: i32,
    pub winner: String,
    pub kaboot_rounds: usize,
    pub khasara_rounds: usize,
    pub qayd_rounds: usize,
    pub rounds: Vec<RoundSummary>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub games: u32,
    pub us_wins: u32,
    pub them_wins: u32,
    pub total_rounds: usize,
    pub kaboot_rounds: usize,
    pub khasara_rounds: usize,
    pub qayd_rounds: usize,
    pub elapsed_ms: u128,
}
