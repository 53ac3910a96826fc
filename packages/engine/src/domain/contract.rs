//! Contract value object. Constructed only by the bidding engine.

use serde::{Deserialize, Serialize};

use crate::domain::cards::{GameMode, Suit};
use crate::domain::state::{Seat, Team};

/// Symbolic level for Gahwa, the terminal escalation.
pub const GAHWA_LEVEL: u8 = 100;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum ContractType {
    Hokum,
    Sun,
}

impl ContractType {
    pub fn mode(self) -> GameMode {
        match self {
            ContractType::Hokum => GameMode::Hokum,
            ContractType::Sun => GameMode::Sun,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum HokumVariant {
    Open,
    Closed,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub contract_type: ContractType,
    /// Trump suit; `None` for SUN.
    pub suit: Option<Suit>,
    pub bidder_seat: Seat,
    pub team: Team,
    /// 1 = normal, 2 = doubled, 3 = triple, 4 = four, 100 = Gahwa.
    pub level: u8,
    pub variant: Option<HokumVariant>,
    pub is_ashkal: bool,
    /// Auction round the winning bid came from (1 or 2).
    pub round: u8,
}

impl Contract {
    pub fn mode(&self) -> GameMode {
        self.contract_type.mode()
    }

    pub fn is_gahwa(&self) -> bool {
        self.level >= GAHWA_LEVEL
    }

    /// Doubling multiplier for levels 1..=4. Gahwa is resolved by the
    /// scoring engine, not here.
    pub fn multiplier(&self) -> i32 {
        match self.level {
            2 => 2,
            3 => 3,
            4 => 4,
            _ => 1,
        }
    }
}
