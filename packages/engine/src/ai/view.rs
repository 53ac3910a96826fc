//! Read-only decision views handed to bots.
//!
//! Each decision gets a fresh view built from observable state only: the
//! seat's own hand, the public table, the records, and a card memory rebuilt
//! from history. No mutable handles, no private information of other seats.

use crate::ai::memory::CardMemory;
use crate::domain::bidding::{BidPhase, BidRecord};
use crate::domain::cards::{card_points, Card, GameMode, Suit};
use crate::domain::contract::Contract;
use crate::domain::rules::current_winner;
use crate::domain::state::{
    partner_of, team_of, CompletedTrick, MatchScores, Seat, TablePlay, Team,
};

/// Everything a bot can see at a play decision.
#[derive(Debug, Clone)]
pub struct BotView {
    pub seat: Seat,
    pub hand: Vec<Card>,
    pub legal_indices: Vec<usize>,
    pub table_cards: Vec<TablePlay>,
    pub mode: GameMode,
    pub trump_suit: Option<Suit>,
    pub contract: Contract,
    pub bid_history: Vec<BidRecord>,
    pub round_history: Vec<CompletedTrick>,
    pub floor_card: Option<Card>,
    pub match_scores: MatchScores,
    /// Memory rebuilt from the public record for this seat.
    pub memory: CardMemory,
    /// This seat still holds an undeclared Baloot (own-hand knowledge).
    pub baloot_ready: bool,
}

impl BotView {
    pub fn my_team(&self) -> Team {
        team_of(self.seat)
    }

    pub fn we_are_buyers(&self) -> bool {
        self.contract.team == self.my_team()
    }

    pub fn leading(&self) -> bool {
        self.table_cards.is_empty()
    }

    /// Trick position 1..=4 (1 = leading).
    pub fn trick_position(&self) -> u8 {
        self.table_cards.len() as u8 + 1
    }

    pub fn tricks_played(&self) -> usize {
        self.round_history.len()
    }

    pub fn tricks_remaining(&self) -> usize {
        8usize.saturating_sub(self.tricks_played())
    }

    pub fn tricks_won_by(&self, team: Team) -> usize {
        self.round_history
            .iter()
            .filter(|t| team_of(t.winner) == team)
            .count()
    }

    /// Abnat currently on the table.
    pub fn trick_points(&self) -> u16 {
        self.table_cards
            .iter()
            .map(|p| card_points(p.card, self.mode, self.trump_suit))
            .sum()
    }

    pub fn current_winner(&self) -> Option<&TablePlay> {
        current_winner(&self.table_cards, self.mode, self.trump_suit).map(|(_, p)| p)
    }

    pub fn partner_winning(&self) -> bool {
        self.current_winner()
            .map(|p| p.seat == partner_of(self.seat))
            .unwrap_or(false)
    }

    pub fn led_suit(&self) -> Option<Suit> {
        self.table_cards.first().map(|p| p.card.suit)
    }

    /// Hand indices grouped per suit.
    pub fn suits_in_hand(&self) -> [Vec<usize>; 4] {
        let mut groups: [Vec<usize>; 4] = Default::default();
        for (i, card) in self.hand.iter().enumerate() {
            groups[card.suit.index()].push(i);
        }
        groups
    }

    /// Legal indices that currently hold the top unseen rank of their suit.
    pub fn master_indices(&self) -> Vec<usize> {
        self.legal_indices
            .iter()
            .copied()
            .filter(|&i| {
                self.memory
                    .is_master(self.hand[i], self.mode, self.trump_suit, &self.hand)
            })
            .collect()
    }

    /// Our running abnat totals (us, them) over completed tricks.
    pub fn points_by_team(&self) -> (u16, u16) {
        let mut us = 0;
        let mut them = 0;
        for trick in &self.round_history {
            match team_of(trick.winner) {
                Team::Us => us += trick.points,
                Team::Them => them += trick.points,
            }
        }
        if self.my_team() == Team::Us {
            (us, them)
        } else {
            (them, us)
        }
    }
}

/// Everything a bot can see at an auction decision.
#[derive(Debug, Clone)]
pub struct BidView {
    pub seat: Seat,
    pub hand: Vec<Card>,
    pub floor_card: Card,
    pub phase: BidPhase,
    pub dealer_index: Seat,
    pub match_scores: MatchScores,
    pub bid_history: Vec<BidRecord>,
    /// Set once a contract draft exists (doubling / variant phases).
    pub contract: Option<Contract>,
}

impl BidView {
    pub fn is_buyer(&self) -> bool {
        self.contract
            .as_ref()
            .map(|c| c.bidder_seat == self.seat)
            .unwrap_or(false)
    }

    pub fn on_buying_team(&self) -> bool {
        self.contract
            .as_ref()
            .map(|c| c.team == team_of(self.seat))
            .unwrap_or(false)
    }

    pub fn ashkal_eligible(&self) -> bool {
        self.seat == self.dealer_index || self.seat == (self.dealer_index + 3) % 4
    }
}
