//! Declarations manager: Sira, Fifty, Hundred and four-of-a-kind projects.
//!
//! Projects may only be declared on a seat's first turn of trick 1 and are
//! resolved when that trick completes: the stronger team keeps its projects,
//! the other team's are discarded. Sequences run in the natural rank order
//! (A-K-Q is a Sira); trick resolution orders play no part here.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::cards::{Card, GameMode, Rank, Suit};
use crate::domain::state::{team_of, Seat, Team, SEATS};
use crate::errors::domain::DomainError;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum ProjectKind {
    /// Three consecutive ranks in one suit; 20 abnat.
    Sira,
    /// Four consecutive ranks in one suit; 50 abnat.
    Fifty,
    /// Five consecutive ranks in one suit; 100 abnat.
    Hundred,
    /// Four of a kind of 10/J/Q/K/A; 100 abnat.
    FourOfAKind,
}

impl ProjectKind {
    pub fn abnat(self) -> u16 {
        match self {
            ProjectKind::Sira => 20,
            ProjectKind::Fifty => 50,
            ProjectKind::Hundred | ProjectKind::FourOfAKind => 100,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub kind: ProjectKind,
    pub owner: Seat,
    /// Suit of the sequence; `None` for four-of-a-kind.
    pub suit: Option<Suit>,
    /// Highest rank of the run, or the quadrupled rank.
    pub top_rank: Rank,
    pub cards: Vec<Card>,
    pub abnat: u16,
}

/// Per-round project bookkeeping.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ProjectManager {
    declared: [Vec<Project>; 4],
    /// Seats whose trick-1 declaration window has already closed.
    window_closed: [bool; 4],
    resolved: bool,
}

impl ProjectManager {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    pub fn declarations(&self, seat: Seat) -> &[Project] {
        &self.declared[seat as usize % SEATS]
    }

    /// All surviving projects (after resolution: the winning team's only).
    pub fn all(&self) -> impl Iterator<Item = &Project> {
        self.declared.iter().flatten()
    }

    /// Close a seat's window; called when the seat plays its trick-1 card.
    pub fn close_window(&mut self, seat: Seat) {
        self.window_closed[seat as usize % SEATS] = true;
    }

    /// Declare the best project of `kind` found in `hand`.
    pub fn declare(
        &mut self,
        seat: Seat,
        kind: ProjectKind,
        hand: &[Card],
    ) -> Result<&Project, DomainError> {
        if self.resolved || self.window_closed[seat as usize] {
            return Err(DomainError::phase(
                "projects may only be declared on your first turn of trick 1",
            ));
        }
        let project = find_project(hand, kind, seat)
            .ok_or_else(|| DomainError::eligibility(format!("hand holds no {kind:?}")))?;
        if self.declared[seat as usize]
            .iter()
            .any(|p| p.kind == kind && p.cards == project.cards)
        {
            return Err(DomainError::input("project already declared"));
        }
        info!(seat, ?kind, abnat = project.abnat, "project declared");
        self.declared[seat as usize].push(project);
        Ok(self.declared[seat as usize]
            .last()
            .unwrap_or_else(|| unreachable!("just pushed")))
    }

    /// Resolve at end of trick 1: the team with the strongest project keeps
    /// everything it declared; the other team's projects are discarded.
    pub fn resolve(&mut self, mode: GameMode, trump: Option<Suit>) -> Option<Team> {
        if self.resolved {
            return self.winning_team();
        }
        self.resolved = true;

        let best_us = self.best_for_team(Team::Us, mode, trump);
        let best_them = self.best_for_team(Team::Them, mode, trump);
        let winner = match (best_us, best_them) {
            (None, None) => None,
            (Some(_), None) => Some(Team::Us),
            (None, Some(_)) => Some(Team::Them),
            (Some(us), Some(them)) => Some(if project_beats(&us, &them, trump) {
                Team::Us
            } else {
                Team::Them
            }),
        };

        if let Some(winning) = winner {
            for seat in 0..SEATS as Seat {
                if team_of(seat) != winning {
                    self.declared[seat as usize].clear();
                }
            }
            debug!(team = winning.label(), "projects resolved");
        }
        winner
    }

    fn winning_team(&self) -> Option<Team> {
        let mut team = None;
        for seat in 0..SEATS as Seat {
            if !self.declared[seat as usize].is_empty() {
                team = Some(team_of(seat));
            }
        }
        team
    }

    fn best_for_team(&self, team: Team, _mode: GameMode, trump: Option<Suit>) -> Option<Project> {
        let mut best: Option<Project> = None;
        for seat in 0..SEATS as Seat {
            if team_of(seat) != team {
                continue;
            }
            for project in &self.declared[seat as usize] {
                let better = match &best {
                    None => true,
                    Some(current) => project_beats(project, current, trump),
                };
                if better {
                    best = Some(project.clone());
                }
            }
        }
        best
    }

    /// Abnat total of the surviving projects owned by `team`.
    pub fn team_abnat(&self, team: Team) -> u16 {
        (0..SEATS as Seat)
            .filter(|&s| team_of(s) == team)
            .flat_map(|s| self.declared[s as usize].iter())
            .map(|p| p.abnat)
            .sum()
    }

    /// Does this seat hold a project that blocks Baloot scoring? Four kings,
    /// four queens, or a 100 sequence containing both K and Q of trump.
    pub fn blocks_baloot(&self, seat: Seat, trump: Option<Suit>) -> bool {
        self.declared[seat as usize % SEATS].iter().any(|p| {
            match p.kind {
                ProjectKind::FourOfAKind => matches!(p.top_rank, Rank::King | Rank::Queen),
                ProjectKind::Hundred => {
                    let Some(trump) = trump else { return false };
                    let has_k = p.cards.contains(&Card::new(trump, Rank::King));
                    let has_q = p.cards.contains(&Card::new(trump, Rank::Queen));
                    has_k && has_q
                }
                _ => false,
            }
        })
    }
}

/// Tie-break: higher abnat, then higher top card, then trump precedence.
fn project_beats(a: &Project, b: &Project, trump: Option<Suit>) -> bool {
    if a.abnat != b.abnat {
        return a.abnat > b.abnat;
    }
    if a.top_rank != b.top_rank {
        return a.top_rank > b.top_rank;
    }
    match trump {
        Some(t) => a.suit == Some(t) && b.suit != Some(t),
        None => false,
    }
}

/// Find the strongest instance of `kind` in the hand, or `None`.
pub fn find_project(hand: &[Card], kind: ProjectKind, owner: Seat) -> Option<Project> {
    match kind {
        ProjectKind::FourOfAKind => find_four_of_a_kind(hand, owner),
        ProjectKind::Sira => find_run(hand, 3, kind, owner),
        ProjectKind::Fifty => find_run(hand, 4, kind, owner),
        ProjectKind::Hundred => find_run(hand, 5, kind, owner),
    }
}

fn find_four_of_a_kind(hand: &[Card], owner: Seat) -> Option<Project> {
    // Only 10/J/Q/K/A count; prefer the highest rank held four times.
    for rank in [Rank::Ace, Rank::King, Rank::Queen, Rank::Jack, Rank::Ten] {
        let cards: Vec<Card> = hand.iter().copied().filter(|c| c.rank == rank).collect();
        if cards.len() == 4 {
            return Some(Project {
                kind: ProjectKind::FourOfAKind,
                owner,
                suit: None,
                top_rank: rank,
                cards,
                abnat: ProjectKind::FourOfAKind.abnat(),
            });
        }
    }
    None
}

fn find_run(hand: &[Card], len: usize, kind: ProjectKind, owner: Seat) -> Option<Project> {
    let mut best: Option<Project> = None;
    for suit in Suit::ALL {
        let mut held = [false; 8];
        for card in hand.iter().filter(|c| c.suit == suit) {
            held[card.rank.natural_index()] = true;
        }
        // Walk windows from the top so the first hit is the highest run.
        for start in (0..=(8 - len)).rev() {
            if (start..start + len).all(|i| held[i]) {
                let cards: Vec<Card> = (start..start + len)
                    .map(|i| Card::new(suit, Rank::ALL[i]))
                    .collect();
                let candidate = Project {
                    kind,
                    owner,
                    suit: Some(suit),
                    top_rank: Rank::ALL[start + len - 1],
                    cards,
                    abnat: kind.abnat(),
                };
                let better = match &best {
                    None => true,
                    Some(current) => candidate.top_rank > current.top_rank,
                };
                if better {
                    best = Some(candidate);
                }
                break;
            }
        }
    }
    best
}
