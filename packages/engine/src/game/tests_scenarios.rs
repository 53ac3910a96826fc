//! End-to-end scenario tests driven through the public coordinator API.
//! Rigged deals enter through `restore`, the same door a persisting host
//! uses.

use crate::ai::memory::CardMemory;
use crate::domain::baloot::{BalootPhase, BalootState};
use crate::domain::bidding::{BidAction, BidOutcome, BidPhase, BiddingEngine};
use crate::domain::cards::{Card, Rank, Suit};
use crate::domain::contract::{Contract, ContractType, HokumVariant};
use crate::domain::dealing::full_deck;
use crate::domain::projects::ProjectManager;
use crate::domain::qayd::{QaydState, QaydVerdict};
use crate::domain::state::{team_of, GamePhase, MatchScores, RoundState, Seat, Team};
use crate::errors::domain::DomainError;
use crate::game::coordinator::{GameConfig, GameCoordinator, PlayerSlot, TimeoutEvent};
use crate::game::snapshot::GameSnapshot;

fn players() -> Vec<PlayerSlot> {
    (0..4)
        .map(|i| PlayerSlot {
            id: format!("p{i}"),
            name: format!("Player {i}"),
            seat: i as Seat,
        })
        .collect()
}

/// A coordinator dropped straight into PLAYING with rigged hands.
fn rigged_playing(
    hands: [Vec<Card>; 4],
    contract: Contract,
    dealer: Seat,
    leader: Seat,
    config: GameConfig,
) -> GameCoordinator {
    let mut sorted = hands;
    for hand in &mut sorted {
        hand.sort();
    }
    let mut round = RoundState::new(dealer);
    round.hands = sorted.clone();
    round.initial_hands = sorted;
    round.mode = Some(contract.mode());
    round.trump_suit = contract.suit;
    round.current_turn = leader;

    let mut baloot = BalootState::default();
    baloot.scan_initial_hands(&round.hands, contract.mode(), contract.suit);

    let snapshot = GameSnapshot {
        room_id: "scenario".into(),
        config,
        phase: GamePhase::Playing,
        players: players(),
        round,
        bidding: None,
        contract: Some(contract),
        projects: ProjectManager::default(),
        baloot,
        qayd: QaydState::default(),
        memory: CardMemory::default(),
        match_scores: MatchScores::default(),
        past_round_results: Vec::new(),
        round_no: 0,
        deal_counter: 1,
        is_locked: false,
    };
    GameCoordinator::restore(snapshot).expect("rigged snapshot must restore")
}

/// A coordinator in BIDDING with rigged five-card hands and a chosen floor.
fn rigged_bidding(floor: Card, seat1_hand: Option<Vec<Card>>, dealer: Seat) -> GameCoordinator {
    let mut deck = full_deck();
    deck.retain(|&c| c != floor);
    let mut hands: [Vec<Card>; 4] = Default::default();
    if let Some(hand) = &seat1_hand {
        deck.retain(|c| !hand.contains(c));
        hands[1] = hand.clone();
    }
    for seat in 0..4usize {
        while hands[seat].len() < 5 {
            hands[seat].push(deck.remove(0));
        }
        hands[seat].sort();
    }
    let undealt = deck;
    assert_eq!(undealt.len(), 11);

    let mut round = RoundState::new(dealer);
    round.hands = hands;
    round.floor_card = Some(floor);
    round.undealt = undealt;

    let config = GameConfig::default();
    let snapshot = GameSnapshot {
        room_id: "scenario".into(),
        config,
        phase: GamePhase::Bidding,
        players: players(),
        round,
        bidding: Some(BiddingEngine::new(
            dealer,
            floor,
            MatchScores::default(),
            config.gablak_window_ms,
        )),
        contract: None,
        projects: ProjectManager::default(),
        baloot: BalootState::default(),
        qayd: QaydState::default(),
        memory: CardMemory::default(),
        match_scores: MatchScores::default(),
        past_round_results: Vec::new(),
        round_no: 0,
        deal_counter: 1,
        is_locked: false,
    };
    GameCoordinator::restore(snapshot).expect("rigged snapshot must restore")
}

fn suit_run(suit: Suit) -> Vec<Card> {
    Rank::ALL.iter().map(|&r| Card::new(suit, r)).collect()
}

fn hokum_contract(bidder: Seat, level: u8) -> Contract {
    Contract {
        contract_type: ContractType::Hokum,
        suit: Some(Suit::Spades),
        bidder_seat: bidder,
        team: team_of(bidder),
        level,
        variant: Some(HokumVariant::Closed),
        is_ashkal: false,
        round: 1,
    }
}

fn sun_contract(bidder: Seat) -> Contract {
    Contract {
        contract_type: ContractType::Sun,
        suit: None,
        bidder_seat: bidder,
        team: team_of(bidder),
        level: 1,
        variant: None,
        is_ashkal: false,
        round: 1,
    }
}

/// Play out a full round where seat 0 holds every trump and leads first.
fn sweep_with_all_spades(level: u8) -> GameCoordinator {
    let hands = [
        suit_run(Suit::Spades),
        suit_run(Suit::Hearts),
        suit_run(Suit::Diamonds),
        suit_run(Suit::Clubs),
    ];
    let mut game = rigged_playing(
        hands,
        hokum_contract(0, level),
        3,
        0,
        GameConfig::default(),
    );
    for _ in 0..8 {
        for seat in [0u8, 1, 2, 3] {
            game.play_card(seat, 0).expect("sweep play must be legal");
        }
    }
    game
}

// ── Scenario A: Kaboot sweep in HOKUM ───────────────────────────────

#[test]
fn scenario_a_kaboot_sweep_in_hokum() {
    let game = sweep_with_all_spades(1);
    assert_eq!(game.match_scores().us, 25);
    assert_eq!(game.match_scores().them, 0);

    let outcome = game.past_round_results().last().expect("round archived");
    assert_eq!(outcome.us, 25);
    assert_eq!(outcome.them, 0);
    assert_eq!(outcome.winner, Some(Team::Us));
    let score = outcome.score.as_ref().expect("scored round");
    assert!(score.us.is_kaboot);
    assert!(!score.them.is_kaboot);
}

// ── Scenario B: Khasara with doubling ───────────────────────────────

#[test]
fn scenario_b_khasara_with_doubling() {
    use crate::domain::scoring::{score_round, ScoreInputs};
    use crate::domain::state::CompletedTrick;

    // Final raw abnat: us 76, them 86 (them includes the last-trick bonus).
    let winners: [Seat; 8] = [0, 0, 0, 0, 1, 1, 1, 1];
    let history: Vec<CompletedTrick> = winners
        .iter()
        .map(|&winner| CompletedTrick {
            plays: Vec::new(),
            leader: winner,
            winner,
            points: 19,
        })
        .collect();
    let contract = hokum_contract(0, 2);
    let score = score_round(&ScoreInputs {
        round_history: &history,
        contract: &contract,
        project_abnat_us: 0,
        project_abnat_them: 0,
        baloot_us: 0,
        baloot_them: 0,
    })
    .expect("scorable");

    // Pair-rounded to 8-8; the tie is a contract loss, doubled to them.
    assert_eq!(score.us.result, 0);
    assert_eq!(score.them.result, 32);
    assert_eq!(score.us.multiplier_applied, 2);
    assert!(score.reason.starts_with("khasara"));
}

// ── Scenario C: Baloot immunity under doubling ──────────────────────

#[test]
fn scenario_c_baloot_immunity_under_doubling() {
    let hands = [
        suit_run(Suit::Spades),
        suit_run(Suit::Hearts),
        suit_run(Suit::Diamonds),
        suit_run(Suit::Clubs),
    ];
    let mut game = rigged_playing(
        hands,
        hokum_contract(0, 2),
        3,
        0,
        GameConfig::default(),
    );

    let mut announced = false;
    let mut declared = false;
    for _ in 0..8 {
        for seat in [0u8, 1, 2, 3] {
            let result = game.play_card(seat, 0).expect("legal play");
            if let Some(event) = result.baloot_event {
                match event.phase {
                    BalootPhase::Announced => {
                        announced = true;
                        assert_eq!(event.game_points, 0);
                    }
                    BalootPhase::Declared => {
                        declared = true;
                        assert_eq!(event.game_points, 2);
                    }
                }
            }
        }
    }
    assert!(announced && declared);

    // Kaboot pot 25 doubled to 50, then the immune +2 — never (25 + 1) * 2.
    let outcome = game.past_round_results().last().expect("round archived");
    assert_eq!(outcome.us, 52);
    assert_eq!(outcome.them, 0);
}

// ── Scenario D: Kawesh pre-bid redeal ───────────────────────────────

#[test]
fn scenario_d_kawesh_pre_bid_redeal() {
    let kawesh_hand = vec![
        Card::new(Suit::Hearts, Rank::Seven),
        Card::new(Suit::Hearts, Rank::Eight),
        Card::new(Suit::Hearts, Rank::Nine),
        Card::new(Suit::Clubs, Rank::Seven),
        Card::new(Suit::Clubs, Rank::Eight),
    ];
    let mut game = rigged_bidding(Card::new(Suit::Spades, Rank::Ten), Some(kawesh_hand), 3);

    let outcome = game
        .submit_bid_at(1, BidAction::Kawesh, None, 0)
        .expect("kawesh accepted");
    assert_eq!(
        outcome,
        BidOutcome::Redeal {
            rotate_dealer: false
        }
    );
    // Same dealer continues into a fresh auction.
    assert_eq!(game.phase(), GamePhase::Bidding);
    assert_eq!(game.round_state().dealer_index, 3);
}

// ── Scenario E: Gablak hijack ───────────────────────────────────────

#[test]
fn scenario_e_gablak_hijack() {
    let mut game = rigged_bidding(Card::new(Suit::Spades, Rank::Seven), None, 3);

    game.submit_bid_at(0, BidAction::Pass, None, 0).expect("pass");
    game.submit_bid_at(1, BidAction::Pass, None, 0).expect("pass");
    game.submit_bid_at(2, BidAction::Hokum, Some(Suit::Spades), 0)
        .expect("hokum stands");

    // Seat 3 (lower priority than seat 2) attempts SUN: window armed.
    let outcome = game
        .submit_bid_at(3, BidAction::Sun, None, 1_000)
        .expect("sun triggers gablak");
    assert!(matches!(outcome, BidOutcome::GablakTriggered { .. }));
    assert_eq!(game.get_state(None).bidding_phase, Some(BidPhase::GablakWindow));

    // The armed window snapshots as a fixed point (the deadline is state).
    let snapshot = game.snapshot();
    let restored = GameCoordinator::restore(snapshot.clone()).expect("restores");
    assert_eq!(restored.snapshot(), snapshot);

    // Seat 2 waives; the SUN for seat 3 finalises into doubling.
    let outcome = game
        .submit_bid_at(2, BidAction::Pass, None, 2_000)
        .expect("waive");
    assert_eq!(outcome, BidOutcome::GablakCompleted);
    assert_eq!(game.get_state(None).bidding_phase, Some(BidPhase::Doubling));

    // No doubling: play begins under SUN for seat 3 with full hands.
    game.submit_bid_at(1, BidAction::Pass, None, 3_000)
        .expect("close doubling");
    assert_eq!(game.phase(), GamePhase::Playing);
    let contract = game.contract().expect("contract");
    assert_eq!(contract.contract_type, ContractType::Sun);
    assert_eq!(contract.bidder_seat, 3);
    for seat in 0..4u8 {
        assert_eq!(game.hand_of(seat).len(), 8);
    }
}

#[test]
fn gablak_timeout_confirms_via_coordinator() {
    let mut game = rigged_bidding(Card::new(Suit::Spades, Rank::Seven), None, 3);
    game.submit_bid_at(0, BidAction::Pass, None, 0).expect("pass");
    game.submit_bid_at(1, BidAction::Pass, None, 0).expect("pass");
    game.submit_bid_at(2, BidAction::Hokum, Some(Suit::Spades), 0)
        .expect("hokum");
    game.submit_bid_at(3, BidAction::Sun, None, 1_000)
        .expect("gablak");

    assert_eq!(game.check_timeout_at(2_000).expect("poll"), None);
    let event = game
        .check_timeout_at(1_000 + GameConfig::default().gablak_window_ms)
        .expect("poll");
    assert_eq!(event, Some(TimeoutEvent::GablakExpired));
    assert_eq!(game.get_state(None).bidding_phase, Some(BidPhase::Doubling));
}

// ── Scenario F: Revoke detected by Qayd ─────────────────────────────

fn revoke_setup() -> GameCoordinator {
    // Seat 0 holds the heart king but will throw the spade ace on a heart
    // lead. Permissive mode lets the crime land on the table.
    let seat0 = vec![
        Card::new(Suit::Hearts, Rank::King),
        Card::new(Suit::Spades, Rank::Ace),
        Card::new(Suit::Spades, Rank::Seven),
        Card::new(Suit::Spades, Rank::Eight),
        Card::new(Suit::Spades, Rank::Nine),
        Card::new(Suit::Spades, Rank::Ten),
        Card::new(Suit::Spades, Rank::Jack),
        Card::new(Suit::Spades, Rank::Queen),
    ];
    let seat1 = {
        let mut cards = suit_run(Suit::Clubs);
        cards.remove(7); // drop the club ace for the spade king
        cards.push(Card::new(Suit::Spades, Rank::King));
        cards
    };
    let seat2 = {
        let mut cards = suit_run(Suit::Diamonds);
        cards.remove(7);
        cards.push(Card::new(Suit::Clubs, Rank::Ace));
        cards
    };
    let seat3 = {
        let mut cards = suit_run(Suit::Hearts);
        cards.retain(|c| c.rank != Rank::King);
        cards.push(Card::new(Suit::Diamonds, Rank::Ace));
        cards
    };
    let config = GameConfig {
        strict: false,
        ..GameConfig::default()
    };
    rigged_playing([seat0, seat1, seat2, seat3], sun_contract(0), 2, 3, config)
}

#[test]
fn scenario_f_revoke_detected_by_qayd() {
    let mut game = revoke_setup();

    // Seat 3 leads a heart; seat 0 revokes with the spade ace.
    let lead_index = game
        .hand_of(3)
        .iter()
        .position(|c| c.suit == Suit::Hearts)
        .expect("seat 3 has hearts");
    game.play_card(3, lead_index).expect("lead accepted");
    let ace_index = game
        .hand_of(0)
        .iter()
        .position(|&c| c == Card::new(Suit::Spades, Rank::Ace))
        .expect("seat 0 has the spade ace");
    let result = game.play_card(0, ace_index).expect("permissive play");
    assert!(!result.trick_completed);

    // Seat 1 raises the Qayd: play locks, phase preempts to CHALLENGE.
    let verdict = game.raise_qayd_at(1, 10_000).expect("qayd raised");
    assert_eq!(verdict, QaydVerdict::Correct);
    assert_eq!(game.phase(), GamePhase::Challenge);
    assert!(game.is_locked());

    // The lock gates play but never the timeout poll.
    let err = game.play_card(1, 0).unwrap_err();
    assert!(matches!(err, DomainError::Phase(_)));
    assert_eq!(game.check_timeout_at(10_500).expect("poll"), None);
    assert!(game.is_locked());

    // Hold window elapses: penalty applied, round over, lock released.
    let event = game.check_timeout_at(12_000).expect("poll");
    assert_eq!(event, Some(TimeoutEvent::QaydResolved(QaydVerdict::Correct)));
    assert!(!game.is_locked());

    let outcome = game.past_round_results().last().expect("round archived");
    assert_eq!(outcome.us, 0);
    assert_eq!(outcome.them, 26);
    assert!(outcome.reason.contains("revoke"));
    assert!(outcome.score.is_none());
    assert_eq!(game.match_scores().them, 26);
}

#[test]
fn false_accusation_penalises_the_accuser() {
    let mut game = revoke_setup();

    // Seat 3 leads a heart and seat 0 follows legally with the king.
    let lead_index = game
        .hand_of(3)
        .iter()
        .position(|c| c.suit == Suit::Hearts)
        .expect("hearts");
    game.play_card(3, lead_index).expect("lead");
    let king_index = game
        .hand_of(0)
        .iter()
        .position(|&c| c == Card::new(Suit::Hearts, Rank::King))
        .expect("heart king");
    game.play_card(0, king_index).expect("legal follow");

    let verdict = game.raise_qayd_at(1, 0).expect("raised");
    assert_eq!(verdict, QaydVerdict::False);
    game.check_timeout_at(5_000).expect("poll");

    // The accuser's team forfeits symmetrically.
    let outcome = game.past_round_results().last().expect("archived");
    assert_eq!(outcome.them, 0);
    assert_eq!(outcome.us, 26);
    assert!(outcome.reason.contains("false accusation"));
}
