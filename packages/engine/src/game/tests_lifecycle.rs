//! Lifecycle and snapshot tests: full bot-driven games, redaction, and the
//! snapshot/restore fixed point across phases.

use crate::ai::brain::BrainBot;
use crate::domain::bidding::BidPhase;
use crate::domain::state::{GamePhase, MATCH_TARGET};
use crate::errors::domain::DomainError;
use crate::game::coordinator::{GameConfig, GameCoordinator};

fn seeded_game(seed: u64) -> GameCoordinator {
    let mut game = GameCoordinator::new(GameConfig {
        seed,
        ..GameConfig::default()
    });
    for i in 0..4 {
        game.add_player(format!("p{i}"), format!("Player {i}"))
            .expect("seat available");
    }
    game
}

/// Drive a full game with four brain bots under a simulated clock.
fn run_game(seed: u64, max_steps: usize) -> GameCoordinator {
    let mut game = seeded_game(seed);
    game.start_game().expect("game starts");
    let bots: Vec<BrainBot> = (0..4).map(|i| BrainBot::new(Some(seed + i))).collect();

    let mut now_ms: i64 = 0;
    for _ in 0..max_steps {
        now_ms += 100;
        match game.phase() {
            GamePhase::Bidding => {
                let seat = game.current_turn();
                game.auto_bid(seat, &bots[seat as usize], now_ms)
                    .expect("bot bid resolves");
                // Let any armed Gablak window expire rather than stall.
                now_ms += game
                    .get_state(None)
                    .bidding_phase
                    .map(|p| if p == BidPhase::GablakWindow { 6_000 } else { 0 })
                    .unwrap_or(0);
                game.check_timeout_at(now_ms).expect("poll");
            }
            GamePhase::Playing => {
                let seat = game.current_turn();
                game.auto_play_card(seat, &bots[seat as usize])
                    .expect("bot play resolves");
            }
            GamePhase::Challenge => {
                now_ms += 3_000;
                game.check_timeout_at(now_ms).expect("poll");
            }
            GamePhase::GameOver | GamePhase::Abandoned => break,
            GamePhase::Waiting | GamePhase::Finished => {
                unreachable!("coordinator never parks in this phase")
            }
        }
    }
    game
}

#[test]
fn four_bots_play_a_full_game_to_target() {
    let game = run_game(7, 40_000);
    assert_eq!(game.phase(), GamePhase::GameOver);

    let scores = game.match_scores();
    assert!(scores.us >= MATCH_TARGET || scores.them >= MATCH_TARGET);
    assert!(!game.past_round_results().is_empty());

    // Every archived score matches the running totals.
    let (mut us, mut them) = (0, 0);
    for outcome in game.past_round_results() {
        us += outcome.us;
        them += outcome.them;
    }
    assert_eq!(us, scores.us);
    assert_eq!(them, scores.them);

    // Scored rounds conserve abnat per mode.
    for outcome in game.past_round_results() {
        if let (Some(score), Some(contract)) = (&outcome.score, &outcome.contract) {
            let total = score.us.card_points + score.them.card_points;
            let expected = match contract.mode() {
                crate::domain::cards::GameMode::Sun => 130,
                crate::domain::cards::GameMode::Hokum => 162,
            };
            assert_eq!(total, expected, "abnat total broken in round {}", outcome.round_no);
        }
    }
}

#[test]
fn card_conservation_holds_mid_round() {
    let mut game = seeded_game(11);
    game.start_game().expect("starts");
    assert_eq!(game.round_state().card_count_total(), 32);

    let bots: Vec<BrainBot> = (0..4).map(|i| BrainBot::new(Some(100 + i))).collect();
    let mut now_ms = 0i64;
    for _ in 0..200 {
        now_ms += 100;
        match game.phase() {
            GamePhase::Bidding => {
                let seat = game.current_turn();
                game.auto_bid(seat, &bots[seat as usize], now_ms).expect("bid");
                now_ms += 6_000;
                game.check_timeout_at(now_ms).expect("poll");
            }
            GamePhase::Playing => {
                let seat = game.current_turn();
                game.auto_play_card(seat, &bots[seat as usize]).expect("play");
            }
            _ => break,
        }
        assert_eq!(game.round_state().card_count_total(), 32);
    }
}

#[test]
fn add_player_rules() {
    let mut game = GameCoordinator::new(GameConfig::default());
    assert!(game.start_game().is_err());
    for i in 0..4 {
        game.add_player(format!("p{i}"), format!("P{i}")).expect("seat");
    }
    assert!(matches!(
        game.add_player("p5", "P5"),
        Err(DomainError::Input(_))
    ));
    game.start_game().expect("starts with four");
    assert!(matches!(
        game.add_player("late", "Late"),
        Err(DomainError::Phase(_))
    ));
}

#[test]
fn get_state_redacts_other_hands() {
    let mut game = seeded_game(3);
    game.start_game().expect("starts");

    let view = game.get_state(Some(0));
    assert_eq!(view.your_seat, Some(0));
    assert_eq!(view.hand.len(), 5);
    for seat in &view.seats {
        assert_eq!(seat.hand_count, 5);
    }

    let spectator = game.get_state(None);
    assert!(spectator.hand.is_empty());
    assert!(spectator.floor_card.is_some());
}

#[test]
fn snapshot_restore_is_a_fixed_point_in_bidding() {
    let mut game = seeded_game(5);
    game.start_game().expect("starts");
    let snapshot = game.snapshot();
    let restored = GameCoordinator::restore(snapshot.clone()).expect("restores");
    assert_eq!(restored.snapshot(), snapshot);

    // And through JSON, the way a host would persist it.
    let json = serde_json::to_string(&snapshot).expect("serialises");
    let back: crate::game::snapshot::GameSnapshot =
        serde_json::from_str(&json).expect("deserialises");
    assert_eq!(back, snapshot);
}

#[test]
fn snapshot_restore_fixed_point_mid_play_and_challenge() {
    let mut game = seeded_game(9);
    game.start_game().expect("starts");
    let bots: Vec<BrainBot> = (0..4).map(|i| BrainBot::new(Some(i))).collect();

    // Reach the playing phase.
    let mut now_ms = 0i64;
    for _ in 0..200 {
        if game.phase() == GamePhase::Playing {
            break;
        }
        now_ms += 100;
        let seat = game.current_turn();
        game.auto_bid(seat, &bots[seat as usize], now_ms).expect("bid");
        now_ms += 6_000;
        game.check_timeout_at(now_ms).expect("poll");
    }
    assert_eq!(game.phase(), GamePhase::Playing);

    // A few plays in, the snapshot still round-trips exactly.
    for _ in 0..3 {
        let seat = game.current_turn();
        game.auto_play_card(seat, &bots[seat as usize]).expect("play");
    }
    let snapshot = game.snapshot();
    let restored = GameCoordinator::restore(snapshot.clone()).expect("restores");
    assert_eq!(restored.snapshot(), snapshot);

    // Same through an active challenge.
    let accuser = game.current_turn();
    game.raise_qayd_at(accuser, now_ms).expect("raise");
    assert_eq!(game.phase(), GamePhase::Challenge);
    let snapshot = game.snapshot();
    let restored = GameCoordinator::restore(snapshot.clone()).expect("restores");
    assert_eq!(restored.snapshot(), snapshot);
    assert!(restored.is_locked());
}

#[test]
fn abort_is_idempotent_and_releases_the_lock() {
    let mut game = seeded_game(13);
    game.start_game().expect("starts");
    game.abort();
    assert_eq!(game.phase(), GamePhase::Abandoned);
    game.abort();
    assert_eq!(game.phase(), GamePhase::Abandoned);
    assert!(!game.is_locked());
    assert!(game.play_card(0, 0).is_err());
}

#[test]
fn restore_rejects_corrupt_card_counts() {
    let mut game = seeded_game(17);
    game.start_game().expect("starts");
    let mut snapshot = game.snapshot();
    snapshot.round.hands[0].pop();
    assert!(matches!(
        GameCoordinator::restore(snapshot),
        Err(DomainError::Fatal(_))
    ));
}
