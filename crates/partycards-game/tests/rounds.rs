//! Whole-game scenarios and invariant checks for the round state machine.

use std::collections::HashSet;
use std::sync::Arc;

use partycards_game::{CardPool, GameConfig, GameError, GameSession, Phase};
use partycards_protocol::{PlayerName, ResponseCard};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn name(s: &str) -> PlayerName {
    PlayerName::new(s)
}

fn pool(prompts: usize, responses: usize) -> Arc<CardPool> {
    Arc::new(
        CardPool::new(
            (0..prompts).map(|i| format!("Prompt {i}: ____.")),
            (0..responses).map(|i| format!("Response {i}")),
        )
        .unwrap(),
    )
}

/// Checks every invariant that must hold between actions.
fn assert_invariants(session: &GameSession) {
    let hand_size = session.config().hand_size;
    let mut seen: HashSet<ResponseCard> = HashSet::new();

    for player in session.players() {
        assert!(
            player.hand().len() <= hand_size,
            "{} holds {} cards",
            player.name(),
            player.hand().len()
        );
        for card in player.hand() {
            assert!(seen.insert(card.clone()), "card {card} dealt twice");
        }
    }
    for (owner, card) in session.submissions() {
        assert!(seen.insert(card.clone()), "played card {card} also in a hand");
        assert!(session.player(owner).is_some(), "submission from departed {owner}");
    }

    if let Some(judge) = session.judge() {
        assert!(
            !session.submissions().contains_key(judge),
            "judge {judge} has a card in play"
        );
    }
    assert_eq!(session.is_started(), session.phase() == Phase::RoundInProgress);
    assert_eq!(session.is_started(), session.current_prompt().is_some());
}

#[test]
fn scenario_three_players_first_round() {
    let mut session = GameSession::new(pool(5, 60), GameConfig::default());
    for p in ["A", "B", "C"] {
        session.add_player(name(p)).unwrap();
    }
    session.start().unwrap();
    let p1 = session.current_prompt().cloned().unwrap();
    assert_eq!(session.judge(), Some(&name("A")));

    session.submit(&name("B"), 0).unwrap();
    assert!(!session.is_ready_to_judge());
    session.submit(&name("C"), 4).unwrap();
    assert!(session.is_ready_to_judge());
    assert_eq!(session.submissions().len(), 2);

    let outcome = session.choose_winner(&name("A"), &name("B")).unwrap();

    assert_eq!(outcome.winner, name("B"));
    assert_eq!(outcome.prompt, p1);
    assert_eq!(session.player(&name("B")).unwrap().score(), 1);
    assert_eq!(session.judge(), Some(&name("B")));
    assert!(session.submissions().is_empty());
    assert_ne!(session.current_prompt(), Some(&p1));
    assert_invariants(&session);
}

#[test]
fn scenario_single_prompt_finishes_after_first_round() {
    let mut session = GameSession::new(pool(1, 60), GameConfig::default());
    for p in ["A", "B", "C"] {
        session.add_player(name(p)).unwrap();
    }
    session.start().unwrap();
    session.submit(&name("B"), 0).unwrap();
    session.submit(&name("C"), 0).unwrap();
    session.choose_winner(&name("A"), &name("B")).unwrap();

    assert_eq!(session.phase(), Phase::Finished);
    assert!(!session.is_started());
    assert_eq!(session.current_prompt(), None);
    assert_eq!(session.player(&name("B")).unwrap().score(), 1);
}

#[test]
fn scenario_submitter_disconnects_round_still_judgeable() {
    let mut session = GameSession::new(pool(5, 60), GameConfig::default());
    for p in ["A", "B", "C"] {
        session.add_player(name(p)).unwrap();
    }
    session.start().unwrap();

    session.submit(&name("B"), 0).unwrap();
    session.remove_player(&name("B")).unwrap();
    assert_invariants(&session);

    session.submit(&name("C"), 0).unwrap();
    assert!(session.is_ready_to_judge());
    assert_eq!(
        session.choose_winner(&name("A"), &name("B")),
        Err(GameError::NoSubmission(name("B")))
    );
    session.choose_winner(&name("A"), &name("C")).unwrap();
    assert_eq!(session.player(&name("C")).unwrap().score(), 1);
    assert_invariants(&session);
}

#[test]
fn scores_change_only_for_the_winner() {
    let mut session = GameSession::new(pool(10, 200), GameConfig::default());
    for p in ["A", "B", "C", "D"] {
        session.add_player(name(p)).unwrap();
    }
    session.start().unwrap();

    while session.is_started() {
        let judge = session.judge().cloned().unwrap();
        let players: Vec<PlayerName> = session.players().iter().map(|p| p.name().clone()).collect();
        for p in players.iter().filter(|p| **p != judge) {
            session.submit(p, 0).unwrap();
        }
        let winner = players.iter().find(|p| **p != judge).cloned().unwrap();
        let before: Vec<u32> = session.players().iter().map(|p| p.score()).collect();

        session.choose_winner(&judge, &winner).unwrap();

        for (player, old) in session.players().iter().zip(before) {
            let expected = if *player.name() == winner { old + 1 } else { old };
            assert_eq!(player.score(), expected);
        }
        assert_invariants(&session);
    }

    let total: u32 = session.players().iter().map(|p| p.score()).sum();
    assert_eq!(total, 10);
}

#[test]
fn scenario_starved_player_round_still_judgeable() {
    let mut session = GameSession::new(pool(3, 8), GameConfig::default());
    for p in ["A", "B", "C"] {
        session.add_player(name(p)).unwrap();
    }
    session.start().unwrap();
    assert!(session.player(&name("C")).unwrap().hand().is_empty());

    session.submit(&name("B"), 0).unwrap();
    assert!(session.is_ready_to_judge());
    session.choose_winner(&name("A"), &name("B")).unwrap();

    assert_eq!(session.player(&name("B")).unwrap().score(), 1);
    assert_invariants(&session);
}

/// Plays full-size rooms on the built-in cards: every round must become
/// judgeable until the game ends.
#[test]
fn large_rooms_on_builtin_cards_play_to_finish() {
    for players in [9, 10] {
        let mut rng = StdRng::seed_from_u64(players as u64);
        let mut session = GameSession::new(Arc::new(CardPool::builtin()), GameConfig::default());
        for i in 0..players {
            session.add_player(name(&format!("P{i}"))).unwrap();
        }
        session.start_with(&mut rng).unwrap();

        let mut rounds = 0;
        while session.is_started() {
            let judge = session.judge().cloned().unwrap();
            let holders: Vec<PlayerName> = session
                .players()
                .iter()
                .filter(|p| *p.name() != judge && !p.hand().is_empty())
                .map(|p| p.name().clone())
                .collect();
            assert!(!holders.is_empty(), "round {rounds} has no one able to play");
            for p in &holders {
                session.submit(p, 0).unwrap();
            }
            assert!(session.is_ready_to_judge(), "round {rounds} never became ready");

            session.choose_winner(&judge, &holders[0]).unwrap();
            assert_invariants(&session);
            rounds += 1;
        }

        assert_eq!(session.phase(), Phase::Finished);
        assert!(rounds > 0 && rounds <= CardPool::builtin().prompts().len());
        let total: u32 = session.players().iter().map(|p| p.score()).sum();
        assert_eq!(total as usize, rounds);
    }
}

/// Drives many random games through joins, leaves, plays, and picks, and
/// checks invariants after every step.
#[test]
fn random_action_sequences_keep_invariants() {
    for seed in 0..40u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut session = GameSession::new(pool(6, 45), GameConfig::default());
        let mut next_id = 0;

        for _ in 0..300 {
            match rng.random_range(0..10) {
                0 => {
                    let _ = session.add_player(name(&format!("P{next_id}")));
                    next_id += 1;
                }
                1 => {
                    if !session.is_empty() {
                        let i = rng.random_range(0..session.player_count());
                        let who = session.players()[i].name().clone();
                        session.remove_player(&who).unwrap();
                    }
                }
                2 => {
                    let _ = session.start_with(&mut rng);
                }
                3..=6 => {
                    if !session.is_empty() {
                        let i = rng.random_range(0..session.player_count());
                        let who = session.players()[i].name().clone();
                        let index = rng.random_range(0..9);
                        let had = session.submissions().contains_key(&who);
                        let result = session.submit(&who, index);
                        if had {
                            assert_eq!(result, Err(GameError::AlreadySubmitted(who)));
                        }
                    }
                }
                _ => {
                    if let Some(judge) = session.judge().cloned() {
                        let pick = session.submissions().keys().next().cloned();
                        if let Some(winner) = pick {
                            let ready = session.is_ready_to_judge();
                            let result = session.choose_winner(&judge, &winner);
                            assert_eq!(result.is_ok(), ready);
                            if ready {
                                assert!(session.submissions().is_empty());
                            }
                        }
                    }
                }
            }
            assert_invariants(&session);
        }
    }
}
