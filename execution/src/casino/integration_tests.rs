//! Integration tests for the dice tables.
//!
//! These tests drive a full session through [Casino]: registration, rolls,
//! round changes, persistence, and exit.

#[cfg(test)]
mod tests {
    use crate::casino::{GameRng, PhaseEvent, SeededDice};
    use crate::mocks::{create_rules, create_seed, FlakyStore, ScriptedDice};
    use crate::{Casino, Error, FileStore, Memory, PersistenceError, State};
    use dicehouse_types::casino::{GameType, Outcome, Parity, RoundPhase, ValidationError};
    use dicehouse_types::execution::Key;
    use proptest::prelude::*;

    const NAME: &str = "Alexandra";

    fn parity_table(rolls: &[(u8, u8)]) -> Casino<Memory, ScriptedDice> {
        let mut casino = Casino::open(
            create_rules(GameType::Parity),
            Memory::default(),
            ScriptedDice::new(rolls),
        )
        .unwrap();
        casino.register(NAME).unwrap();
        casino
    }

    fn point_table(rolls: &[(u8, u8)]) -> Casino<Memory, ScriptedDice> {
        let mut casino = Casino::open(
            create_rules(GameType::Point),
            Memory::default(),
            ScriptedDice::new(rolls),
        )
        .unwrap();
        casino.register(NAME).unwrap();
        casino
    }

    #[test]
    fn test_register_starting_balances() {
        let casino = parity_table(&[]);
        let player = casino.player().unwrap();
        assert_eq!(player.name, NAME);
        assert_eq!(player.ledger.balance, 1_000);
        assert_eq!(player.ledger.wins, 0);
        assert_eq!(player.ledger.losses, 0);
        assert_eq!(casino.leaderboard().score(NAME), Some(1_000));
        assert_eq!(casino.state().get(&Key::Balance).unwrap().as_deref(), Some("1000"));

        let casino = point_table(&[]);
        assert_eq!(casino.current_balance(), Some(100));
        assert_eq!(casino.current_phase(), RoundPhase::ComeOut);
        assert_eq!(
            casino.state().get(&Key::Round).unwrap().as_deref(),
            Some(r#"{"phase":"comeOut"}"#)
        );
    }

    #[test]
    fn test_register_rejections() {
        let mut casino = Casino::open(
            create_rules(GameType::Parity),
            Memory::default(),
            ScriptedDice::default(),
        )
        .unwrap();

        assert!(matches!(
            casino.roll(10, Some(Parity::Even)),
            Err(Error::Validation(ValidationError::NotRegistered))
        ));
        assert!(matches!(
            casino.register("   "),
            Err(Error::Validation(ValidationError::EmptyName))
        ));
        assert!(matches!(
            casino.register("Ann"),
            Err(Error::Validation(ValidationError::NameTooShort { min: 5 }))
        ));
        assert!(matches!(
            casino.register("7Alexandra"),
            Err(Error::Validation(ValidationError::NameStartsWithDigit))
        ));
        assert!(casino.player().is_none());
        assert!(casino.state().is_empty());

        // Surrounding whitespace is trimmed before storing
        casino.register("  Alexandra  ").unwrap();
        assert_eq!(casino.player().unwrap().name, NAME);
        assert!(matches!(
            casino.register("Bartholomew"),
            Err(Error::Validation(ValidationError::AlreadyRegistered(name))) if name == NAME
        ));
    }

    #[test]
    fn test_parity_win_and_loss() {
        // 1+1 is even, 1+2 is odd
        let mut casino = parity_table(&[(1, 1), (1, 2)]);

        let rolled = casino.roll(100, Some(Parity::Even)).unwrap();
        assert_eq!(rolled.total, 2);
        assert_eq!(rolled.outcome, Some(Outcome::Won));
        assert_eq!(rolled.event, PhaseEvent::Settled);
        assert_eq!(rolled.balance, 1_100);

        let rolled = casino.roll(250, Some(Parity::Even)).unwrap();
        assert_eq!(rolled.outcome, Some(Outcome::Lost));
        assert_eq!(rolled.balance, 850);

        let player = casino.player().unwrap();
        assert_eq!(player.ledger.wins, 1);
        assert_eq!(player.ledger.losses, 1);
        assert_eq!(casino.leaderboard().score(NAME), Some(850));
        assert_eq!(casino.last_roll(), Some(&rolled));

        // Newest first
        let history: Vec<_> = casino.history().recent().collect();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].outcome, Outcome::Lost);
        assert_eq!(history[0].amount, 250);
        assert_eq!(history[0].total, 3);
        assert_eq!(history[0].bet_type, Some(Parity::Even));
        assert_eq!(history[1].outcome, Outcome::Won);

        assert_eq!(casino.state().get(&Key::Balance).unwrap().as_deref(), Some("850"));
        assert_eq!(casino.state().get(&Key::Losses).unwrap().as_deref(), Some("1"));
        assert_eq!(
            casino.state().get(&Key::Leaderboard).unwrap().as_deref(),
            Some(r#"[{"name":"Alexandra","score":850}]"#)
        );
    }

    #[test]
    fn test_parity_rejected_wager_changes_nothing() {
        let mut casino = parity_table(&[(2, 2)]);
        let before = casino.state().get(&Key::BetHistory).unwrap();

        assert!(matches!(
            casino.roll(1_001, Some(Parity::Odd)),
            Err(Error::Validation(ValidationError::ExceedsBalance { max: 1_000 }))
        ));
        assert!(matches!(
            casino.roll(0, Some(Parity::Odd)),
            Err(Error::Validation(ValidationError::NonPositiveAmount))
        ));
        assert!(matches!(
            casino.roll(10, None),
            Err(Error::Validation(ValidationError::MissingPick))
        ));

        assert_eq!(casino.current_balance(), Some(1_000));
        assert!(casino.history().is_empty());
        assert!(casino.last_roll().is_none());
        assert_eq!(casino.state().get(&Key::BetHistory).unwrap(), before);

        // The scripted roll was never consumed
        let rolled = casino.roll(1_000, Some(Parity::Even)).unwrap();
        assert_eq!(rolled.total, 4);
        assert_eq!(rolled.balance, 2_000);
    }

    #[test]
    fn test_parity_balance_can_reach_zero() {
        let mut casino = parity_table(&[(1, 2)]);
        let rolled = casino.roll(1_000, Some(Parity::Even)).unwrap();
        assert_eq!(rolled.balance, 0);

        assert!(matches!(
            casino.roll(1, Some(Parity::Even)),
            Err(Error::Validation(ValidationError::ExceedsBalance { max: 0 }))
        ));
    }

    #[test]
    fn test_point_natural_then_next_round() {
        let mut casino = point_table(&[(3, 4), (5, 6)]);

        let rolled = casino.roll(10, None).unwrap();
        assert_eq!(rolled.event, PhaseEvent::Natural(7));
        assert_eq!(rolled.outcome, Some(Outcome::Won));
        assert_eq!(rolled.balance, 110);
        assert_eq!(casino.current_phase(), RoundPhase::Resolved);

        // Resolved rounds refuse rolls until re-armed
        assert!(matches!(
            casino.roll(10, None),
            Err(Error::Validation(ValidationError::RoundResolved))
        ));

        assert!(casino.next_round().unwrap());
        assert_eq!(casino.current_phase(), RoundPhase::ComeOut);
        assert!(casino.last_roll().is_none());
        assert!(!casino.next_round().unwrap());

        let rolled = casino.roll(20, None).unwrap();
        assert_eq!(rolled.event, PhaseEvent::Natural(11));
        assert_eq!(rolled.balance, 130);
        assert_eq!(casino.history().len(), 2);
    }

    #[test]
    fn test_point_established_then_seven_out() {
        let mut casino = point_table(&[(2, 4), (1, 3), (3, 4)]);

        let rolled = casino.roll(25, Some(Parity::Odd)).unwrap();
        assert_eq!(rolled.event, PhaseEvent::PointEstablished(6));
        assert_eq!(rolled.outcome, None);
        assert_eq!(rolled.balance, 100);
        assert_eq!(casino.current_phase(), RoundPhase::Point(6));
        assert_eq!(casino.locked_wager(), Some(25));
        assert!(casino.history().is_empty());
        assert_eq!(
            casino.state().get(&Key::Round).unwrap().as_deref(),
            Some(r#"{"phase":"point","point":6,"wager":25}"#)
        );

        assert!(matches!(
            casino.roll(30, None),
            Err(Error::Validation(ValidationError::WagerLocked { locked: 25 }))
        ));

        let rolled = casino.roll(25, None).unwrap();
        assert_eq!(rolled.event, PhaseEvent::NoDecision);
        assert_eq!(casino.current_phase(), RoundPhase::Point(6));

        let rolled = casino.roll(25, None).unwrap();
        assert_eq!(rolled.event, PhaseEvent::SevenOut);
        assert_eq!(rolled.outcome, Some(Outcome::Lost));
        assert_eq!(rolled.balance, 75);
        assert_eq!(casino.current_phase(), RoundPhase::Resolved);
        assert_eq!(casino.locked_wager(), None);

        // One resolved round, one record, no parity pick on this table
        assert_eq!(casino.history().len(), 1);
        let record = casino.history().last().unwrap();
        assert_eq!(record.total, 7);
        assert_eq!(record.bet_type, None);
        assert_eq!(casino.player().unwrap().ledger.losses, 1);
    }

    #[test]
    fn test_point_table_max() {
        let mut casino = point_table(&[(6, 6), (1, 1)]);
        assert!(matches!(
            casino.roll(101, None),
            Err(Error::Validation(ValidationError::ExceedsTableMax { max: 100 }))
        ));

        // The cap is fixed, so the balance may go negative
        let rolled = casino.roll(100, None).unwrap();
        assert_eq!(rolled.event, PhaseEvent::Craps(12));
        assert_eq!(rolled.balance, 0);
        casino.next_round().unwrap();
        let rolled = casino.roll(100, None).unwrap();
        assert_eq!(rolled.balance, -100);
        assert_eq!(casino.leaderboard().score(NAME), Some(-100));
    }

    #[test]
    fn test_reopen_resumes_session() {
        let mut store = Memory::default();
        {
            let mut casino = Casino::open(
                create_rules(GameType::Parity),
                &mut store,
                ScriptedDice::new(&[(3, 3), (2, 3)]),
            )
            .unwrap();
            casino.register(NAME).unwrap();
            casino.roll(40, Some(Parity::Even)).unwrap();
            casino.roll(15, Some(Parity::Even)).unwrap();
        }

        let casino = Casino::open(
            create_rules(GameType::Parity),
            &mut store,
            ScriptedDice::default(),
        )
        .unwrap();
        let player = casino.player().unwrap();
        assert_eq!(player.name, NAME);
        assert_eq!(player.ledger.balance, 1_025);
        assert_eq!(player.ledger.wins, 1);
        assert_eq!(player.ledger.losses, 1);
        assert_eq!(casino.history().len(), 2);
        assert_eq!(casino.history().last().unwrap().amount, 15);
        assert_eq!(casino.leaderboard().rank(NAME), Some(1));
        assert!(casino.last_roll().is_none());
    }

    #[test]
    fn test_reopen_mid_point() {
        let mut store = Memory::default();
        {
            let mut casino = Casino::open(
                create_rules(GameType::Point),
                &mut store,
                ScriptedDice::new(&[(4, 4)]),
            )
            .unwrap();
            casino.register(NAME).unwrap();
            casino.roll(10, None).unwrap();
        }

        let mut casino = Casino::open(
            create_rules(GameType::Point),
            &mut store,
            ScriptedDice::new(&[(5, 3)]),
        )
        .unwrap();
        assert_eq!(casino.current_phase(), RoundPhase::Point(8));
        assert_eq!(casino.locked_wager(), Some(10));

        let rolled = casino.roll(10, None).unwrap();
        assert_eq!(rolled.event, PhaseEvent::PointMade(8));
        assert_eq!(rolled.balance, 110);
    }

    #[test]
    fn test_new_player_after_exit() {
        let mut store = Memory::default();
        {
            let mut casino = Casino::open(
                create_rules(GameType::Parity),
                &mut store,
                ScriptedDice::new(&[(1, 1)]),
            )
            .unwrap();
            casino.register(NAME).unwrap();
            casino.roll(300, Some(Parity::Even)).unwrap();
            casino.exit().unwrap();
        }
        assert!(store.is_empty());

        let mut casino = Casino::open(
            create_rules(GameType::Parity),
            &mut store,
            ScriptedDice::default(),
        )
        .unwrap();
        assert!(casino.player().is_none());
        assert!(casino.leaderboard().is_empty());

        let player = casino.register("Bartholomew").unwrap();
        assert_eq!(player.ledger.balance, 1_000);
        assert_eq!(casino.leaderboard().len(), 1);
        assert_eq!(casino.leaderboard().rank("Bartholomew"), Some(1));
        assert_eq!(casino.leaderboard().score(NAME), None);
    }

    #[test]
    fn test_exit_clears_store() {
        let mut casino = point_table(&[(2, 2)]);
        casino.roll(10, None).unwrap();
        assert!(!casino.state().is_empty());

        casino.exit().unwrap();
        assert!(casino.player().is_none());
        assert!(casino.history().is_empty());
        assert!(casino.leaderboard().is_empty());
        assert_eq!(casino.current_phase(), RoundPhase::ComeOut);
        assert!(casino.state().is_empty());

        // Exiting again is harmless
        casino.exit().unwrap();
        assert!(matches!(
            casino.roll(10, None),
            Err(Error::Validation(ValidationError::NotRegistered))
        ));
    }

    #[test]
    fn test_persistence_failure_keeps_memory() {
        let store = FlakyStore::default();
        let switch = store.switch();
        let writes = store.writes();
        let mut casino = Casino::open(
            create_rules(GameType::Point),
            store,
            ScriptedDice::new(&[(5, 6)]),
        )
        .unwrap();
        casino.register(NAME).unwrap();
        let accepted = writes.get();

        switch.set(true);
        assert!(matches!(
            casino.roll(10, None),
            Err(Error::Persistence(PersistenceError::Unavailable(_)))
        ));
        assert_eq!(writes.get(), accepted);

        // The roll still happened
        assert_eq!(casino.current_balance(), Some(110));
        assert_eq!(casino.last_roll().unwrap().outcome, Some(Outcome::Won));
        assert_eq!(casino.history().len(), 1);
        assert!(casino.has_pending());
        assert_eq!(casino.state().get(&Key::Balance).unwrap().as_deref(), Some("100"));

        // The next successful commit carries the staged keys
        switch.set(false);
        assert!(casino.next_round().unwrap());
        assert!(!casino.has_pending());
        assert_eq!(casino.state().get(&Key::Balance).unwrap().as_deref(), Some("110"));
        assert_eq!(casino.state().get(&Key::Wins).unwrap().as_deref(), Some("1"));
        assert_eq!(
            casino.state().get(&Key::Round).unwrap().as_deref(),
            Some(r#"{"phase":"comeOut"}"#)
        );
    }

    #[test]
    fn test_corrupt_value_refuses_open() {
        let mut store = Memory::default();
        store.insert(Key::PlayerName, NAME.to_string()).unwrap();
        store.insert(Key::Balance, "plenty".to_string()).unwrap();

        let result = Casino::open(
            create_rules(GameType::Parity),
            &mut store,
            ScriptedDice::default(),
        );
        assert!(matches!(
            result,
            Err(Error::Persistence(PersistenceError::Corrupt {
                key: Key::Balance,
                ..
            }))
        ));

        store.insert(Key::Balance, "900".to_string()).unwrap();
        store
            .insert(Key::BetHistory, "not json".to_string())
            .unwrap();
        let result = Casino::open(
            create_rules(GameType::Parity),
            &mut store,
            ScriptedDice::default(),
        );
        assert!(matches!(
            result,
            Err(Error::Persistence(PersistenceError::Corrupt {
                key: Key::BetHistory,
                ..
            }))
        ));
    }

    #[test]
    fn test_corrupt_round_refuses_open() {
        let mut store = Memory::default();
        store.insert(Key::PlayerName, NAME.to_string()).unwrap();
        store
            .insert(
                Key::Round,
                r#"{"phase":"point","point":7,"wager":10}"#.to_string(),
            )
            .unwrap();

        let result = Casino::open(
            create_rules(GameType::Point),
            &mut store,
            ScriptedDice::default(),
        );
        assert!(matches!(
            result,
            Err(Error::Persistence(PersistenceError::Corrupt {
                key: Key::Round,
                ..
            }))
        ));

        // The parity table never reads the round
        let casino = Casino::open(
            create_rules(GameType::Parity),
            &mut store,
            ScriptedDice::default(),
        )
        .unwrap();
        assert_eq!(casino.current_balance(), Some(1_000));
    }

    #[test]
    fn test_seeded_sessions_repeat() {
        let play = |seed: [u8; 32]| {
            let mut casino = Casino::open(
                create_rules(GameType::Point),
                Memory::default(),
                GameRng::new(&seed, 0, 0),
            )
            .unwrap();
            casino.register(NAME).unwrap();
            let mut totals = Vec::new();
            for _ in 0..50 {
                if casino.current_phase() == RoundPhase::Resolved {
                    casino.next_round().unwrap();
                }
                totals.push(casino.roll(1, None).unwrap().total);
            }
            (totals, casino.current_balance())
        };

        let first = play(create_seed(7));
        assert_eq!(first, play(create_seed(7)));
        assert_ne!(first.0, play(create_seed(8)).0);
    }

    #[test]
    fn test_seeded_dice_continue_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let seed = create_seed(11);
        {
            let mut casino = Casino::open(
                create_rules(GameType::Parity),
                FileStore::open(dir.path()).unwrap(),
                SeededDice::new(seed),
            )
            .unwrap();
            casino.register(NAME).unwrap();
        }

        // One roll per open, the way the command line plays
        let mut totals = Vec::new();
        for _ in 0..12 {
            let mut casino = Casino::open(
                create_rules(GameType::Parity),
                FileStore::open(dir.path()).unwrap(),
                SeededDice::new(seed),
            )
            .unwrap();
            totals.push(casino.roll(1, Some(Parity::Even)).unwrap().total);
        }
        assert!(totals.iter().any(|total| *total != totals[0]));

        // Same sequence as a single long session
        let mut dice = SeededDice::new(seed);
        let expected: Vec<u8> = (0..12).map(|_| dice.roll().total()).collect();
        assert_eq!(totals, expected);

        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(store.get(&Key::Rolls).unwrap().as_deref(), Some("12"));
    }

    #[test]
    fn test_file_store_resumes_mid_point() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut casino = Casino::open(
                create_rules(GameType::Point),
                FileStore::open(dir.path().join("session")).unwrap(),
                ScriptedDice::new(&[(5, 4)]),
            )
            .unwrap();
            casino.register(NAME).unwrap();
            casino.roll(30, None).unwrap();
        }

        let mut casino = Casino::open(
            create_rules(GameType::Point),
            FileStore::open(dir.path().join("session")).unwrap(),
            ScriptedDice::new(&[(1, 6)]),
        )
        .unwrap();
        assert_eq!(casino.player().unwrap().name, NAME);
        assert_eq!(casino.current_phase(), RoundPhase::Point(9));
        assert_eq!(casino.locked_wager(), Some(30));

        let rolled = casino.roll(30, None).unwrap();
        assert_eq!(rolled.event, PhaseEvent::SevenOut);
        assert_eq!(rolled.balance, 70);
        casino.exit().unwrap();

        let casino = Casino::open(
            create_rules(GameType::Point),
            FileStore::open(dir.path().join("session")).unwrap(),
            ScriptedDice::default(),
        )
        .unwrap();
        assert!(casino.player().is_none());
    }

    #[test]
    fn test_refused_round_write_settles_once() {
        let mut store = FlakyStore::default();
        let refuse = store.refuse();
        {
            let mut casino = Casino::open(
                create_rules(GameType::Point),
                &mut store,
                ScriptedDice::new(&[(3, 3), (2, 4)]),
            )
            .unwrap();
            casino.register(NAME).unwrap();
            casino.roll(10, None).unwrap();

            refuse.set(Some(Key::Round));
            assert!(matches!(
                casino.roll(10, None),
                Err(Error::Persistence(PersistenceError::Unavailable(_)))
            ));
            assert_eq!(casino.current_balance(), Some(110));
        }

        // The batch stopped at the round, so the ledger never moved on disk
        refuse.set(None);
        assert_eq!(store.get(&Key::Balance).unwrap().as_deref(), Some("100"));
        assert_eq!(store.get(&Key::Wins).unwrap().as_deref(), Some("0"));

        let mut casino = Casino::open(
            create_rules(GameType::Point),
            &mut store,
            ScriptedDice::new(&[(1, 5)]),
        )
        .unwrap();
        assert_eq!(casino.current_phase(), RoundPhase::Point(6));
        let rolled = casino.roll(10, None).unwrap();
        assert_eq!(rolled.event, PhaseEvent::PointMade(6));
        assert_eq!(rolled.balance, 110);
        assert_eq!(casino.history().len(), 1);
    }

    proptest! {
        /// Property: on the point table a roll moves the balance by exactly the
        /// wager when it decides the round and leaves it alone otherwise.
        #[test]
        fn prop_point_rolls_settle_once(
            rolls in prop::collection::vec((1u8..=6, 1u8..=6), 1..40),
            amount in 1u64..=100,
        ) {
            let mut casino = point_table(&rolls);
            let mut decided = 0;
            for _ in 0..rolls.len() {
                if casino.current_phase() == RoundPhase::Resolved {
                    prop_assert!(casino.next_round().unwrap());
                }
                let before = casino.current_balance().unwrap();
                let phase = casino.current_phase();
                let rolled = casino.roll(amount, None).unwrap();
                let delta = rolled.balance - before;
                match rolled.outcome {
                    Some(Outcome::Won) => {
                        prop_assert_eq!(delta, amount as i64);
                    }
                    Some(Outcome::Lost) => {
                        prop_assert_eq!(delta, -(amount as i64));
                    }
                    None => {
                        prop_assert_eq!(delta, 0);
                        // Point numbers on the come-out only set the point
                        if phase == RoundPhase::ComeOut {
                            prop_assert_eq!(
                                casino.current_phase(),
                                RoundPhase::Point(rolled.total)
                            );
                        }
                    }
                }
                if rolled.outcome.is_some() {
                    decided += 1;
                }
            }
            prop_assert_eq!(casino.history().len(), decided);
            prop_assert_eq!(
                casino.state().get(&Key::Rolls).unwrap(),
                Some(rolls.len().to_string())
            );
        }
    }
}
