#![cfg(feature = "gym")]

use kickoff::{
    env::Environment,
    gym::{Move, Pitch},
    ActionValueTable, Error, QTableAgent, QTableAgentConfig, State,
};
use tempfile::TempDir;

fn config() -> QTableAgentConfig {
    QTableAgentConfig {
        max_steps: 300,
        ..Default::default()
    }
}

#[test]
fn training_fills_the_table_and_survives_a_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("q_values.msgpack");

    let mut agent = QTableAgent::<Move, 6>::seeded(config(), Pitch::actions(), 2024).unwrap();
    let mut env = Pitch::new();
    for _ in 0..3 {
        let summary = agent.go(&mut env).unwrap();
        assert!(summary.steps > 0);
        assert!(summary.steps <= 300);
    }
    assert_eq!(agent.episode(), 3);
    assert!(!agent.table().is_empty());
    for (_, values) in agent.table().iter() {
        assert_eq!(values.len(), 4);
    }

    agent.save(&path).unwrap();
    let loaded = ActionValueTable::<Move, 6>::load(&path).unwrap();
    assert_eq!(&loaded, agent.table());

    let mut resumed = QTableAgent::<Move, 6>::seeded(config(), Pitch::actions(), 7).unwrap();
    resumed.load(&path).unwrap();
    assert_eq!(resumed.table(), agent.table());
}

#[test]
fn seeded_training_is_reproducible() {
    let train = || {
        let mut agent = QTableAgent::<Move, 6>::seeded(config(), Pitch::actions(), 99).unwrap();
        let mut env = Pitch::new();
        let steps = (0..2)
            .map(|_| agent.go(&mut env).unwrap().steps)
            .collect::<Vec<_>>();
        (steps, agent.into_table())
    };
    assert_eq!(train(), train());
}

#[test]
fn manual_loop_matches_the_documented_update() {
    let greedy = QTableAgentConfig {
        epsilon: 0.0,
        ..Default::default()
    };
    let mut agent = QTableAgent::<Move, 6>::seeded(greedy, Pitch::actions(), 0).unwrap();
    let mut env = Pitch::new();

    let state = env.reset();
    let action = agent.select_action(&state).unwrap();
    let step = env.step(action);
    let q = agent.learn(&state, action, &step.state, 1.0).unwrap();

    assert_eq!(q, 0.1);
    let table = agent.table_mut();
    for other in Pitch::actions().into_iter().filter(|&a| a != action) {
        assert_eq!(table.get(&state, other).unwrap(), 0.0);
    }
    assert_eq!(table.get_max(&step.state), 0.0);
}

#[test]
fn scoring_transition_is_learned() {
    let config = QTableAgentConfig {
        alpha: 1.0,
        epsilon: 0.0,
        ..Default::default()
    };
    let mut agent = QTableAgent::<Move, 6>::seeded(config, vec![Move::Right], 0).unwrap();
    let mut env = Pitch::with_positions([690.0, 300.0], [765.0, 300.0]);

    let state = env.observe();
    let step = env.step(Move::Right);
    assert!(step.done);
    agent.table_mut().mark_terminal(&step.state);
    agent.learn(&state, Move::Right, &step.state, step.reward).unwrap();

    assert_eq!(agent.table_mut().get(&state, Move::Right).unwrap(), 1.0);
}

#[test]
fn unknown_states_are_exact_keys() {
    let mut agent = QTableAgent::<Move, 6>::seeded(config(), Pitch::actions(), 0).unwrap();
    let s = State::new([400.0, 300.0, 200.0, 150.0, 0.0, 0.0]);
    let nudged = State::new([400.0, 300.0, 200.0, 150.0, 0.0, -0.0]);
    agent.learn(&s, Move::Up, &s, 1.0).unwrap();
    assert!(agent.table().contains(&s));
    assert!(!agent.table().contains(&nudged));
    assert!(matches!(
        agent.load(TempDir::new().unwrap().path().join("none")),
        Err(Error::NotFound { .. })
    ));
}
