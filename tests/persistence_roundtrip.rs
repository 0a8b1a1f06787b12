use std::fs;

use anyhow::Result;
use tabular_q_learning::ql::learn::q_learner::{Parameter, QLearner};
use tabular_q_learning::ql::prelude::QlError;
use tabular_q_learning::ql::random::RandomSource;

mod common;

fn learner_with_seed(seed: u64) -> QLearner {
    QLearner::new(Parameter::default(), RandomSource::from_seed(seed))
}

#[test]
fn save_then_load_reproduces_a_learned_table() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("q.json");

    let mut learner = learner_with_seed(11);
    learner.add("hall", "kitchen", 1.5, "east");
    learner.add("kitchen", "pantry", -0.25, "east");
    learner.add("pantry", "hall", 10.0, "portal");
    learner.learn(50);
    learner.save(&path)?;

    let mut restored = learner_with_seed(0);
    restored.load(&path)?;

    assert_eq!(restored.table(), learner.table());
    Ok(())
}

#[test]
fn the_empty_table_round_trips() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("q.json");

    let learner = learner_with_seed(0);
    learner.save(&path)?;
    assert_eq!(fs::read_to_string(&path)?, "{}");

    let mut restored = learner_with_seed(0);
    restored.load(&path)?;
    assert!(restored.table().is_empty());
    Ok(())
}

#[test]
fn loading_a_missing_path_bootstraps_an_empty_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("fresh.json");
    assert!(!path.exists());

    let mut learner = learner_with_seed(0);
    learner.load(&path)?;

    assert!(learner.table().is_empty());
    assert_eq!(fs::read_to_string(&path)?, "{}");
    Ok(())
}

#[test]
fn a_corrupt_file_fails_to_decode_and_leaves_the_table_intact() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("q.json");
    fs::write(&path, "not a table {{{")?;

    let mut learner = learner_with_seed(0);
    learner.add("A", "B", 5.0, "go");

    let err = learner.load(&path).unwrap_err();
    assert!(matches!(err, QlError::Decode(_)));
    assert_eq!(learner.value("A", "go"), 5.0);
    Ok(())
}

#[test]
fn an_unreachable_target_surfaces_a_storage_error() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("missing-subdir").join("q.json");

    let learner = learner_with_seed(0);
    let err = learner.save(&path).unwrap_err();
    assert!(matches!(err, QlError::Storage(_)));
    Ok(())
}
