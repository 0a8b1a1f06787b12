use std::path::Path;

use crate::ql::graph::{State, StateGraph};
use crate::ql::persist;
use crate::ql::prelude::{ActionId, Result, StateId};
use crate::ql::random::RandomSource;
use crate::ql::table::QTable;

/// Learning constants, fixed for the lifetime of an engine.
#[derive(Debug, Clone, Copy)]
pub struct Parameter {
    /// Discount factor: attenuates the value contributed by future states
    pub gamma: f64,
    /// Learning rate: how strongly a new estimate overwrites the old one
    pub alpha: f64,
}

impl Default for Parameter {
    fn default() -> Self {
        Self { gamma: 0.8, alpha: 0.8 }
    }
}

/// Tabular Q-learning engine over a graph of recorded transitions.
///
/// The caller feeds it real observed transitions via [`QLearner::add`] and
/// lets it refine the value table by replaying random walks over the graph
/// built from those observations ([`QLearner::step`] / [`QLearner::learn`]).
/// Each replayed step applies the canonical one-step backup
///
/// `newQ = (1 - α)·Q(s, a) + α·(reward(a) + γ·max_a' Q(s', a'))`
///
/// so every real observation yields learning signal many times over.
///
/// Absent data is never an error: operations on unknown states, or states
/// without outgoing actions, return `None` and leave the engine unchanged,
/// so it is safe to drive before any data exists.
pub struct QLearner {
    param: Parameter,
    random: RandomSource,
    graph: StateGraph,
    table: QTable,
    current: Option<StateId>,
}

impl QLearner {
    pub fn new(param: Parameter, random: RandomSource) -> Self {
        Self {
            param,
            random,
            graph: StateGraph::new(),
            table: QTable::new(),
            current: None,
        }
    }

    pub fn param(&self) -> &Parameter {
        &self.param
    }

    /// Records a transition observed in the real environment.
    ///
    /// Both state names are registered on first mention. The immediate reward
    /// seeds `Q(from, action)` directly (a calibration write, not the
    /// discounted update) and the corresponding graph edge is created for
    /// later replay.
    pub fn add(&mut self, from: &str, to: &str, reward: f64, action: &str) {
        self.table.set_value(from, action, reward);
        self.graph.add_action(from, to, reward, action);
    }

    /// Idempotent state registration.
    pub fn add_state(&mut self, name: &str) -> &State {
        self.graph.add_state(name)
    }

    /// Moves the current position, registering the state if unseen.
    ///
    /// The current position only drives the internal replay stepping; it has
    /// no meaning for the caller's own transition recording.
    pub fn set_position(&mut self, name: &str) -> &State {
        let state = self.graph.add_state(name);
        self.current = Some(state.name().clone());
        state
    }

    pub fn position(&self) -> Option<&StateId> {
        self.current.as_ref()
    }

    /// Follows the named action from the current position, if that edge
    /// exists, and returns the new position.
    pub fn apply_action(&mut self, name: &str) -> Option<&StateId> {
        let current = self.current.clone()?;
        let action = self.graph.state(current.as_str())?.action(name)?;
        self.current = Some(action.next_state().clone());
        self.current.as_ref()
    }

    /// Chooses the best known action at the current position and follows it.
    pub fn run_once(&mut self) -> Option<&StateId> {
        let current = self.current.clone()?;
        let best = self.table.best_action(current.as_str(), &mut self.random)?;
        self.apply_action(best.as_str())
    }

    /// One simulated backup step.
    ///
    /// Picks a random position when none is set (`None` if no states exist),
    /// draws a uniformly random outgoing action (`None` if the position has
    /// none), applies the backup rule to `Q(position, action)` and advances
    /// the position to the action's destination.
    pub fn step(&mut self) -> Option<&StateId> {
        if self.current.is_none() {
            self.current = self.random_position();
        }
        let current = self.current.clone()?;

        let action = self
            .graph
            .state(current.as_str())?
            .random_action(&mut self.random)?;
        let action_name = action.name().clone();
        let action_reward = action.reward();
        let next = action.next_state().clone();

        let old_q = self.table.value(current.as_str(), action_name.as_str());
        let max_q = self.table.best_value(next.as_str());
        let new_q =
            (1.0 - self.param.alpha) * old_q + self.param.alpha * (action_reward + self.param.gamma * max_q);
        self.table.set_value(current.as_str(), action_name.as_str(), new_q);

        log::trace!("step {current} -[{action_name}]-> {next}: Q {old_q} -> {new_q}");

        self.current = Some(next);
        self.current.as_ref()
    }

    /// Runs `steps` independent single-step backups, each from a fresh random
    /// starting position. Clamped to at least one step.
    pub fn learn(&mut self, steps: usize) {
        let steps = steps.max(1);
        for _ in 0..steps {
            self.current = self.random_position();
            self.step();
        }
        log::debug!(
            "learned {} steps over {} states ({} with recorded values)",
            steps,
            self.graph.len(),
            self.table.len()
        );
    }

    /// Training-time selector: stochastic tie-break (see [`QTable::best_action`]).
    pub fn best_action(&mut self, state: &str) -> Option<ActionId> {
        self.table.best_action(state, &mut self.random)
    }

    /// Evaluation-time selector: deterministic, first action wins ties.
    pub fn predict_action(&self, state: &str) -> Option<ActionId> {
        self.table.predict_action(state)
    }

    pub fn value(&self, state: &str, action: &str) -> f64 {
        self.table.value(state, action)
    }

    pub fn set_value(&mut self, state: &str, action: &str, value: f64) {
        self.table.set_value(state, action, value);
    }

    pub fn knows_action(&self, state: &str, action: &str) -> bool {
        self.table.knows_action(state, action)
    }

    pub fn best_value(&self, state: &str) -> f64 {
        self.table.best_value(state)
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    pub fn graph(&self) -> &StateGraph {
        &self.graph
    }

    /// Restarts the random sequence; a run is replayable from one seed.
    pub fn reseed(&mut self, seed: u64) {
        self.random.reseed(seed);
    }

    /// Writes the whole value table to `path`, atomically visible.
    pub fn save(&self, path: &Path) -> Result<()> {
        persist::save(&self.table, path)
    }

    /// Replaces the in-memory table with the one stored at `path`.
    ///
    /// A missing file is the valid first-run case and loads as empty. On any
    /// failure the current table is left untouched.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        self.table = persist::load(path)?;
        Ok(())
    }

    fn random_position(&mut self) -> Option<StateId> {
        self.graph
            .random_state(&mut self.random)
            .map(|state| state.name().clone())
    }
}
