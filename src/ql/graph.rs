use rustc_hash::FxHashMap;

use crate::ql::prelude::{ActionId, StateId};
use crate::ql::random::RandomSource;

/// Directed edge between two states.
///
/// Immutable once created. The reward is the immediate reward recorded at
/// creation time; it may be stale relative to the learned Q-values.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    name: ActionId,
    next_state: StateId,
    reward: f64,
}

impl Action {
    pub fn name(&self) -> &ActionId {
        &self.name
    }

    pub fn next_state(&self) -> &StateId {
        &self.next_state
    }

    pub fn reward(&self) -> f64 {
        self.reward
    }
}

/// A named node owning its outgoing action edges.
///
/// Edges keep insertion order (used for deterministic iteration and uniform
/// selection) next to a name index for O(1) lookup.
#[derive(Debug, Clone)]
pub struct State {
    name: StateId,
    actions: Vec<Action>,
    index: FxHashMap<ActionId, usize>,
}

impl State {
    fn new(name: StateId) -> Self {
        Self {
            name,
            actions: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    pub fn name(&self) -> &StateId {
        &self.name
    }

    pub fn action(&self, name: &str) -> Option<&Action> {
        self.index.get(name).map(|&slot| &self.actions[slot])
    }

    /// Outgoing edges in insertion order.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Adds an edge. Re-adding an existing name overwrites the edge in place;
    /// the name index and the ordered slot stay consistent.
    fn add_action(&mut self, next_state: StateId, reward: f64, name: ActionId) -> &Action {
        let action = Action { name: name.clone(), next_state, reward };
        match self.index.get(&name) {
            Some(&slot) => {
                self.actions[slot] = action;
                &self.actions[slot]
            }
            None => {
                self.index.insert(name, self.actions.len());
                self.actions.push(action);
                self.actions.last().expect("edge was just pushed")
            }
        }
    }

    /// Uniform selection among the outgoing edges, `None` if there are none.
    pub fn random_action(&self, random: &mut RandomSource) -> Option<&Action> {
        random.index(self.actions.len()).map(|i| &self.actions[i])
    }
}

/// Grow-only registry of named states.
///
/// States are created on first mention and never destroyed. Referencing an
/// unregistered name through [`StateGraph::add_action`] registers it.
#[derive(Debug, Clone, Default)]
pub struct StateGraph {
    states: Vec<State>,
    index: FxHashMap<StateId, usize>,
}

impl StateGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent registration: returns the existing state when the name is
    /// already present.
    pub fn add_state(&mut self, name: &str) -> &State {
        let slot = self.slot_or_create(name);
        &self.states[slot]
    }

    /// Registers both endpoints if missing and creates the edge `from -> to`.
    pub fn add_action(&mut self, from: &str, to: &str, reward: f64, name: &str) -> &Action {
        self.slot_or_create(to);
        let slot = self.slot_or_create(from);
        self.states[slot].add_action(StateId::from(to), reward, ActionId::from(name))
    }

    pub fn state(&self, name: &str) -> Option<&State> {
        self.index.get(name).map(|&slot| &self.states[slot])
    }

    /// Uniform selection over all registered states, `None` when none exist.
    pub fn random_state(&self, random: &mut RandomSource) -> Option<&State> {
        random.index(self.states.len()).map(|i| &self.states[i])
    }

    /// Registered states in registration order.
    pub fn states(&self) -> impl Iterator<Item = &State> {
        self.states.iter()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    fn slot_or_create(&mut self, name: &str) -> usize {
        match self.index.get(name) {
            Some(&slot) => slot,
            None => {
                let slot = self.states.len();
                self.index.insert(StateId::from(name), slot);
                self.states.push(State::new(StateId::from(name)));
                slot
            }
        }
    }
}
