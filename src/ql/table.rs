use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::ql::prelude::{ActionId, StateId};
use crate::ql::random::RandomSource;

/// Sparse mapping from (state, action) to the learned value estimate.
///
/// Lives independently of the state graph: an entry may exist for a pair
/// whose edge was never materialized, and vice versa. A pair without an
/// entry reads as 0.0, a policy default rather than "unknown": an unexplored
/// action with a truly negative value is indistinguishable from one worth
/// exactly zero until it has been learned. [`QTable::knows_action`] makes
/// the presence distinction for callers that need it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QTable {
    values: FxHashMap<StateId, FxHashMap<ActionId, f64>>,
}

impl QTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unconditional overwrite; creates the per-state row if absent.
    pub fn set_value(&mut self, state: &str, action: &str, value: f64) {
        self.values
            .entry(StateId::from(state))
            .or_default()
            .insert(ActionId::from(action), value);
    }

    /// 0.0 when either the state row or the action entry is absent.
    pub fn value(&self, state: &str, action: &str) -> f64 {
        self.values
            .get(state)
            .and_then(|row| row.get(action))
            .copied()
            .unwrap_or(0.0)
    }

    /// True iff an explicit entry exists for the pair.
    pub fn knows_action(&self, state: &str, action: &str) -> bool {
        self.values.get(state).is_some_and(|row| row.contains_key(action))
    }

    /// Highest recorded value among the state's actions, floored at 0.0.
    ///
    /// The floor is deliberate: a state whose every known action is negative
    /// still reads as neutral, which keeps it attractive to the backup rule.
    pub fn best_value(&self, state: &str) -> f64 {
        self.values
            .get(state)
            .map_or(0.0, |row| row.values().fold(0.0, |max, &v| f64::max(max, v)))
    }

    /// Highest-valued recorded action for the state.
    ///
    /// Ties are resolved sequentially: a candidate whose value exactly equals
    /// the incumbent's displaces it only when a draw exceeds 0.5. The first
    /// action scanned wins by default, and each later tie gets an independent
    /// coin flip regardless of how many ties came before.
    pub fn best_action(&self, state: &str, random: &mut RandomSource) -> Option<ActionId> {
        let row = self.values.get(state)?;
        let mut best: Option<(&ActionId, f64)> = None;
        for (name, &value) in row {
            match best {
                None => best = Some((name, value)),
                Some((_, best_value)) => {
                    if value == best_value && random.random() > 0.5 {
                        best = Some((name, value));
                    } else if value > best_value {
                        best = Some((name, value));
                    }
                }
            }
        }
        best.map(|(name, _)| name.clone())
    }

    /// Strictly greedy variant of [`QTable::best_action`]: the first action
    /// scanned wins ties and no randomness is consumed, so repeated calls
    /// give the same answer. Meant for evaluation-time action choice.
    pub fn predict_action(&self, state: &str) -> Option<ActionId> {
        let row = self.values.get(state)?;
        let mut prediction: Option<(&ActionId, f64)> = None;
        for (name, &value) in row {
            match prediction {
                Some((_, best_value)) if value <= best_value => {}
                _ => prediction = Some((name, value)),
            }
        }
        prediction.map(|(name, _)| name.clone())
    }

    /// Number of states with at least one recorded entry.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::QTable;
    use crate::ql::random::RandomSource;

    #[test]
    fn unrecorded_pairs_read_as_zero() {
        let table = QTable::new();
        assert_eq!(table.value("never", "seen"), 0.0);
        assert!(!table.knows_action("never", "seen"));

        let mut table = QTable::new();
        table.set_value("s", "a", 0.0);
        assert!(table.knows_action("s", "a"));
        assert!(!table.knows_action("s", "b"));
    }

    #[test]
    fn set_value_overwrites() {
        let mut table = QTable::new();
        table.set_value("s", "a", 1.5);
        table.set_value("s", "a", -2.5);
        assert_eq!(table.value("s", "a"), -2.5);
    }

    #[rstest]
    #[case(&[("x", -5.0), ("y", -0.5)], 0.0)]
    #[case(&[("x", 3.0), ("y", 7.0)], 7.0)]
    #[case(&[], 0.0)]
    fn best_value_floors_at_zero(#[case] entries: &[(&str, f64)], #[case] expected: f64) {
        let mut table = QTable::new();
        for (action, value) in entries {
            table.set_value("s", action, *value);
        }
        assert_eq!(table.best_value("s"), expected);
    }

    #[test]
    fn predict_action_is_stable_while_best_action_alternates_on_ties() {
        let mut random = RandomSource::from_seed(99);
        let mut table = QTable::new();
        table.set_value("s", "left", 4.0);
        table.set_value("s", "right", 4.0);

        let prediction = table.predict_action("s").unwrap();
        for _ in 0..50 {
            assert_eq!(table.predict_action("s").unwrap(), prediction);
        }

        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(table.best_action("s", &mut random).unwrap());
        }
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn selectors_return_none_for_unknown_states() {
        let mut random = RandomSource::from_seed(0);
        let table = QTable::new();
        assert!(table.predict_action("s").is_none());
        assert!(table.best_action("s", &mut random).is_none());
    }
}
