//! Q-table implementation for temporal difference learning

use rand::{Rng, seq::IndexedRandom};

use crate::{Error, Result};

/// Dense action-value table.
///
/// Values are stored action-major: row `a` holds `Q(s, a)` for every state
/// `s`. Every index in range is defined; indices out of range are reported as
/// errors rather than clamped.
///
/// A separate `visited` bitset marks cells that have been written. The first
/// [`QTable::update`] of an unvisited cell resets it to zero before applying
/// the rule, so a table built with [`QTable::with_initial_value`] can carry an
/// "unexplored" prior without that prior leaking into learned values.
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    num_actions: usize,
    num_states: usize,
    values: Vec<f32>,
    visited: Vec<bool>,
    update_count: u64,
}

impl QTable {
    /// Create a zero-initialized table.
    pub fn new(num_actions: usize, num_states: usize) -> Self {
        Self::with_initial_value(num_actions, num_states, 0.0)
    }

    /// Create a table whose unvisited cells read as `initial`.
    pub fn with_initial_value(num_actions: usize, num_states: usize, initial: f32) -> Self {
        let len = num_actions * num_states;
        Self {
            num_actions,
            num_states,
            values: vec![initial; len],
            visited: vec![false; len],
            update_count: 0,
        }
    }

    pub fn num_actions(&self) -> usize {
        self.num_actions
    }

    pub fn num_states(&self) -> usize {
        self.num_states
    }

    /// `(num_actions, num_states)`
    pub fn dimensions(&self) -> (usize, usize) {
        (self.num_actions, self.num_states)
    }

    fn index(&self, action: usize, state: usize) -> Result<usize> {
        if action >= self.num_actions {
            return Err(Error::ActionOutOfRange {
                action,
                num_actions: self.num_actions,
            });
        }
        if state >= self.num_states {
            return Err(Error::StateOutOfRange {
                state,
                num_states: self.num_states,
            });
        }
        Ok(action * self.num_states + state)
    }

    /// Get Q-value for an action-state pair
    pub fn get(&self, action: usize, state: usize) -> Result<f32> {
        Ok(self.values[self.index(action, state)?])
    }

    /// Overwrite the Q-value for an action-state pair.
    pub fn set(&mut self, action: usize, state: usize, value: f32) -> Result<()> {
        let idx = self.index(action, state)?;
        self.values[idx] = value;
        self.visited[idx] = true;
        Ok(())
    }

    /// Whether the pair has been written by `set`, `update`, or a load.
    pub fn is_visited(&self, action: usize, state: usize) -> Result<bool> {
        Ok(self.visited[self.index(action, state)?])
    }

    /// Values of every action in `state`, in action order.
    pub fn action_values(&self, state: usize) -> Result<Vec<f32>> {
        (0..self.num_actions)
            .map(|action| self.get(action, state))
            .collect()
    }

    /// Maximum Q-value over all actions in `state`
    pub fn max_value(&self, state: usize) -> Result<f32> {
        Ok(self
            .action_values(state)?
            .into_iter()
            .fold(f32::NEG_INFINITY, f32::max))
    }

    /// Actions sharing the maximum value in `state`.
    pub fn best_actions(&self, state: usize) -> Result<Vec<usize>> {
        let values = self.action_values(state)?;
        let best = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        Ok(values
            .iter()
            .enumerate()
            .filter(|(_, value)| **value == best)
            .map(|(action, _)| action)
            .collect())
    }

    /// Select the greedy action, breaking ties uniformly at random.
    pub fn best_action<R: Rng + ?Sized>(&self, state: usize, rng: &mut R) -> Result<usize> {
        let ties = self.best_actions(state)?;
        // NaN values never compare equal to the maximum; fall back to any action.
        let pool: Vec<usize> = if ties.is_empty() {
            (0..self.num_actions).collect()
        } else {
            ties
        };
        pool.choose(rng).copied().ok_or_else(|| Error::ActionOutOfRange {
            action: 0,
            num_actions: self.num_actions,
        })
    }

    /// Q-learning update: off-policy TD control
    ///
    /// Q(s,a) ← Q(s,a) + α[r + γ max_a' Q(s',a') - Q(s,a)]
    ///
    /// Returns the new value of `Q(s,a)`.
    pub fn update(
        &mut self,
        state: usize,
        action: usize,
        reward: f32,
        next_state: usize,
        alpha: f32,
        gamma: f32,
    ) -> Result<f32> {
        let idx = self.index(action, state)?;
        if !self.visited[idx] {
            self.values[idx] = 0.0;
            self.visited[idx] = true;
        }
        let max_next_q = self.max_value(next_state)?;
        let current_q = self.values[idx];
        let td_target = reward + gamma * max_next_q;
        let new_q = current_q + alpha * (td_target - current_q);
        self.values[idx] = new_q;
        self.update_count += 1;
        Ok(new_q)
    }

    /// Number of updates applied since construction.
    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    /// Number of written cells.
    pub fn visited_count(&self) -> usize {
        self.visited.iter().filter(|visited| **visited).count()
    }

    /// Iterate `(state, action, value)` in state-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f32)> + '_ {
        (0..self.num_states).flat_map(move |state| {
            (0..self.num_actions)
                .map(move |action| (state, action, self.values[action * self.num_states + state]))
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn test_qtable_initialization() {
        let qtable = QTable::new(4, 144);
        assert_eq!(qtable.dimensions(), (4, 144));
        assert_eq!(qtable.get(3, 143).unwrap(), 0.0);
        assert_eq!(qtable.visited_count(), 0);
    }

    #[test]
    fn test_qtable_set_get() {
        let mut qtable = QTable::new(4, 144);
        for action in 0..4 {
            for state in [0, 17, 143] {
                let value = action as f32 * 1.5 - state as f32 / 7.0;
                qtable.set(action, state, value).unwrap();
                assert_eq!(qtable.get(action, state).unwrap(), value);
            }
        }
    }

    #[test]
    fn test_out_of_range_is_an_error() {
        let mut qtable = QTable::new(4, 144);
        assert!(matches!(
            qtable.get(4, 0),
            Err(Error::ActionOutOfRange {
                action: 4,
                num_actions: 4
            })
        ));
        assert!(matches!(
            qtable.set(0, 144, 1.0),
            Err(Error::StateOutOfRange {
                state: 144,
                num_states: 144
            })
        ));
        assert!(qtable.update(0, 0, 1.0, 200, 0.5, 0.9).is_err());
        assert!(qtable.best_action(144, &mut StdRng::seed_from_u64(1)).is_err());
    }

    #[test]
    fn test_max_value() {
        let mut qtable = QTable::new(4, 10);
        qtable.set(0, 3, 0.5).unwrap();
        qtable.set(1, 3, 1.5).unwrap();
        qtable.set(2, 3, 0.8).unwrap();
        qtable.set(3, 3, -2.0).unwrap();
        assert_eq!(qtable.max_value(3).unwrap(), 1.5);
    }

    #[test]
    fn test_best_action_unique_maximum() {
        let mut qtable = QTable::new(4, 10);
        qtable.set(0, 3, 0.5).unwrap();
        qtable.set(1, 3, 1.5).unwrap();
        qtable.set(2, 3, 0.8).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            assert_eq!(qtable.best_action(3, &mut rng).unwrap(), 1);
        }
    }

    #[test]
    fn test_best_action_spreads_ties() {
        let mut qtable = QTable::new(4, 10);
        qtable.set(0, 5, -1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let mut counts = [0usize; 4];
        for _ in 0..600 {
            let action = qtable.best_action(5, &mut rng).unwrap();
            assert!(action < 4);
            counts[action] += 1;
        }
        assert_eq!(counts[0], 0);
        for count in &counts[1..] {
            assert!(*count > 100, "tie-breaking skewed: {counts:?}");
        }
    }

    #[test]
    fn test_q_learning_update() {
        let mut qtable = QTable::new(4, 10);
        qtable.set(1, 7, 1.0).unwrap();
        qtable.set(2, 7, 2.0).unwrap();

        // Q(s,a) = 0.0 + 0.5 * (0.0 + 0.99 * 2.0 - 0.0) = 0.99
        let updated_q = qtable.update(4, 0, 0.0, 7, 0.5, 0.99).unwrap();
        assert!((updated_q - 0.99).abs() < 1e-6);
        assert_eq!(qtable.get(0, 4).unwrap(), updated_q);
        assert_eq!(qtable.update_count(), 1);
    }

    #[test]
    fn test_unvisited_initial_value_resets_on_first_update() {
        let mut qtable = QTable::with_initial_value(4, 10, -1000.0);
        assert_eq!(qtable.get(2, 1).unwrap(), -1000.0);
        assert!(!qtable.is_visited(2, 1).unwrap());

        // Next state is unvisited too, so its max is the prior; use gamma 0.
        let updated = qtable.update(1, 2, 4.0, 3, 0.5, 0.0).unwrap();
        assert!((updated - 2.0).abs() < 1e-6);
        assert!(qtable.is_visited(2, 1).unwrap());

        let again = qtable.update(1, 2, 4.0, 3, 0.5, 0.0).unwrap();
        assert!((again - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_update_converges_monotonically_to_reward() {
        let mut rng = StdRng::seed_from_u64(2024);
        for _ in 0..50 {
            let mut qtable = QTable::new(4, 144);
            let state = rng.random_range(0..144);
            let action = rng.random_range(0..4);
            let reward: f32 = rng.random_range(-50.0..50.0);
            let start: f32 = rng.random_range(-50.0..50.0);
            qtable.set(action, state, start).unwrap();

            let mut previous_gap = (start - reward).abs();
            for _ in 0..40 {
                let value = qtable.update(state, action, reward, state, 0.5, 0.0).unwrap();
                let gap = (value - reward).abs();
                assert!(gap <= previous_gap + 1e-5);
                previous_gap = gap;
            }
            assert!(previous_gap < 1e-3, "did not converge: gap {previous_gap}");
        }
    }

    #[test]
    fn test_iter_covers_every_pair() {
        let mut qtable = QTable::new(3, 5);
        qtable.set(2, 4, 9.0).unwrap();
        let entries: Vec<_> = qtable.iter().collect();
        assert_eq!(entries.len(), 15);
        assert_eq!(entries[0], (0, 0, 0.0));
        assert_eq!(entries[14], (4, 2, 9.0));
    }
}
