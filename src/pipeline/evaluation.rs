//! Greedy play from a trained table.

use std::path::Path;

use log::{debug, warn};
use rand::{SeedableRng, rngs::StdRng};

use crate::{
    Result,
    movement::MovementResolver,
    ports::{TableRepository, World},
    q_learning::{QTable, StateEncoder},
    types::{Action, Cell},
};

/// Agent that always takes the highest-valued action.
///
/// Used to drive an evader with a table learned elsewhere; it never updates
/// the table.
///
/// # Examples
///
/// ```
/// use evader::{adapters::GridMap, pipeline::GreedyAgent, q_learning::QTable, types::Cell};
///
/// let world = GridMap::open(4, 4)?;
/// let mut agent = GreedyAgent::new(QTable::new(4, 144), 7);
/// let next = agent.next_step(Cell::open(1, 1), Cell::open(3, 3), &world)?;
/// assert_eq!(next.manhattan(&Cell::open(1, 1)), 1);
/// # Ok::<(), evader::Error>(())
/// ```
pub struct GreedyAgent {
    table: QTable,
    encoder: StateEncoder,
    resolver: MovementResolver,
    rng: StdRng,
}

impl GreedyAgent {
    /// Wrap a table; `seed` drives tie-breaking between equal values.
    pub fn new(table: QTable, seed: u64) -> Self {
        Self {
            table,
            encoder: StateEncoder::new(),
            resolver: MovementResolver::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Load a table snapshot. A missing snapshot yields an all-zero table.
    pub fn load(repository: &dyn TableRepository, path: &Path, seed: u64) -> Result<Self> {
        let table = if repository.exists(path) {
            let (table, report) =
                repository.load(path, Action::COUNT, StateEncoder::NUM_STATES)?;
            debug!(
                "greedy agent loaded {} records ({} skipped) from {}",
                report.applied,
                report.skipped,
                path.display()
            );
            table
        } else {
            warn!("no trained table at {}, playing from zeros", path.display());
            QTable::new(Action::COUNT, StateEncoder::NUM_STATES)
        };
        Ok(Self::new(table, seed))
    }

    /// Best action for the agent at `current` with the enemy at `other`.
    pub fn choose(&mut self, current: &Cell, other: &Cell, world: &dyn World) -> Result<Action> {
        let state = self.encoder.encode(current, other, world);
        let index = self.table.best_action(state, &mut self.rng)?;
        Action::try_from(index)
    }

    /// Cell the agent moves to; blocked moves keep it in place.
    pub fn next_step(&mut self, current: Cell, other: Cell, world: &dyn World) -> Result<Cell> {
        let action = self.choose(&current, &other, world)?;
        let next = self.resolver.resolve(action, current, world);
        debug!("greedy {action} from {current} (enemy at {other}) to {next}");
        Ok(next)
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{GridMap, InMemoryRepository};

    #[test]
    fn test_follows_highest_value() {
        let world = GridMap::open(5, 5).unwrap();
        let (agent_cell, enemy) = (Cell::open(2, 2), Cell::open(4, 4));
        let state = StateEncoder.encode(&agent_cell, &enemy, &world);
        let mut table = QTable::new(4, 144);
        table.set(Action::West.index(), state, 3.0).unwrap();

        let mut agent = GreedyAgent::new(table, 0);
        assert_eq!(agent.choose(&agent_cell, &enemy, &world).unwrap(), Action::West);
        assert_eq!(
            agent.next_step(agent_cell, enemy, &world).unwrap(),
            Cell::open(1, 2)
        );
    }

    #[test]
    fn test_blocked_choice_stays_put() {
        let world = GridMap::open(3, 3).unwrap();
        let (corner, enemy) = (Cell::open(0, 0), Cell::open(2, 2));
        let state = StateEncoder.encode(&corner, &enemy, &world);
        let mut table = QTable::new(4, 144);
        table.set(Action::South.index(), state, 1.0).unwrap();

        let mut agent = GreedyAgent::new(table, 0);
        assert_eq!(agent.next_step(corner, enemy, &world).unwrap(), corner);
    }

    #[test]
    fn test_load_missing_snapshot_uses_zeros() {
        let repo = InMemoryRepository::new();
        let agent = GreedyAgent::load(&repo, Path::new("absent.csv"), 1).unwrap();
        assert_eq!(agent.table().visited_count(), 0);
    }

    #[test]
    fn test_load_reads_snapshot() {
        let repo = InMemoryRepository::new();
        repo.insert(Path::new("q.csv"), "state,action,q_value\n5,1,2.5\n");
        let agent = GreedyAgent::load(&repo, Path::new("q.csv"), 1).unwrap();
        assert_eq!(agent.table().get(1, 5).unwrap(), 2.5);
    }
}
