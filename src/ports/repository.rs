//! Repository port for Q-table persistence.
//!
//! This module defines the trait boundary between the learning core and the
//! storage used for table snapshots.

use std::path::Path;

use crate::{
    Result,
    q_learning::{LoadReport, QTable},
};

/// Port for persisting and loading Q-tables.
///
/// # Examples
///
/// ```no_run
/// use evader::adapters::CsvTableRepository;
/// use evader::ports::TableRepository;
/// use evader::q_learning::QTable;
/// use std::path::Path;
///
/// let repo = CsvTableRepository::new();
/// let table = QTable::new(4, 144);
/// repo.save(&table, Path::new("q_table.csv"))?;
/// let (loaded, report) = repo.load(Path::new("q_table.csv"), 4, 144)?;
/// assert_eq!(report.skipped, 0);
/// # Ok::<(), evader::Error>(())
/// ```
pub trait TableRepository {
    /// Save a table snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the location cannot be written.
    fn save(&self, table: &QTable, path: &Path) -> Result<()>;

    /// Load a snapshot into a fresh table of the given dimensions.
    ///
    /// Malformed records are skipped and counted in the returned
    /// [`LoadReport`]; they never abort the load.
    ///
    /// # Errors
    ///
    /// Returns an error if the location does not exist or cannot be read.
    fn load(&self, path: &Path, num_actions: usize, num_states: usize)
    -> Result<(QTable, LoadReport)>;

    /// Whether a snapshot exists at `path`.
    fn exists(&self, path: &Path) -> bool;
}
