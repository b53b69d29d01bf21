//! In-memory table repository for testing.
//!
//! This adapter provides a pure in-memory implementation of TableRepository,
//! enabling fast tests without any file system I/O. Snapshots are stored in
//! the same CSV text the file repository writes.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::{
    Result,
    error::Error,
    ports::TableRepository,
    q_learning::{LoadReport, QTable, serialization},
};

/// In-memory repository for testing.
///
/// # Examples
///
/// ```
/// use evader::adapters::InMemoryRepository;
/// use evader::ports::TableRepository;
/// use evader::q_learning::QTable;
/// use std::path::Path;
///
/// let repo = InMemoryRepository::new();
/// repo.save(&QTable::new(4, 144), Path::new("q_table.csv"))?;
/// assert_eq!(repo.save_count(), 1);
/// let (loaded, _) = repo.load(Path::new("q_table.csv"), 4, 144)?;
/// assert_eq!(loaded.dimensions(), (4, 144));
/// # Ok::<(), evader::Error>(())
/// ```
///
/// # Thread Safety
///
/// Clones share the same underlying storage, so a test can keep one handle
/// while a training loop owns another.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    storage: Arc<Mutex<Storage>>,
}

#[derive(Default)]
struct Storage {
    snapshots: HashMap<PathBuf, String>,
    saves: usize,
}

impl InMemoryRepository {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn storage(&self) -> MutexGuard<'_, Storage> {
        self.storage.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of distinct snapshot locations.
    pub fn count(&self) -> usize {
        self.storage().snapshots.len()
    }

    /// Total number of `save` calls, including overwrites.
    pub fn save_count(&self) -> usize {
        self.storage().saves
    }

    /// Raw CSV text stored at `path`.
    pub fn contents(&self, path: &Path) -> Option<String> {
        self.storage().snapshots.get(path).cloned()
    }

    /// Store raw CSV text, e.g. a hand-written snapshot.
    pub fn insert(&self, path: &Path, csv: impl Into<String>) {
        self.storage().snapshots.insert(path.to_path_buf(), csv.into());
    }

    /// Clear all stored snapshots.
    pub fn clear(&self) {
        let mut storage = self.storage();
        storage.snapshots.clear();
        storage.saves = 0;
    }
}

impl TableRepository for InMemoryRepository {
    fn save(&self, table: &QTable, path: &Path) -> Result<()> {
        let mut buffer = Vec::new();
        serialization::write_csv(table, &mut buffer)?;
        let text = String::from_utf8(buffer).map_err(|e| Error::Io {
            operation: format!("encode snapshot for {path:?}"),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })?;

        let mut storage = self.storage();
        storage.snapshots.insert(path.to_path_buf(), text);
        storage.saves += 1;
        Ok(())
    }

    fn load(
        &self,
        path: &Path,
        num_actions: usize,
        num_states: usize,
    ) -> Result<(QTable, LoadReport)> {
        let text = self.contents(path).ok_or_else(|| Error::Io {
            operation: format!("load table from in-memory storage at {path:?}"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "key not found in memory"),
        })?;
        let mut table = QTable::new(num_actions, num_states);
        let report = serialization::read_csv(&mut table, text.as_bytes())?;
        Ok((table, report))
    }

    fn exists(&self, path: &Path) -> bool {
        self.storage().snapshots.contains_key(path)
    }
}
