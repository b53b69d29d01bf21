//! File-backed CSV implementation of the table repository.

use std::{
    fs::{self, File},
    io::{BufReader, BufWriter},
    path::Path,
};

use crate::{
    Result,
    error::Error,
    ports::TableRepository,
    q_learning::{LoadReport, QTable, serialization},
};

/// CSV file repository.
///
/// Writes `state,action,q_value` snapshots, creating parent directories as
/// needed.
///
/// # Examples
///
/// ```no_run
/// use evader::adapters::CsvTableRepository;
/// use evader::ports::TableRepository;
/// use evader::q_learning::QTable;
/// use std::path::Path;
///
/// let repo = CsvTableRepository;
/// let mut table = QTable::new(4, 144);
/// table.set(0, 12, 3.5)?;
///
/// repo.save(&table, Path::new("runs/q_table.csv"))?;
/// let (loaded, _report) = repo.load(Path::new("runs/q_table.csv"), 4, 144)?;
/// assert_eq!(loaded.get(0, 12)?, 3.5);
/// # Ok::<(), evader::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvTableRepository;

impl CsvTableRepository {
    pub fn new() -> Self {
        Self
    }
}

impl TableRepository for CsvTableRepository {
    fn save(&self, table: &QTable, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| Error::Io {
                operation: format!("create directory {parent:?}"),
                source,
            })?;
        }
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create file {path:?}"),
            source,
        })?;
        serialization::write_csv(table, BufWriter::new(file))
    }

    fn load(
        &self,
        path: &Path,
        num_actions: usize,
        num_states: usize,
    ) -> Result<(QTable, LoadReport)> {
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open file {path:?}"),
            source,
        })?;
        let mut table = QTable::new(num_actions, num_states);
        let report = serialization::read_csv(&mut table, BufReader::new(file))?;
        Ok((table, report))
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_csv_roundtrip() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let file_path = temp_dir.path().join("nested").join("q_table.csv");

        let mut table = QTable::new(4, 144);
        table.set(3, 100, -7.25).unwrap();
        table.set(0, 0, 0.1).unwrap();

        let repo = CsvTableRepository::new();
        assert!(!repo.exists(&file_path));
        repo.save(&table, &file_path).expect("Failed to save");
        assert!(repo.exists(&file_path));

        let (loaded, report) = repo.load(&file_path, 4, 144).expect("Failed to load");
        assert_eq!(report.applied, 4 * 144);
        assert_eq!(report.skipped, 0);
        assert_eq!(loaded.get(3, 100).unwrap(), -7.25);
        assert_eq!(loaded.get(0, 0).unwrap(), 0.1);
    }

    #[test]
    fn test_load_tolerates_bad_lines() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("hand_edited.csv");
        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "state,action,q_value").unwrap();
        writeln!(file, "5,1,2.5").unwrap();
        writeln!(file, "garbage").unwrap();
        writeln!(file, "6,2,3,5").unwrap();
        drop(file);

        let (loaded, report) = CsvTableRepository.load(&file_path, 4, 144).unwrap();
        assert_eq!(report, LoadReport { applied: 1, skipped: 2 });
        assert_eq!(loaded.get(1, 5).unwrap(), 2.5);
    }

    #[test]
    fn test_load_nonexistent_returns_error() {
        let result = CsvTableRepository.load(Path::new("/tmp/nonexistent_q_table_12345.csv"), 4, 144);
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
