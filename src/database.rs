use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::models::EventId;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("event {0} not found")]
    EventNotFound(EventId),
}

/// Records loaded from a [`JsonFile`] together with the next id to hand out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection<T> {
    /// Never lowered when records are removed, so ids stay unique for the life of the file.
    pub next_id: i64,
    pub records: Vec<T>,
}

impl<T> Collection<T> {
    /// The id after the highest one ever issued, covering files that predate `next_id`.
    pub fn next_id_by(&self, id_of: impl Fn(&T) -> i64) -> i64 {
        let past_records = self.records.iter().map(|r| id_of(r) + 1).max().unwrap_or(1);
        self.next_id.max(past_records)
    }
}

#[derive(Serialize)]
struct CollectionRef<'a, T> {
    next_id: i64,
    records: &'a [T],
}

// Plain arrays are what files written before `next_id` existed look like.
#[derive(Deserialize)]
#[serde(untagged)]
enum OnDisk<T> {
    Collection(Collection<T>),
    Records(Vec<T>),
}

/// A JSON file holding one collection of records. Every save rewrites the whole file.
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFile { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the collection; a missing or blank file is an empty collection.
    pub fn load<T: DeserializeOwned>(&self) -> Result<Collection<T>, StoreError> {
        let empty = Collection {
            next_id: 1,
            records: Vec::new(),
        };
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("{} does not exist yet, starting empty", self.path.display());
                return Ok(empty);
            }
            Err(source) => return Err(self.io_error(source)),
        };

        if data.trim().is_empty() {
            return Ok(empty);
        }

        let on_disk: OnDisk<T> = serde_json::from_str(&data).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })?;
        let collection = match on_disk {
            OnDisk::Collection(collection) => collection,
            OnDisk::Records(records) => Collection {
                next_id: 1,
                records,
            },
        };
        info!(
            "Loaded {} records from {}",
            collection.records.len(),
            self.path.display()
        );
        Ok(collection)
    }

    pub fn save<T: Serialize>(&self, next_id: i64, records: &[T]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }

        let file = File::create(&self.path).map_err(|source| self.io_error(source))?;
        let mut writer = BufWriter::new(file);
        let collection = CollectionRef { next_id, records };
        serde_json::to_writer_pretty(&mut writer, &collection).map_err(|source| {
            StoreError::Parse {
                path: self.path.clone(),
                source,
            }
        })?;
        writer.flush().map_err(|source| self.io_error(source))?;

        debug!("Wrote {} records to {}", records.len(), self.path.display());
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Booking;

    fn booking(id: i64) -> Booking {
        Booking {
            booking_id: id,
            name: "John Doe".to_string(),
            email: "john@example.com".to_string(),
            event_id: 1,
            seat_ids: vec![3, 1, 2],
            payment_method: "Credit Card".to_string(),
        }
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let file = JsonFile::new(dir.path().join("nothing.json"));
        let loaded = file.load::<Booking>().unwrap();
        assert!(loaded.records.is_empty());
        assert_eq!(loaded.next_id, 1);
    }

    #[test]
    fn blank_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.json");
        fs::write(&path, "  \n").unwrap();
        let loaded = JsonFile::new(path).load::<Booking>().unwrap();
        assert!(loaded.records.is_empty());
    }

    #[test]
    fn save_then_load_keeps_records() {
        let dir = tempfile::tempdir().unwrap();
        let file = JsonFile::new(dir.path().join("nested").join("bookings.json"));
        let records = vec![booking(1), booking(2)];

        file.save(7, &records).unwrap();
        let loaded = file.load::<Booking>().unwrap();

        assert_eq!(loaded.next_id, 7);
        assert_eq!(loaded.records, records);
        assert_eq!(loaded.records[0].seat_ids, vec![3, 1, 2]);
    }

    #[test]
    fn plain_array_files_still_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bookings.json");
        fs::write(&path, serde_json::to_string(&vec![booking(4)]).unwrap()).unwrap();

        let loaded = JsonFile::new(path).load::<Booking>().unwrap();
        assert_eq!(loaded.records, vec![booking(4)]);
        assert_eq!(loaded.next_id_by(|b| b.booking_id), 5);
    }

    #[test]
    fn next_id_outlives_removed_records() {
        let collection = Collection {
            next_id: 9,
            records: vec![booking(2)],
        };
        assert_eq!(collection.next_id_by(|b| b.booking_id), 9);

        let stale = Collection {
            next_id: 1,
            records: vec![booking(2), booking(6)],
        };
        assert_eq!(stale.next_id_by(|b| b.booking_id), 7);
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();

        let err = JsonFile::new(&path).load::<Booking>().unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }));
        assert!(err.to_string().contains("bad.json"));
    }

    #[test]
    fn unreadable_path_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be read as a file.
        let err = JsonFile::new(dir.path()).load::<Booking>().unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }
}
