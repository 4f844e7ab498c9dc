#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use ticket_booking::{Event, EventId, EventLookup, SeatId, StoreError};

/// In-memory event lookup standing in for the file-backed `EventManager`.
#[derive(Debug, Default)]
pub struct StubEvents {
    pub events: BTreeMap<EventId, Event>,
    pub updates: usize,
    pub fail_updates: bool,
}

impl StubEvents {
    pub fn with(events: impl IntoIterator<Item = Event>) -> Self {
        StubEvents {
            events: events.into_iter().map(|e| (e.event_id, e)).collect(),
            ..Default::default()
        }
    }

    pub fn event(&self, event_id: EventId) -> &Event {
        &self.events[&event_id]
    }
}

impl EventLookup for StubEvents {
    fn get_event_by_id(&self, event_id: EventId) -> Option<&Event> {
        self.events.get(&event_id)
    }

    fn update_event(&mut self, event: Event) -> Result<(), StoreError> {
        if self.fail_updates {
            return Err(StoreError::Io {
                path: PathBuf::from("stub"),
                source: std::io::Error::other("update refused"),
            });
        }
        match self.events.get_mut(&event.event_id) {
            Some(slot) => {
                *slot = event;
                self.updates += 1;
                Ok(())
            }
            None => Err(StoreError::EventNotFound(event.event_id)),
        }
    }
}

pub fn data_dir() -> TempDir {
    tempfile::tempdir().expect("create temp dir")
}

/// Event with empty descriptive fields, for tests that only care about seats.
pub fn event_with_seats(
    event_id: EventId,
    available: impl IntoIterator<Item = SeatId>,
    unavailable: impl IntoIterator<Item = SeatId>,
) -> Event {
    Event {
        event_id,
        event_name: String::new(),
        time: String::new(),
        date: String::new(),
        venue: String::new(),
        available_seats: available.into_iter().collect(),
        unavailable_seats: unavailable.into_iter().collect(),
    }
}

/// Replaces a data directory with a plain file so the next write into it fails.
pub fn make_unwritable(dir: &Path) {
    if dir.exists() {
        fs::remove_dir_all(dir).expect("remove data dir");
    }
    fs::write(dir, "not a directory").expect("replace data dir");
}
