use chrono::NaiveDateTime;
use std::path::PathBuf;
use tracing::info;

use crate::config::EventSettings;
use crate::database::{JsonFile, StoreError};
use crate::models::{Event, EventId, SeatId};

/// Resolves event ids to their current seat state and accepts seat changes back.
///
/// `BookingManager` only talks to events through this trait, so tests can hand it an
/// in-memory lookup instead of a file-backed [`EventManager`].
pub trait EventLookup {
    fn get_event_by_id(&self, event_id: EventId) -> Option<&Event>;

    /// Replaces the stored event carrying the same id.
    fn update_event(&mut self, event: Event) -> Result<(), StoreError>;
}

impl<L: EventLookup + ?Sized> EventLookup for &mut L {
    fn get_event_by_id(&self, event_id: EventId) -> Option<&Event> {
        (**self).get_event_by_id(event_id)
    }

    fn update_event(&mut self, event: Event) -> Result<(), StoreError> {
        (**self).update_event(event)
    }
}

pub struct EventManager {
    file: JsonFile,
    settings: EventSettings,
    events: Vec<Event>,
    next_id: EventId,
}

impl EventManager {
    /// Opens the event file at `path`, loading whatever it already holds.
    pub fn open(path: impl Into<PathBuf>, settings: EventSettings) -> Result<Self, StoreError> {
        let file = JsonFile::new(path);
        let collection = file.load::<Event>()?;
        let next_id = collection.next_id_by(|e| e.event_id);
        let mut events = collection.records;
        events.sort_by_key(|e| e.event_id);

        Ok(EventManager {
            file,
            settings,
            events,
            next_id,
        })
    }

    pub fn create_event(
        &mut self,
        name: &str,
        time: &str,
        date: &str,
        venue: &str,
    ) -> Result<Event, StoreError> {
        let seats = 1..=SeatId::from(self.settings.default_seats_per_event);
        self.create_event_with_seats(name, time, date, venue, seats)
    }

    pub fn create_event_with_seats(
        &mut self,
        name: &str,
        time: &str,
        date: &str,
        venue: &str,
        seats: impl IntoIterator<Item = SeatId>,
    ) -> Result<Event, StoreError> {
        let event = Event {
            event_id: self.next_id,
            event_name: name.to_string(),
            time: time.to_string(),
            date: date.to_string(),
            venue: venue.to_string(),
            available_seats: seats.into_iter().collect(),
            unavailable_seats: Default::default(),
        };

        self.events.push(event.clone());
        self.next_id += 1;
        if let Err(e) = self.persist() {
            self.events.pop();
            self.next_id -= 1;
            return Err(e);
        }

        info!(
            "Created event {} '{}' with {} seats",
            event.event_id,
            event.event_name,
            event.available_seats.len()
        );
        Ok(event)
    }

    pub fn remove_event(&mut self, event_id: EventId) -> Result<bool, StoreError> {
        let Some(pos) = self.position(event_id) else {
            return Ok(false);
        };

        let removed = self.events.remove(pos);
        if let Err(e) = self.persist() {
            self.events.insert(pos, removed);
            return Err(e);
        }

        info!("Removed event {} '{}'", removed.event_id, removed.event_name);
        Ok(true)
    }

    pub fn event_exists(&self, event_id: EventId) -> bool {
        self.position(event_id).is_some()
    }

    pub fn get_event_by_id(&self, event_id: EventId) -> Option<&Event> {
        self.position(event_id).map(|pos| &self.events[pos])
    }

    /// All events in id order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Events starting strictly after `after`, earliest first.
    pub fn upcoming_events(&self, after: NaiveDateTime) -> Vec<&Event> {
        let mut upcoming: Vec<(NaiveDateTime, &Event)> = self
            .events
            .iter()
            .filter_map(|e| e.starts_at().map(|start| (start, e)))
            .filter(|(start, _)| *start > after)
            .collect();
        upcoming.sort_by_key(|(start, e)| (*start, e.event_id));
        upcoming.into_iter().map(|(_, e)| e).collect()
    }

    pub fn path(&self) -> &std::path::Path {
        self.file.path()
    }

    // ids are issued in increasing order and never reused, so the collection stays sorted
    fn position(&self, event_id: EventId) -> Option<usize> {
        self.events
            .binary_search_by_key(&event_id, |e| e.event_id)
            .ok()
    }

    fn persist(&self) -> Result<(), StoreError> {
        self.file.save(self.next_id, &self.events)
    }
}

impl EventLookup for EventManager {
    fn get_event_by_id(&self, event_id: EventId) -> Option<&Event> {
        EventManager::get_event_by_id(self, event_id)
    }

    fn update_event(&mut self, event: Event) -> Result<(), StoreError> {
        let pos = self
            .position(event.event_id)
            .ok_or(StoreError::EventNotFound(event.event_id))?;

        let previous = std::mem::replace(&mut self.events[pos], event);
        if let Err(e) = self.persist() {
            self.events[pos] = previous;
            return Err(e);
        }
        Ok(())
    }
}
