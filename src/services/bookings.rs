use std::collections::BTreeSet;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::BookingSettings;
use crate::database::{JsonFile, StoreError};
use crate::models::{Booking, BookingId, EventId, SeatId};
use crate::services::events::EventLookup;

/// Why a booking was not created.
#[derive(Debug, Error)]
pub enum BookingError {
    #[error("event {0} not found")]
    EventNotFound(EventId),
    #[error("{requested} seats requested, at most {limit} allowed per booking")]
    SeatLimitExceeded { requested: usize, limit: usize },
    #[error("no seats requested")]
    NoSeatsRequested,
    #[error("seat {0} requested more than once")]
    DuplicateSeat(SeatId),
    #[error("seat {seat_id} is not available for event {event_id}")]
    SeatUnavailable { event_id: EventId, seat_id: SeatId },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl BookingError {
    /// True for validation failures, false when storage failed.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, BookingError::Store(_))
    }
}

pub struct BookingManager<L> {
    file: JsonFile,
    settings: BookingSettings,
    events: L,
    bookings: Vec<Booking>,
    next_id: BookingId,
}

impl<L: EventLookup> BookingManager<L> {
    /// Opens the booking file at `path`; seat state is read and written through `events`.
    pub fn open(
        path: impl Into<PathBuf>,
        settings: BookingSettings,
        events: L,
    ) -> Result<Self, StoreError> {
        let file = JsonFile::new(path);
        let collection = file.load::<Booking>()?;
        let next_id = collection.next_id_by(|b| b.booking_id);
        let mut bookings = collection.records;
        bookings.sort_by_key(|b| b.booking_id);

        Ok(BookingManager {
            file,
            settings,
            events,
            bookings,
            next_id,
        })
    }

    /// Books `seat_ids` for the event, or returns `None` if the request is rejected.
    ///
    /// Only storage failures are reported as errors.
    pub fn create_booking(
        &mut self,
        name: &str,
        email: &str,
        event_id: EventId,
        seat_ids: &[SeatId],
        payment_method: &str,
    ) -> Result<Option<Booking>, StoreError> {
        match self.try_create_booking(name, email, event_id, seat_ids, payment_method) {
            Ok(booking) => Ok(Some(booking)),
            Err(BookingError::Store(e)) => Err(e),
            Err(rejection) => {
                debug!("Booking for event {} rejected: {}", event_id, rejection);
                Ok(None)
            }
        }
    }

    pub fn try_create_booking(
        &mut self,
        name: &str,
        email: &str,
        event_id: EventId,
        seat_ids: &[SeatId],
        payment_method: &str,
    ) -> Result<Booking, BookingError> {
        let event = self
            .events
            .get_event_by_id(event_id)
            .ok_or(BookingError::EventNotFound(event_id))?;

        let limit = self.settings.max_seats_per_booking;
        if seat_ids.len() > limit {
            return Err(BookingError::SeatLimitExceeded {
                requested: seat_ids.len(),
                limit,
            });
        }
        if seat_ids.is_empty() {
            return Err(BookingError::NoSeatsRequested);
        }

        let mut seen = BTreeSet::new();
        for &seat_id in seat_ids {
            if !seen.insert(seat_id) {
                return Err(BookingError::DuplicateSeat(seat_id));
            }
            if !event.is_available(seat_id) {
                return Err(BookingError::SeatUnavailable { event_id, seat_id });
            }
        }

        let mut updated = event.clone();
        updated.reserve_seats(seat_ids);
        let previous = event.clone();
        self.events.update_event(updated)?;

        let booking = Booking {
            booking_id: self.next_id,
            name: name.to_string(),
            email: email.to_string(),
            event_id,
            seat_ids: seat_ids.to_vec(),
            payment_method: payment_method.to_string(),
        };

        self.bookings.push(booking.clone());
        self.next_id += 1;
        if let Err(e) = self.persist() {
            self.bookings.pop();
            self.next_id -= 1;
            // put the seats back so the event does not hold seats for a booking that was never saved
            if let Err(restore) = self.events.update_event(previous) {
                warn!("Failed to restore seats for event {}: {}", event_id, restore);
            }
            return Err(e.into());
        }

        info!(
            "Created booking {} for event {} with seats {:?}",
            booking.booking_id, event_id, booking.seat_ids
        );
        Ok(booking)
    }

    /// Cancels a booking and returns its seats to the event. `false` if no such booking exists.
    pub fn cancel_booking(&mut self, booking_id: BookingId) -> Result<bool, StoreError> {
        let Some(pos) = self.position(booking_id) else {
            debug!("Cancel requested for unknown booking {}", booking_id);
            return Ok(false);
        };
        let booking = &self.bookings[pos];

        let previous = match self.events.get_event_by_id(booking.event_id) {
            Some(event) => {
                let previous = event.clone();
                let mut updated = event.clone();
                updated.release_seats(&booking.seat_ids);
                self.events.update_event(updated)?;
                Some(previous)
            }
            None => {
                warn!(
                    "Event {} of booking {} no longer exists, no seats to release",
                    booking.event_id, booking_id
                );
                None
            }
        };

        let removed = self.bookings.remove(pos);
        if let Err(e) = self.persist() {
            self.bookings.insert(pos, removed);
            if let Some(previous) = previous {
                let event_id = previous.event_id;
                if let Err(restore) = self.events.update_event(previous) {
                    warn!("Failed to restore seats for event {}: {}", event_id, restore);
                }
            }
            return Err(e);
        }

        info!(
            "Cancelled booking {} for event {}, released seats {:?}",
            removed.booking_id, removed.event_id, removed.seat_ids
        );
        Ok(true)
    }

    pub fn get_booking_by_id(&self, booking_id: BookingId) -> Option<&Booking> {
        self.position(booking_id).map(|pos| &self.bookings[pos])
    }

    /// All bookings in id order.
    pub fn bookings(&self) -> &[Booking] {
        &self.bookings
    }

    pub fn bookings_for_event(&self, event_id: EventId) -> impl Iterator<Item = &Booking> {
        self.bookings.iter().filter(move |b| b.event_id == event_id)
    }

    pub fn events(&self) -> &L {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut L {
        &mut self.events
    }

    pub fn into_events(self) -> L {
        self.events
    }

    pub fn path(&self) -> &std::path::Path {
        self.file.path()
    }

    fn position(&self, booking_id: BookingId) -> Option<usize> {
        self.bookings
            .binary_search_by_key(&booking_id, |b| b.booking_id)
            .ok()
    }

    fn persist(&self) -> Result<(), StoreError> {
        self.file.save(self.next_id, &self.bookings)
    }
}
