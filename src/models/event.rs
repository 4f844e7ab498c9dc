use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{EventId, SeatId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub event_id: EventId,
    pub event_name: String,
    pub time: String,
    pub date: String,
    pub venue: String,
    #[serde(default)]
    pub available_seats: BTreeSet<SeatId>,
    #[serde(default)]
    pub unavailable_seats: BTreeSet<SeatId>,
}

impl Event {
    /// Start of the event, if `date` is `YYYY-MM-DD` and `time` is `HH:MM` or `HH:MM:SS`.
    pub fn starts_at(&self) -> Option<NaiveDateTime> {
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok()?;
        let time = NaiveTime::parse_from_str(self.time.trim(), "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(self.time.trim(), "%H:%M:%S"))
            .ok()?;
        Some(date.and_time(time))
    }

    pub fn total_seats(&self) -> usize {
        self.available_seats.len() + self.unavailable_seats.len()
    }

    pub fn is_sold_out(&self) -> bool {
        self.available_seats.is_empty() && !self.unavailable_seats.is_empty()
    }

    pub fn is_available(&self, seat_id: SeatId) -> bool {
        self.available_seats.contains(&seat_id)
    }

    // Seat moves keep the two sets disjoint: a seat leaves one set before entering the other.
    pub(crate) fn reserve_seats(&mut self, seat_ids: &[SeatId]) {
        for seat_id in seat_ids {
            self.available_seats.remove(seat_id);
            self.unavailable_seats.insert(*seat_id);
        }
    }

    /// Seats that are not currently booked are left alone, so the inventory never grows.
    pub(crate) fn release_seats(&mut self, seat_ids: &[SeatId]) {
        for seat_id in seat_ids {
            if self.unavailable_seats.remove(seat_id) {
                self.available_seats.insert(*seat_id);
            }
        }
    }
}
