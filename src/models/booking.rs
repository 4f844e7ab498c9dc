use serde::{Deserialize, Serialize};

use super::{BookingId, EventId, SeatId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub booking_id: BookingId,
    pub name: String,
    pub email: String,
    pub event_id: EventId,
    pub seat_ids: Vec<SeatId>,
    pub payment_method: String,
}
