pub mod bookings;
pub mod events;

pub use bookings::{BookingError, BookingManager};
pub use events::{EventLookup, EventManager};
