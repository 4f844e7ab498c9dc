pub mod booking;
pub mod event;

pub use booking::Booking;
pub use event::Event;

pub type EventId = i64;
pub type BookingId = i64;
pub type SeatId = i64;
