pub mod config;
pub mod database;
pub mod models;
pub mod services;

pub use database::StoreError;
pub use models::{Booking, BookingId, Event, EventId, SeatId};
pub use services::{BookingError, BookingManager, EventLookup, EventManager};
