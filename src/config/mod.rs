use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;
use validator::Validate;

// Top-level configuration, one field per setting
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Config {
    pub events_file: PathBuf,
    pub bookings_file: PathBuf,
    #[validate(range(min = 1, message = "a booking must be allowed at least one seat"))]
    pub max_seats_per_booking: usize,
    pub default_seats_per_event: u32,
    pub rust_log: String,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read configuration: {0}")]
    Source(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

// Booking settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingSettings {
    pub max_seats_per_booking: usize,
}

impl Default for BookingSettings {
    fn default() -> Self {
        BookingSettings {
            max_seats_per_booking: 5,
        }
    }
}

// Event settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventSettings {
    /// New events get seats `1..=default_seats_per_event`; zero means no seats.
    pub default_seats_per_event: u32,
}

impl Default for EventSettings {
    fn default() -> Self {
        EventSettings {
            default_seats_per_event: 100,
        }
    }
}

impl Config {
    /// Defaults overridden by `EVENTS_FILE`, `BOOKINGS_FILE`, `MAX_SEATS_PER_BOOKING`,
    /// `DEFAULT_SEATS_PER_EVENT` and `RUST_LOG`.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_source(config::Environment::default().try_parsing(true))
    }

    fn from_source(
        source: impl config::Source + Send + Sync + 'static,
    ) -> Result<Self, SettingsError> {
        let booking = BookingSettings::default();
        let events = EventSettings::default();

        let config: Config = config::Config::builder()
            .set_default("events_file", "events.json")?
            .set_default("bookings_file", "bookings.json")?
            .set_default("max_seats_per_booking", booking.max_seats_per_booking as u64)?
            .set_default("default_seats_per_event", u64::from(events.default_seats_per_event))?
            .set_default("rust_log", "ticket_booking=info")?
            .add_source(source)
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn booking_settings(&self) -> BookingSettings {
        BookingSettings {
            max_seats_per_booking: self.max_seats_per_booking,
        }
    }

    pub fn event_settings(&self) -> EventSettings {
        EventSettings {
            default_seats_per_event: self.default_seats_per_event,
        }
    }
}
