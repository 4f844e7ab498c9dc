use anyhow::Context;
use chrono::Local;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ticket_booking::{config::Config, BookingManager, EventManager};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env().context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.rust_log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ticket booking inventory report");

    let mut events = EventManager::open(&config.events_file, config.event_settings())
        .with_context(|| format!("Failed to open {}", config.events_file.display()))?;
    info!("Events loaded from {}", events.path().display());

    let bookings = BookingManager::open(&config.bookings_file, config.booking_settings(), &mut events)
        .with_context(|| format!("Failed to open {}", config.bookings_file.display()))?;
    info!("Bookings loaded from {}", bookings.path().display());

    for event in bookings.events().events() {
        info!(
            "Event {} '{}' at {} on {} {}: {}/{} seats available, {} bookings",
            event.event_id,
            event.event_name,
            event.venue,
            event.date,
            event.time,
            event.available_seats.len(),
            event.total_seats(),
            bookings.bookings_for_event(event.event_id).count()
        );
    }

    let now = Local::now().naive_local();
    let upcoming = bookings.events().upcoming_events(now);
    info!("{} upcoming events", upcoming.len());
    if let Some(next) = upcoming.first() {
        info!("Next event: {} '{}'", next.event_id, next.event_name);
    }

    let sold_out = bookings
        .events()
        .events()
        .iter()
        .filter(|e| e.is_sold_out())
        .count();
    info!(
        "{} events, {} sold out, {} bookings in total",
        bookings.events().events().len(),
        sold_out,
        bookings.bookings().len()
    );

    Ok(())
}
