//! Event Service - library events announced by staff

use super::{Catalog, ServiceError};
use crate::models::LibraryEvent;

pub fn create_event(
    catalog: &mut Catalog,
    event_id: &str,
    title: &str,
    description: &str,
    event_date: i64,
    location: &str,
    now: i64,
) -> Result<(), ServiceError> {
    if catalog.find_event(event_id).is_some() {
        return Err(ServiceError::duplicate("Event", event_id));
    }
    let event = LibraryEvent::new_at(event_id, title, description, event_date, location, now)?;
    tracing::info!("Event '{}' scheduled: {}", event_id, title);
    catalog.events.push(event);
    Ok(())
}

/// Events not yet past, soonest first
pub fn upcoming_events(catalog: &Catalog, now: i64) -> Vec<&LibraryEvent> {
    let mut events: Vec<&LibraryEvent> = catalog
        .events
        .iter()
        .filter(|e| e.is_upcoming_at(now))
        .collect();
    events.sort_by_key(|e| e.event_date());
    events
}
