//! Authorization rules, evaluated in one place for every mutation.

use crate::contract::model::{Event, Identity};

/// Organizers manage only the events they created.
pub fn can_manage(identity: &Identity, event: &Event) -> bool {
    identity.is_organizer && identity.id == event.organizer_id
}

pub fn can_create_events(identity: &Identity) -> bool {
    identity.is_organizer
}
