use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of event, as offered by organizers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Workshop,
    Conference,
    Meetup,
}

impl EventCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Workshop => "workshop",
            Self::Conference => "conference",
            Self::Meetup => "meetup",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "workshop" => Ok(Self::Workshop),
            "conference" => Ok(Self::Conference),
            "meetup" => Ok(Self::Meetup),
            other => Err(format!("unknown category '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: EventCategory,
    /// Maximum concurrent registrations; 0 means unlimited.
    pub capacity: u32,
    /// Seats left; meaningful only when `capacity > 0`.
    pub remaining_capacity: u32,
    pub scheduled_at: DateTime<Utc>,
    pub organizer_id: Uuid,
    pub is_featured: bool,
    /// Extra prompt shown on the registration form.
    pub custom_question: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn is_unlimited(&self) -> bool {
        self.capacity == 0
    }

    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        self.scheduled_at < now
    }
}

/// Event plus its live registration count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDetails {
    pub event: Event,
    pub registered_count: u64,
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub name: String,
    pub description: String,
    pub category: EventCategory,
    pub capacity: u32,
    pub scheduled_at: DateTime<Utc>,
    pub is_featured: bool,
    pub custom_question: Option<String>,
}

/// Partial update; `None` leaves a field unchanged.
/// An empty `custom_question` clears the prompt.
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<EventCategory>,
    pub capacity: Option<u32>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub is_featured: Option<bool>,
    pub custom_question: Option<String>,
}

impl EventPatch {
    pub fn touches_details(&self) -> bool {
        self.name.is_some()
            || self.description.is_some()
            || self.category.is_some()
            || self.scheduled_at.is_some()
            || self.is_featured.is_some()
            || self.custom_question.is_some()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatusFilter {
    #[default]
    Upcoming,
    All,
}

#[derive(Debug, Clone, Default)]
pub struct EventQuery {
    pub status: EventStatusFilter,
    /// Only events with seats left (or unlimited).
    pub available: bool,
    pub category: Option<EventCategory>,
    pub organizer_id: Option<Uuid>,
    pub featured: Option<bool>,
    /// Case-insensitive substring of the event name.
    pub search: Option<String>,
    /// 1-based; 0 is treated as 1.
    pub page: u32,
    pub page_size: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub has_more: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    Pending,
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
        }
    }
}

impl FromStr for RegistrationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            other => Err(format!("unknown registration status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub full_name: String,
    pub phone_number: String,
    pub custom_answer: Option<String>,
    pub status: RegistrationStatus,
    pub created_at: DateTime<Utc>,
}

/// Attendee details collected when registering.
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub full_name: String,
    pub phone_number: String,
    pub custom_answer: Option<String>,
}

/// A user's registration joined with its event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRegistration {
    pub registration: Registration,
    pub event: Event,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFilter {
    Upcoming,
    Past,
    #[default]
    All,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub is_organizer: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub full_name: String,
    pub is_organizer: bool,
}

/// Resolved caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub id: Uuid,
    pub is_organizer: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
