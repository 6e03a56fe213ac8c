use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::contract::model::{
    Account, Comment, Event, EventCategory, EventDetails, EventPatch, EventQuery,
    EventStatusFilter, NewAccount, NewEvent, Page, Registration, RegistrationForm, TimeFilter,
    UserRegistration,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CategoryDto {
    Workshop,
    Conference,
    Meetup,
}

impl From<EventCategory> for CategoryDto {
    fn from(c: EventCategory) -> Self {
        match c {
            EventCategory::Workshop => Self::Workshop,
            EventCategory::Conference => Self::Conference,
            EventCategory::Meetup => Self::Meetup,
        }
    }
}

impl From<CategoryDto> for EventCategory {
    fn from(c: CategoryDto) -> Self {
        match c {
            CategoryDto::Workshop => Self::Workshop,
            CategoryDto::Conference => Self::Conference,
            CategoryDto::Meetup => Self::Meetup,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccountDto {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub is_organizer: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SignUpReq {
    pub email: String,
    pub full_name: String,
    #[serde(default)]
    pub is_organizer: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventDto {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: CategoryDto,
    /// 0 means unlimited.
    pub capacity: u32,
    pub remaining_capacity: u32,
    pub scheduled_at: DateTime<Utc>,
    pub organizer_id: Uuid,
    pub is_featured: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub custom_question: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventDetailsDto {
    pub event: EventDto,
    pub registered_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateEventReq {
    pub name: String,
    pub description: String,
    pub category: CategoryDto,
    /// 0 or omitted means unlimited.
    #[serde(default)]
    pub capacity: u32,
    pub scheduled_at: DateTime<Utc>,
    #[serde(default)]
    pub is_featured: bool,
    pub custom_question: Option<String>,
}

/// Partial update; omitted fields stay as they are.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateEventReq {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<CategoryDto>,
    pub capacity: Option<u32>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub is_featured: Option<bool>,
    /// Empty string removes the question.
    pub custom_question: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilterDto {
    #[default]
    Upcoming,
    All,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListEventsQuery {
    /// `upcoming` (default) or `all`.
    pub status: Option<StatusFilterDto>,
    /// Only events with free seats.
    pub available: Option<bool>,
    pub category: Option<CategoryDto>,
    pub organizer_id: Option<Uuid>,
    pub featured: Option<bool>,
    /// Case-insensitive match on the event name.
    pub search: Option<String>,
    /// 1-based page number.
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventPageDto {
    pub items: Vec<EventDto>,
    pub page: u32,
    pub page_size: u32,
    pub has_more: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterReq {
    pub full_name: String,
    pub phone_number: String,
    pub custom_answer: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegistrationDto {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub full_name: String,
    pub phone_number: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub custom_answer: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserRegistrationDto {
    pub registration: RegistrationDto,
    pub event: EventDto,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TimeFilterDto {
    Upcoming,
    Past,
    #[default]
    All,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MyRegistrationsQuery {
    /// `upcoming`, `past` or `all` (default).
    pub filter: Option<TimeFilterDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CommentReq {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CommentDto {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FavoriteDto {
    pub event_id: Uuid,
    pub favorite: bool,
}

// Conversions between REST DTOs and contract models

impl From<Account> for AccountDto {
    fn from(a: Account) -> Self {
        Self {
            id: a.id,
            email: a.email,
            full_name: a.full_name,
            is_organizer: a.is_organizer,
            created_at: a.created_at,
        }
    }
}

impl From<SignUpReq> for NewAccount {
    fn from(req: SignUpReq) -> Self {
        Self {
            email: req.email,
            full_name: req.full_name,
            is_organizer: req.is_organizer,
        }
    }
}

impl From<Event> for EventDto {
    fn from(e: Event) -> Self {
        Self {
            id: e.id,
            name: e.name,
            description: e.description,
            category: e.category.into(),
            capacity: e.capacity,
            remaining_capacity: e.remaining_capacity,
            scheduled_at: e.scheduled_at,
            organizer_id: e.organizer_id,
            is_featured: e.is_featured,
            custom_question: e.custom_question,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

impl From<EventDetails> for EventDetailsDto {
    fn from(d: EventDetails) -> Self {
        Self {
            event: d.event.into(),
            registered_count: d.registered_count,
        }
    }
}

impl From<CreateEventReq> for NewEvent {
    fn from(req: CreateEventReq) -> Self {
        Self {
            name: req.name,
            description: req.description,
            category: req.category.into(),
            capacity: req.capacity,
            scheduled_at: req.scheduled_at,
            is_featured: req.is_featured,
            custom_question: req.custom_question,
        }
    }
}

impl From<UpdateEventReq> for EventPatch {
    fn from(req: UpdateEventReq) -> Self {
        Self {
            name: req.name,
            description: req.description,
            category: req.category.map(Into::into),
            capacity: req.capacity,
            scheduled_at: req.scheduled_at,
            is_featured: req.is_featured,
            custom_question: req.custom_question,
        }
    }
}

impl From<ListEventsQuery> for EventQuery {
    fn from(q: ListEventsQuery) -> Self {
        Self {
            status: match q.status.unwrap_or_default() {
                StatusFilterDto::Upcoming => EventStatusFilter::Upcoming,
                StatusFilterDto::All => EventStatusFilter::All,
            },
            available: q.available.unwrap_or(false),
            category: q.category.map(Into::into),
            organizer_id: q.organizer_id,
            featured: q.featured,
            search: q.search,
            page: q.page.unwrap_or(1),
            page_size: q.page_size,
        }
    }
}

impl From<Page<Event>> for EventPageDto {
    fn from(p: Page<Event>) -> Self {
        Self {
            items: p.items.into_iter().map(EventDto::from).collect(),
            page: p.page,
            page_size: p.page_size,
            has_more: p.has_more,
        }
    }
}

impl From<RegisterReq> for RegistrationForm {
    fn from(req: RegisterReq) -> Self {
        Self {
            full_name: req.full_name,
            phone_number: req.phone_number,
            custom_answer: req.custom_answer,
        }
    }
}

impl From<Registration> for RegistrationDto {
    fn from(r: Registration) -> Self {
        Self {
            id: r.id,
            event_id: r.event_id,
            user_id: r.user_id,
            full_name: r.full_name,
            phone_number: r.phone_number,
            custom_answer: r.custom_answer,
            status: r.status.as_str().to_string(),
            created_at: r.created_at,
        }
    }
}

impl From<UserRegistration> for UserRegistrationDto {
    fn from(r: UserRegistration) -> Self {
        Self {
            registration: r.registration.into(),
            event: r.event.into(),
        }
    }
}

impl From<TimeFilterDto> for TimeFilter {
    fn from(f: TimeFilterDto) -> Self {
        match f {
            TimeFilterDto::Upcoming => Self::Upcoming,
            TimeFilterDto::Past => Self::Past,
            TimeFilterDto::All => Self::All,
        }
    }
}

impl From<Comment> for CommentDto {
    fn from(c: Comment) -> Self {
        Self {
            id: c.id,
            event_id: c.event_id,
            user_id: c.user_id,
            content: c.content,
            created_at: c.created_at,
        }
    }
}
