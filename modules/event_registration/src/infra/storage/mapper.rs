//! Conversions between storage rows and contract models.

use anyhow::Context;
use sea_orm::ActiveValue::Set;

use crate::contract::model::{Account, Comment, Event, Registration};
use crate::infra::storage::entity::{account, comment, event, registration};

fn count_from_db(value: i32, column: &str) -> anyhow::Result<u32> {
    u32::try_from(value).with_context(|| format!("negative {column}: {value}"))
}

/// Saturates at `i32::MAX`; capacities are validated far below it.
pub fn count_to_db(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

pub fn account_from_row(row: account::Model) -> Account {
    Account {
        id: row.id,
        email: row.email,
        full_name: row.full_name,
        is_organizer: row.is_organizer,
        created_at: row.created_at,
    }
}

pub fn account_to_row(a: Account) -> account::ActiveModel {
    account::ActiveModel {
        id: Set(a.id),
        email: Set(a.email),
        full_name: Set(a.full_name),
        is_organizer: Set(a.is_organizer),
        created_at: Set(a.created_at),
    }
}

pub fn event_from_row(row: event::Model) -> anyhow::Result<Event> {
    Ok(Event {
        id: row.id,
        category: row.category.parse().map_err(anyhow::Error::msg)?,
        capacity: count_from_db(row.capacity, "capacity")?,
        remaining_capacity: count_from_db(row.remaining_capacity, "remaining_capacity")?,
        name: row.name,
        description: row.description,
        scheduled_at: row.scheduled_at,
        organizer_id: row.organizer_id,
        is_featured: row.is_featured,
        custom_question: row.custom_question,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

pub fn event_to_row(e: Event) -> event::ActiveModel {
    event::ActiveModel {
        id: Set(e.id),
        name: Set(e.name),
        description: Set(e.description),
        category: Set(e.category.as_str().to_string()),
        capacity: Set(count_to_db(e.capacity)),
        remaining_capacity: Set(count_to_db(e.remaining_capacity)),
        scheduled_at: Set(e.scheduled_at),
        organizer_id: Set(e.organizer_id),
        is_featured: Set(e.is_featured),
        custom_question: Set(e.custom_question),
        created_at: Set(e.created_at),
        updated_at: Set(e.updated_at),
    }
}

/// Only the descriptive columns; capacity columns stay `NotSet`.
pub fn event_details_to_row(e: &Event) -> event::ActiveModel {
    event::ActiveModel {
        name: Set(e.name.clone()),
        description: Set(e.description.clone()),
        category: Set(e.category.as_str().to_string()),
        scheduled_at: Set(e.scheduled_at),
        is_featured: Set(e.is_featured),
        custom_question: Set(e.custom_question.clone()),
        updated_at: Set(e.updated_at),
        ..Default::default()
    }
}

pub fn registration_from_row(row: registration::Model) -> anyhow::Result<Registration> {
    Ok(Registration {
        id: row.id,
        event_id: row.event_id,
        user_id: row.user_id,
        full_name: row.full_name,
        phone_number: row.phone_number,
        custom_answer: row.custom_answer,
        status: row.status.parse().map_err(anyhow::Error::msg)?,
        created_at: row.created_at,
    })
}

pub fn registration_to_row(r: Registration) -> registration::ActiveModel {
    registration::ActiveModel {
        id: Set(r.id),
        event_id: Set(r.event_id),
        user_id: Set(r.user_id),
        full_name: Set(r.full_name),
        phone_number: Set(r.phone_number),
        custom_answer: Set(r.custom_answer),
        status: Set(r.status.as_str().to_string()),
        created_at: Set(r.created_at),
    }
}

pub fn comment_from_row(row: comment::Model) -> Comment {
    Comment {
        id: row.id,
        event_id: row.event_id,
        user_id: row.user_id,
        content: row.content,
        created_at: row.created_at,
    }
}

pub fn comment_to_row(c: Comment) -> comment::ActiveModel {
    comment::ActiveModel {
        id: Set(c.id),
        event_id: Set(c.event_id),
        user_id: Set(c.user_id),
        content: Set(c.content),
        created_at: Set(c.created_at),
    }
}
