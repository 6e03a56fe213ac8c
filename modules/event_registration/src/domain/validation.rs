//! Input checks run before any store access.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::contract::model::{EventPatch, NewAccount, NewEvent, RegistrationForm};
use crate::domain::error::DomainError;

// E.164-style: optional '+', no leading zero, 2 to 15 digits.
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[1-9]\d{1,14}$").expect("phone pattern is a valid regex"));

pub const MIN_NAME_CHARS: usize = 2;
pub const MAX_DESCRIPTION_CHARS: usize = 300;
pub const MAX_QUESTION_CHARS: usize = 100;
pub const MAX_ANSWER_CHARS: usize = 500;
pub const MAX_COMMENT_CHARS: usize = 280;

fn chars(s: &str) -> usize {
    s.chars().count()
}

pub fn registration_form(form: &RegistrationForm) -> Result<(), DomainError> {
    if chars(form.full_name.trim()) < MIN_NAME_CHARS {
        return Err(DomainError::validation(
            "full_name",
            "Full name must be at least 2 characters",
        ));
    }
    if !PHONE_RE.is_match(form.phone_number.trim()) {
        return Err(DomainError::validation(
            "phone_number",
            "Invalid phone number",
        ));
    }
    if let Some(answer) = &form.custom_answer {
        if chars(answer) > MAX_ANSWER_CHARS {
            return Err(DomainError::validation(
                "custom_answer",
                format!("Answer must be at most {MAX_ANSWER_CHARS} characters"),
            ));
        }
    }
    Ok(())
}

pub fn new_account(account: &NewAccount) -> Result<(), DomainError> {
    let email = account.email.trim();
    if email.is_empty() || !email.contains('@') || !email.contains('.') {
        return Err(DomainError::validation("email", "Invalid email address"));
    }
    if chars(account.full_name.trim()) < MIN_NAME_CHARS {
        return Err(DomainError::validation(
            "full_name",
            "Full name must be at least 2 characters",
        ));
    }
    Ok(())
}

fn event_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("name", "Event name is required"));
    }
    Ok(())
}

fn event_description(description: &str) -> Result<(), DomainError> {
    let n = chars(description.trim());
    if n == 0 {
        return Err(DomainError::validation("description", "Description is required"));
    }
    if n > MAX_DESCRIPTION_CHARS {
        return Err(DomainError::validation(
            "description",
            format!("Description must be at most {MAX_DESCRIPTION_CHARS} characters"),
        ));
    }
    Ok(())
}

fn event_capacity(capacity: u32, max_capacity: u32) -> Result<(), DomainError> {
    if capacity > max_capacity {
        return Err(DomainError::validation(
            "capacity",
            format!("Capacity must be at most {max_capacity} (0 for unlimited)"),
        ));
    }
    Ok(())
}

fn event_schedule(at: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), DomainError> {
    if at <= now {
        return Err(DomainError::validation(
            "scheduled_at",
            "Event must be scheduled in the future",
        ));
    }
    Ok(())
}

fn event_question(question: &str) -> Result<(), DomainError> {
    if chars(question) > MAX_QUESTION_CHARS {
        return Err(DomainError::validation(
            "custom_question",
            format!("Question must be at most {MAX_QUESTION_CHARS} characters"),
        ));
    }
    Ok(())
}

pub fn new_event(event: &NewEvent, max_capacity: u32, now: DateTime<Utc>) -> Result<(), DomainError> {
    event_name(&event.name)?;
    event_description(&event.description)?;
    event_capacity(event.capacity, max_capacity)?;
    event_schedule(event.scheduled_at, now)?;
    if let Some(q) = &event.custom_question {
        event_question(q)?;
    }
    Ok(())
}

pub fn event_patch(patch: &EventPatch, max_capacity: u32, now: DateTime<Utc>) -> Result<(), DomainError> {
    if let Some(name) = &patch.name {
        event_name(name)?;
    }
    if let Some(description) = &patch.description {
        event_description(description)?;
    }
    if let Some(capacity) = patch.capacity {
        event_capacity(capacity, max_capacity)?;
    }
    if let Some(at) = patch.scheduled_at {
        event_schedule(at, now)?;
    }
    if let Some(q) = &patch.custom_question {
        event_question(q)?;
    }
    Ok(())
}

pub fn comment(content: &str) -> Result<(), DomainError> {
    let n = chars(content.trim());
    if n == 0 || n > MAX_COMMENT_CHARS {
        return Err(DomainError::validation(
            "content",
            format!("Comment must be 1 to {MAX_COMMENT_CHARS} characters"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::model::EventCategory;
    use chrono::Duration;

    fn form(name: &str, phone: &str) -> RegistrationForm {
        RegistrationForm {
            full_name: name.into(),
            phone_number: phone.into(),
            custom_answer: None,
        }
    }

    fn field_of(err: DomainError) -> String {
        match err {
            DomainError::Validation { field, .. } => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn phone_numbers() {
        assert!(registration_form(&form("Ada Lovelace", "+14155550123")).is_ok());
        assert!(registration_form(&form("Ada Lovelace", "14155550123")).is_ok());
        for bad in ["", "0123456", "+0", "12-34", "+1234567890123456", "phone"] {
            let err = registration_form(&form("Ada Lovelace", bad)).unwrap_err();
            assert_eq!(field_of(err), "phone_number", "phone {bad:?}");
        }
    }

    #[test]
    fn names_and_answers() {
        assert_eq!(field_of(registration_form(&form(" A ", "+123")).unwrap_err()), "full_name");
        let long_answer = RegistrationForm {
            custom_answer: Some("x".repeat(MAX_ANSWER_CHARS + 1)),
            ..form("Ada", "+123")
        };
        assert_eq!(field_of(registration_form(&long_answer).unwrap_err()), "custom_answer");
    }

    #[test]
    fn accounts() {
        let ok = NewAccount {
            email: "ada@example.com".into(),
            full_name: "Ada".into(),
            is_organizer: false,
        };
        assert!(new_account(&ok).is_ok());
        let bad_email = NewAccount {
            email: "ada-at-example".into(),
            ..ok.clone()
        };
        assert_eq!(field_of(new_account(&bad_email).unwrap_err()), "email");
    }

    #[test]
    fn events() {
        let now = Utc::now();
        let base = NewEvent {
            name: "RustConf".into(),
            description: "Talks and workshops".into(),
            category: EventCategory::Conference,
            capacity: 100,
            scheduled_at: now + Duration::days(3),
            is_featured: false,
            custom_question: None,
        };
        assert!(new_event(&base, 1000, now).is_ok());
        assert!(new_event(&NewEvent { capacity: 0, ..base.clone() }, 1000, now).is_ok());

        let cases = [
            (NewEvent { name: "  ".into(), ..base.clone() }, "name"),
            (NewEvent { description: "d".repeat(301), ..base.clone() }, "description"),
            (NewEvent { capacity: 1001, ..base.clone() }, "capacity"),
            (NewEvent { scheduled_at: now - Duration::hours(1), ..base.clone() }, "scheduled_at"),
            (NewEvent { custom_question: Some("q".repeat(101)), ..base.clone() }, "custom_question"),
        ];
        for (event, field) in cases {
            assert_eq!(field_of(new_event(&event, 1000, now).unwrap_err()), field);
        }
    }

    #[test]
    fn comments() {
        assert!(comment("Looking forward to it").is_ok());
        assert!(comment("   ").is_err());
        assert!(comment(&"c".repeat(281)).is_err());
        assert!(comment(&"c".repeat(280)).is_ok());
    }
}
