use std::collections::{HashMap, HashSet};

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::Service;
use crate::contract::model::{
    Event, Registration, RegistrationForm, RegistrationStatus, TimeFilter, UserRegistration,
};
use crate::domain::error::DomainError;
use crate::domain::policy;
use crate::domain::repo::{CommitOutcome, EventFilter, Window};
use crate::domain::validation;

impl Service {
    /// Admit `caller` to the event if a seat is free.
    ///
    /// Checks run in order: ended, full, already registered. The event read,
    /// the checks and the seat charge run under the per-event lock;
    /// the charge and the insert are one store transaction, so a failed
    /// insert never leaves a seat consumed.
    #[instrument(name = "event_registration.service.register", skip(self, form), fields(event_id = %event_id))]
    pub async fn register(
        &self,
        caller: Option<Uuid>,
        event_id: Uuid,
        form: RegistrationForm,
    ) -> Result<Registration, DomainError> {
        let identity = self.authenticate(caller).await?;
        validation::registration_form(&form)?;

        let _guard = self.lock_event(event_id).await?;

        // Capacity mode is read under the lock; resizes take the same lock.
        let event = self.load_event(event_id).await?;
        let now = self.now();
        if event.is_past(now) {
            return Err(DomainError::EventEnded { id: event_id });
        }

        let user_id = identity.id;
        // Capacity before duplicates: a full event reports `EventFull` to
        // every caller, including one already holding a seat.
        if !event.is_unlimited() && event.remaining_capacity == 0 {
            warn!(%user_id, capacity = event.capacity, "registration rejected, event full");
            return Err(DomainError::EventFull { id: event_id });
        }

        let existing = self
            .read("find_registration", move || {
                self.registrations.find_registration(event_id, user_id)
            })
            .await?;
        if existing.is_some() {
            return Err(DomainError::AlreadyRegistered { event_id, user_id });
        }

        let registration = Registration {
            id: Uuid::new_v4(),
            event_id,
            user_id,
            full_name: form.full_name.trim().to_string(),
            phone_number: form.phone_number.trim().to_string(),
            custom_answer: form.custom_answer.filter(|a| !a.trim().is_empty()),
            status: RegistrationStatus::Pending,
            created_at: now,
        };

        let outcome = self
            .registrations
            .commit_registration(registration.clone(), !event.is_unlimited())
            .await
            .map_err(DomainError::store)?;

        match outcome {
            CommitOutcome::Committed => {
                info!(registration_id = %registration.id, %user_id, "registration committed");
                Ok(registration)
            }
            CommitOutcome::CapacityExhausted => {
                warn!(%user_id, capacity = event.capacity, "registration rejected, event full");
                Err(DomainError::EventFull { id: event_id })
            }
            CommitOutcome::Duplicate => {
                warn!(%user_id, "registration rejected, already registered");
                Err(DomainError::AlreadyRegistered { event_id, user_id })
            }
        }
    }

    #[instrument(name = "event_registration.service.cancel", skip(self), fields(registration_id = %registration_id))]
    pub async fn cancel(&self, caller: Option<Uuid>, registration_id: Uuid) -> Result<(), DomainError> {
        let identity = self.authenticate(caller).await?;

        let registration = self
            .read("get_registration", move || {
                self.registrations.get_registration(registration_id)
            })
            .await?
            .ok_or_else(|| DomainError::registration_not_found(registration_id))?;
        if registration.user_id != identity.id {
            return Err(DomainError::NotOwner { id: registration_id });
        }

        let event = self.load_event(registration.event_id).await?;
        if event.is_past(self.now()) {
            return Err(DomainError::EventAlreadyOccurred { id: event.id });
        }

        let _guard = self.lock_event(event.id).await?;
        let released = self
            .registrations
            .release_registration(&registration)
            .await
            .map_err(DomainError::store)?;
        if !released {
            return Err(DomainError::registration_not_found(registration_id));
        }

        info!(event_id = %event.id, "registration cancelled");
        Ok(())
    }

    #[instrument(name = "event_registration.service.list_for_event", skip(self), fields(event_id = %event_id))]
    pub async fn list_for_event(&self, event_id: Uuid) -> Result<Vec<Registration>, DomainError> {
        let registrations = self
            .read("list_for_event", move || {
                self.registrations.list_for_event(event_id)
            })
            .await?;
        debug!(count = registrations.len(), "registrations listed");
        Ok(registrations)
    }

    /// Attendee list, visible to the organizer who manages the event.
    #[instrument(name = "event_registration.service.list_registrations_for_event", skip(self), fields(event_id = %event_id))]
    pub async fn list_registrations_for_event(
        &self,
        caller: Option<Uuid>,
        event_id: Uuid,
    ) -> Result<Vec<Registration>, DomainError> {
        let identity = self.authenticate(caller).await?;
        let event = self.load_event(event_id).await?;
        if !policy::can_manage(&identity, &event) {
            return Err(DomainError::forbidden("view attendees of this event"));
        }
        self.list_for_event(event_id).await
    }

    /// A user's registrations joined with their events, soonest first.
    #[instrument(name = "event_registration.service.list_for_user", skip(self), fields(user_id = %user_id, filter = ?filter))]
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        filter: TimeFilter,
    ) -> Result<Vec<UserRegistration>, DomainError> {
        let registrations = self
            .read("list_for_user", move || self.registrations.list_for_user(user_id))
            .await?;
        if registrations.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = registrations.iter().map(|r| r.event_id).collect();
        let events: HashMap<Uuid, Event> = self
            .events_by_ids(ids)
            .await?
            .into_iter()
            .map(|e| (e.id, e))
            .collect();

        let now = self.now();
        let mut joined: Vec<UserRegistration> = registrations
            .into_iter()
            .filter_map(|registration| {
                let event = events.get(&registration.event_id)?.clone();
                let keep = match filter {
                    TimeFilter::All => true,
                    TimeFilter::Upcoming => !event.is_past(now),
                    TimeFilter::Past => event.is_past(now),
                };
                keep.then_some(UserRegistration {
                    registration,
                    event,
                })
            })
            .collect();
        joined.sort_by_key(|r| r.event.scheduled_at);

        debug!(count = joined.len(), "user registrations listed");
        Ok(joined)
    }

    /// Upcoming events in the categories the user already signed up for.
    #[instrument(name = "event_registration.service.recommend_events", skip(self), fields(user_id = %user_id))]
    pub async fn recommend_events(&self, user_id: Uuid) -> Result<Vec<Event>, DomainError> {
        let registrations = self
            .read("list_for_user", move || self.registrations.list_for_user(user_id))
            .await?;
        if registrations.is_empty() {
            return Ok(Vec::new());
        }

        let attended: Vec<Uuid> = registrations.iter().map(|r| r.event_id).collect();
        let mut categories = Vec::new();
        let mut seen = HashSet::new();
        for event in self.events_by_ids(attended.clone()).await? {
            if seen.insert(event.category) {
                categories.push(event.category);
            }
        }
        if categories.is_empty() {
            return Ok(Vec::new());
        }

        let filter = EventFilter {
            scheduled_from: Some(self.now()),
            categories,
            exclude_ids: attended,
            ..EventFilter::default()
        };
        let window = Window {
            offset: 0,
            limit: u64::from(self.config.recommendation_limit),
        };
        let filter = &filter;
        self.read("query_events", move || self.events.query_events(filter, window))
            .await
    }

    pub(super) async fn events_by_ids(&self, ids: Vec<Uuid>) -> Result<Vec<Event>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let window = Window {
            offset: 0,
            limit: ids.len() as u64,
        };
        let filter = EventFilter {
            ids: Some(ids),
            ..EventFilter::default()
        };
        let filter = &filter;
        self.read("query_events", move || self.events.query_events(filter, window))
            .await
    }
}
