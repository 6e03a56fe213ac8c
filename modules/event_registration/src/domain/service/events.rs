use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::Service;
use crate::contract::model::{
    Event, EventDetails, EventPatch, EventQuery, EventStatusFilter, NewEvent, Page,
};
use crate::domain::error::DomainError;
use crate::domain::policy;
use crate::domain::repo::{EventFilter, UpdateOutcome, Window};
use crate::domain::validation;

impl Service {
    #[instrument(name = "event_registration.service.create_event", skip(self, new_event), fields(name = %new_event.name))]
    pub async fn create_event(
        &self,
        caller: Option<Uuid>,
        new_event: NewEvent,
    ) -> Result<Event, DomainError> {
        let identity = self.authenticate(caller).await?;
        if !policy::can_create_events(&identity) {
            return Err(DomainError::forbidden("create events"));
        }
        let now = self.now();
        validation::new_event(&new_event, self.config.max_capacity, now)?;

        let event = Event {
            id: Uuid::new_v4(),
            name: new_event.name.trim().to_string(),
            description: new_event.description.trim().to_string(),
            category: new_event.category,
            capacity: new_event.capacity,
            remaining_capacity: new_event.capacity,
            scheduled_at: new_event.scheduled_at,
            organizer_id: identity.id,
            is_featured: new_event.is_featured,
            custom_question: new_event.custom_question.filter(|q| !q.trim().is_empty()),
            created_at: now,
            updated_at: now,
        };

        self.events
            .insert_event(event.clone())
            .await
            .map_err(DomainError::store)?;

        info!(event_id = %event.id, capacity = event.capacity, "event created");
        Ok(event)
    }

    #[instrument(name = "event_registration.service.get_event", skip(self), fields(event_id = %id))]
    pub async fn get_event(&self, id: Uuid) -> Result<EventDetails, DomainError> {
        let event = self.load_event(id).await?;
        let registered_count = self
            .read("count_registrations", move || {
                self.registrations.count_registrations(id)
            })
            .await?;
        debug!(registered_count, "event loaded");
        Ok(EventDetails {
            event,
            registered_count,
        })
    }

    #[instrument(name = "event_registration.service.list_events", skip(self, query), fields(page = query.page))]
    pub async fn list_events(&self, query: EventQuery) -> Result<Page<Event>, DomainError> {
        let page = query.page.max(1);
        let page_size = query
            .page_size
            .unwrap_or(self.config.default_page_size)
            .clamp(1, self.config.max_page_size);

        let filter = EventFilter {
            scheduled_from: match query.status {
                EventStatusFilter::Upcoming => Some(self.now()),
                EventStatusFilter::All => None,
            },
            available_only: query.available,
            categories: query.category.into_iter().collect(),
            organizer_id: query.organizer_id,
            featured: query.featured,
            name_contains: query
                .search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            ..EventFilter::default()
        };
        // One extra row tells whether another page exists.
        let window = Window {
            offset: u64::from(page - 1) * u64::from(page_size),
            limit: u64::from(page_size) + 1,
        };

        let filter = &filter;
        let mut items = self
            .read("query_events", move || self.events.query_events(filter, window))
            .await?;
        let has_more = items.len() > page_size as usize;
        items.truncate(page_size as usize);

        debug!(count = items.len(), has_more, "events listed");
        Ok(Page {
            items,
            page,
            page_size,
            has_more,
        })
    }

    #[instrument(name = "event_registration.service.featured_events", skip(self))]
    pub async fn featured_events(&self) -> Result<Vec<Event>, DomainError> {
        let filter = EventFilter {
            scheduled_from: Some(self.now()),
            featured: Some(true),
            ..EventFilter::default()
        };
        let window = Window {
            offset: 0,
            limit: u64::from(self.config.featured_limit),
        };
        let filter = &filter;
        self.read("query_events", move || self.events.query_events(filter, window))
            .await
    }

    /// Apply `patch` as one store write. Runs under the per-event lock, so
    /// the capacity it compares against is the one it replaces.
    #[instrument(name = "event_registration.service.update_event", skip(self, patch), fields(event_id = %id))]
    pub async fn update_event(
        &self,
        caller: Option<Uuid>,
        id: Uuid,
        patch: EventPatch,
    ) -> Result<Event, DomainError> {
        let identity = self.authenticate(caller).await?;
        validation::event_patch(&patch, self.config.max_capacity, self.now())?;

        let _guard = self.lock_event(id).await?;
        let mut event = self.load_event(id).await?;
        if !policy::can_manage(&identity, &event) {
            return Err(DomainError::forbidden("manage this event"));
        }

        let capacity = patch.capacity.filter(|c| *c != event.capacity);
        if capacity.is_none() && !patch.touches_details() {
            return Ok(event);
        }

        apply_details(&mut event, patch);
        event.updated_at = self.now();
        match self
            .events
            .update_event(&event, capacity)
            .await
            .map_err(DomainError::store)?
        {
            UpdateOutcome::Updated => {}
            UpdateOutcome::BelowRegistrations { registered } => {
                let requested = capacity.unwrap_or(event.capacity);
                warn!(capacity = requested, registered, "capacity below current registrations");
                return Err(DomainError::CapacityBelowRegistrations {
                    requested,
                    registered,
                });
            }
            UpdateOutcome::EventMissing => return Err(DomainError::event_not_found(id)),
        }
        match capacity {
            Some(capacity) => info!(capacity, "event updated with new capacity"),
            None => info!("event details updated"),
        }

        self.load_event(id).await
    }

    #[instrument(name = "event_registration.service.delete_event", skip(self), fields(event_id = %id))]
    pub async fn delete_event(&self, caller: Option<Uuid>, id: Uuid) -> Result<(), DomainError> {
        let identity = self.authenticate(caller).await?;
        let event = self.load_event(id).await?;
        if !policy::can_manage(&identity, &event) {
            return Err(DomainError::forbidden("manage this event"));
        }

        let _guard = self.lock_event(id).await?;
        let deleted = self
            .events
            .delete_event(id)
            .await
            .map_err(DomainError::store)?;
        if !deleted {
            return Err(DomainError::event_not_found(id));
        }
        info!("event deleted");
        Ok(())
    }
}

fn apply_details(event: &mut Event, patch: EventPatch) {
    if let Some(name) = patch.name {
        event.name = name.trim().to_string();
    }
    if let Some(description) = patch.description {
        event.description = description.trim().to_string();
    }
    if let Some(category) = patch.category {
        event.category = category;
    }
    if let Some(at) = patch.scheduled_at {
        event.scheduled_at = at;
    }
    if let Some(featured) = patch.is_featured {
        event.is_featured = featured;
    }
    if let Some(question) = patch.custom_question {
        event.custom_question = Some(question).filter(|q| !q.trim().is_empty());
    }
}
