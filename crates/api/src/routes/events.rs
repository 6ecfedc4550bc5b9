//! Event routes: browsing, creation, draft editing, lifecycle transitions,
//! and the organizer's registration listing.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{Organizer, Session};
use crate::routes::registrations::RegistrationSummary;
use domain::models::{EventStatus, EventType, NewMerchandiseItem, UserRole};
use persistence::entities::{
    EventEntity, EventWithCountEntity, MerchandiseItemEntity, NewEventRow,
};
use persistence::repositories::{BrowseFilter, EventRepository, RegistrationRepository};
use shared::validation::{validate_registration_deadline, validate_schedule_window};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: Uuid,
    pub organizer_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub event_type: EventType,
    pub status: EventStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub venue: Option<String>,
    pub registration_limit: Option<i32>,
    pub registration_fee: Option<Decimal>,
    pub team_event: bool,
    pub max_team_size: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organizer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_count: Option<i64>,
}

impl From<EventEntity> for EventResponse {
    fn from(e: EventEntity) -> Self {
        Self {
            id: e.id,
            organizer_id: e.organizer_id,
            name: e.name,
            description: e.description,
            event_type: e.event_type.into(),
            status: e.status.into(),
            start_date: e.start_date,
            end_date: e.end_date,
            registration_deadline: e.registration_deadline,
            venue: e.venue,
            registration_limit: e.registration_limit,
            registration_fee: e.registration_fee,
            team_event: e.team_event,
            max_team_size: e.max_team_size,
            organizer_name: None,
            registration_count: None,
        }
    }
}

impl From<EventWithCountEntity> for EventResponse {
    fn from(e: EventWithCountEntity) -> Self {
        Self {
            id: e.id,
            organizer_id: e.organizer_id,
            name: e.name,
            description: e.description,
            event_type: e.event_type.into(),
            status: e.status.into(),
            start_date: e.start_date,
            end_date: e.end_date,
            registration_deadline: e.registration_deadline,
            venue: e.venue,
            registration_limit: e.registration_limit,
            registration_fee: e.registration_fee,
            team_event: e.team_event,
            max_team_size: e.max_team_size,
            organizer_name: e.organizer_name,
            registration_count: Some(e.registration_count),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchandiseItemResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub quantity: i32,
    pub max_per_participant: i32,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
}

impl From<MerchandiseItemEntity> for MerchandiseItemResponse {
    fn from(item: MerchandiseItemEntity) -> Self {
        Self {
            id: item.id,
            name: item.name,
            description: item.description,
            price: item.price,
            quantity: item.quantity,
            max_per_participant: item.max_per_participant,
            sizes: item.sizes,
            colors: item.colors,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetailResponse {
    #[serde(flatten)]
    pub event: EventResponse,
    pub merchandise: Vec<MerchandiseItemResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowseQuery {
    pub event_type: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[validate(length(min = 1, max = 200, message = "Event name must be 1-200 characters"))]
    pub name: String,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,

    pub event_type: EventType,

    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub registration_deadline: Option<DateTime<Utc>>,

    #[validate(length(max = 200, message = "Venue must be at most 200 characters"))]
    pub venue: Option<String>,

    #[validate(range(min = 1, message = "Registration limit must be at least 1"))]
    pub registration_limit: Option<i32>,

    pub registration_fee: Option<Decimal>,

    #[serde(default)]
    pub team_event: bool,

    #[validate(range(min = 2, message = "Team size must be at least 2"))]
    pub max_team_size: Option<i32>,

    #[serde(default)]
    #[validate(nested)]
    pub merchandise: Vec<NewMerchandiseItem>,
}

impl CreateEventRequest {
    /// Cross-field rules the derive cannot express.
    fn validate_rules(&self) -> Result<(), ApiError> {
        validate_schedule_window(self.start_date, self.end_date)
            .map_err(|e| ApiError::Validation(error_message(&e)))?;

        if let Some(deadline) = self.registration_deadline {
            validate_registration_deadline(deadline, self.start_date)
                .map_err(|e| ApiError::Validation(error_message(&e)))?;
        }

        if let Some(fee) = self.registration_fee {
            if fee < Decimal::ZERO {
                return Err(ApiError::Validation(
                    "Registration fee must not be negative".to_string(),
                ));
            }
        }

        if self.event_type != EventType::Merchandise && !self.merchandise.is_empty() {
            return Err(ApiError::Validation(
                "Merchandise items are only allowed on merchandise events".to_string(),
            ));
        }

        for item in &self.merchandise {
            if !item.validate_price() {
                return Err(ApiError::Validation(format!(
                    "Price of {} must not be negative",
                    item.name
                )));
            }
        }

        Ok(())
    }

    fn into_row(self) -> (NewEventRow, Vec<NewMerchandiseItem>) {
        let row = NewEventRow {
            name: self.name,
            description: self.description,
            event_type: self.event_type.into(),
            start_date: self.start_date,
            end_date: self.end_date,
            registration_deadline: self.registration_deadline,
            venue: self.venue,
            registration_limit: self.registration_limit,
            registration_fee: self.registration_fee,
            team_event: self.team_event,
            max_team_size: if self.team_event {
                self.max_team_size
            } else {
                None
            },
        };
        (row, self.merchandise)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRequest {
    pub status: String,
}

fn error_message(err: &validator::ValidationError) -> String {
    err.message
        .as_ref()
        .map(|m| m.to_string())
        .unwrap_or_else(|| "Invalid value".to_string())
}

/// GET /api/events
///
/// Browse published and ongoing events, optionally filtered by type and a
/// name search.
pub async fn browse(
    State(state): State<AppState>,
    Query(query): Query<BrowseQuery>,
) -> Result<Json<Vec<EventResponse>>, ApiError> {
    let event_type = match query.event_type.as_deref() {
        None => None,
        Some(raw) => Some(
            EventType::parse(raw)
                .ok_or_else(|| ApiError::Validation(format!("Unknown event type: {}", raw)))?,
        ),
    };

    let filter = BrowseFilter {
        event_type: event_type.map(Into::into),
        search: query.search,
    };

    let repo = EventRepository::new(state.pool.clone());
    let events = repo.list_browsable(&filter).await?;

    Ok(Json(events.into_iter().map(Into::into).collect()))
}

/// GET /api/events/:event_id
///
/// Event detail with merchandise items. Drafts are visible only to their
/// organizer.
pub async fn detail(
    State(state): State<AppState>,
    session: Session,
    Path(event_id): Path<Uuid>,
) -> Result<Json<EventDetailResponse>, ApiError> {
    let repo = EventRepository::new(state.pool.clone());
    let event = repo
        .find_by_id(event_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Event not found".to_string()))?;

    let status: EventStatus = event.status.into();
    let is_owner = session.role == UserRole::Organizer && session.user_id == event.organizer_id;
    if status == EventStatus::Draft && !is_owner {
        return Err(ApiError::NotFound("Event not found".to_string()));
    }

    let merchandise = repo.list_items(event_id).await?;

    Ok(Json(EventDetailResponse {
        event: event.into(),
        merchandise: merchandise.into_iter().map(Into::into).collect(),
    }))
}

/// POST /api/events
///
/// Organizer creates a draft event, optionally with merchandise items.
pub async fn create(
    State(state): State<AppState>,
    Organizer(session): Organizer,
    Json(request): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<EventDetailResponse>), ApiError> {
    request.validate()?;
    request.validate_rules()?;

    let (row, items) = request.into_row();
    let repo = EventRepository::new(state.pool.clone());
    let event = repo.create_with_items(session.user_id, &row, &items).await?;

    info!(event_id = %event.id, organizer_id = %session.user_id, "Event created");

    let merchandise = repo.list_items(event.id).await?;
    Ok((
        StatusCode::CREATED,
        Json(EventDetailResponse {
            event: event.into(),
            merchandise: merchandise.into_iter().map(Into::into).collect(),
        }),
    ))
}

/// PUT /api/events/:event_id
///
/// Owner edits fields while the event is still a draft. The event type and
/// item list are fixed at creation.
pub async fn update(
    State(state): State<AppState>,
    Organizer(session): Organizer,
    Path(event_id): Path<Uuid>,
    Json(request): Json<CreateEventRequest>,
) -> Result<Json<EventResponse>, ApiError> {
    request.validate()?;
    request.validate_rules()?;

    let repo = EventRepository::new(state.pool.clone());
    let existing = repo
        .find_by_id(event_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Event not found".to_string()))?;

    if existing.organizer_id != session.user_id {
        return Err(ApiError::Forbidden("You do not own this event".to_string()));
    }

    let (row, _items) = request.into_row();
    let updated = repo
        .update_draft(event_id, session.user_id, &row)
        .await?
        .ok_or_else(|| {
            ApiError::Validation("Only draft events can be edited".to_string())
        })?;

    Ok(Json(updated.into()))
}

/// POST /api/events/:event_id/status
///
/// Owner advances the event one step along
/// draft -> published -> ongoing -> completed.
pub async fn advance_status(
    State(state): State<AppState>,
    Organizer(session): Organizer,
    Path(event_id): Path<Uuid>,
    Json(request): Json<StatusRequest>,
) -> Result<Json<EventResponse>, ApiError> {
    let target = EventStatus::parse(&request.status)
        .ok_or_else(|| ApiError::Validation(format!("Unknown status: {}", request.status)))?;

    let repo = EventRepository::new(state.pool.clone());
    let event = repo
        .find_by_id(event_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Event not found".to_string()))?;

    if event.organizer_id != session.user_id {
        return Err(ApiError::Forbidden("You do not own this event".to_string()));
    }

    let current: EventStatus = event.status.into();
    if !current.can_transition_to(target) {
        return Err(ApiError::Validation(format!(
            "Cannot transition from {} to {}",
            current, target
        )));
    }

    let updated = repo
        .set_status(event_id, current.into(), target.into())
        .await?;
    if updated == 0 {
        // Lost a compare-and-set race with a concurrent transition.
        return Err(ApiError::Conflict(
            "Event status changed concurrently".to_string(),
        ));
    }

    info!(event_id = %event_id, from = %current, to = %target, "Event status advanced");

    let refreshed = repo
        .find_by_id(event_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Event not found".to_string()))?;
    Ok(Json(refreshed.into()))
}

/// GET /api/events/:event_id/registrations
///
/// Owner lists an event's registrations.
pub async fn list_registrations(
    State(state): State<AppState>,
    Organizer(session): Organizer,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Vec<RegistrationSummary>>, ApiError> {
    let events = EventRepository::new(state.pool.clone());
    let event = events
        .find_by_id(event_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Event not found".to_string()))?;

    if event.organizer_id != session.user_id {
        return Err(ApiError::Forbidden("You do not own this event".to_string()));
    }

    let registrations = RegistrationRepository::new(state.pool.clone());
    let rows = registrations.list_for_event(event_id).await?;

    Ok(Json(rows.into_iter().map(Into::into).collect()))
}
