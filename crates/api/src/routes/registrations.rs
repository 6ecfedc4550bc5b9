//! Registration routes: sign-up, tickets, CSV export, attendance scanning,
//! and merchandise purchase.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{Organizer, Participant};
use crate::services::email::PurchaseEmailLine;
use crate::services::{csv_export, qr};
use domain::models::{
    EventStatus, EventType, PaymentStatus, PurchaseRequest, RegistrationStatus, TicketQrPayload,
};
use domain::services::ticketing::generate_ticket_code;
use persistence::entities::{
    PurchaseItemWithNameEntity, PurchaseLine, RegistrationDetailEntity, RegistrationStatusDb,
};
use persistence::repositories::{
    EventRepository, PurchaseError, RegistrationRepository, UserRepository,
};

/// How many ticket-code collisions to tolerate before giving up. At ten
/// random characters a second collision in a row is effectively impossible.
const TICKET_CODE_ATTEMPTS: usize = 3;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventBrief {
    pub id: Uuid,
    pub name: String,
    pub event_type: EventType,
    pub status: EventStatus,
    pub start_date: DateTime<Utc>,
    pub venue: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantBrief {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

/// Registration with event and participant summaries. Serves the
/// participant's list, the organizer's list, and the sign-up response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationSummary {
    pub id: Uuid,
    pub ticket_code: String,
    pub status: RegistrationStatus,
    pub registered_at: DateTime<Utc>,
    pub attended: bool,
    pub purchase_total: Decimal,
    pub payment_status: Option<PaymentStatus>,
    pub event: EventBrief,
    pub participant: ParticipantBrief,
}

impl From<RegistrationDetailEntity> for RegistrationSummary {
    fn from(r: RegistrationDetailEntity) -> Self {
        let participant_name = r.participant_name();
        Self {
            id: r.id,
            ticket_code: r.ticket_code,
            status: r.status.into(),
            registered_at: r.registered_at,
            attended: r.attended,
            purchase_total: r.purchase_total,
            payment_status: r.payment_status.map(Into::into),
            event: EventBrief {
                id: r.event_id,
                name: r.event_name,
                event_type: r.event_type.into(),
                status: r.event_status.into(),
                start_date: r.event_start_date,
                venue: r.event_venue,
            },
            participant: ParticipantBrief {
                id: r.participant_id,
                email: r.participant_email,
                name: participant_name,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub event_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchasedItemResponse {
    pub item_id: Uuid,
    pub item_name: String,
    pub quantity: i32,
    pub selected_size: Option<String>,
    pub selected_color: Option<String>,
    pub unit_price: Decimal,
    pub purchased_at: DateTime<Utc>,
}

impl From<PurchaseItemWithNameEntity> for PurchasedItemResponse {
    fn from(p: PurchaseItemWithNameEntity) -> Self {
        Self {
            item_id: p.item_id,
            item_name: p.item_name,
            quantity: p.quantity,
            selected_size: p.selected_size,
            selected_color: p.selected_color,
            unit_price: p.unit_price,
            purchased_at: p.purchased_at,
        }
    }
}

/// Registration with its accumulated merchandise order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationDetailResponse {
    #[serde(flatten)]
    pub registration: RegistrationSummary,
    pub purchases: Vec<PurchasedItemResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketResponse {
    pub ticket_code: String,
    pub qr_code: String,
    pub status: RegistrationStatus,
    pub registered_at: DateTime<Utc>,
    pub attended: bool,
    pub event: EventBrief,
    pub participant: ParticipantBrief,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VerifyQrRequest {
    #[validate(length(min = 1, message = "Ticket code is required"))]
    pub ticket_code: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyQrResponse {
    pub ticket_code: String,
    pub already_checked_in: bool,
    pub event: EventBrief,
    pub participant: ParticipantBrief,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseLineResponse {
    pub item_id: Uuid,
    pub item_name: String,
    pub quantity: i32,
    pub selected_size: Option<String>,
    pub selected_color: Option<String>,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResponse {
    pub registration_id: Uuid,
    pub items: Vec<PurchaseLineResponse>,
    pub order_total: Decimal,
    /// Running total across all of this registration's orders.
    pub purchase_total: Decimal,
    pub payment_status: PaymentStatus,
}

/// POST /api/registrations
///
/// Participant registers for an event. The registration limit is enforced in
/// the same statement as the insert, so the event cannot be oversubscribed
/// by concurrent sign-ups.
pub async fn register(
    State(state): State<AppState>,
    Participant(session): Participant,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegistrationSummary>), ApiError> {
    let events = EventRepository::new(state.pool.clone());
    let event = events
        .find_by_id(request.event_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Event not found".to_string()))?;

    let status: EventStatus = event.status.into();
    if !status.accepts_registrations() {
        return Err(ApiError::Validation(
            "Event is not open for registration".to_string(),
        ));
    }

    if let Some(deadline) = event.registration_deadline {
        if Utc::now() > deadline {
            return Err(ApiError::Validation(
                "Registration deadline has passed".to_string(),
            ));
        }
    }

    let registrations = RegistrationRepository::new(state.pool.clone());
    if registrations
        .find_for_event_and_participant(event.id, session.user_id)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(
            "Already registered for this event".to_string(),
        ));
    }

    let mut created = None;
    for _ in 0..TICKET_CODE_ATTEMPTS {
        let ticket_code = generate_ticket_code();
        match registrations
            .create(
                event.id,
                session.user_id,
                &ticket_code,
                event.registration_limit,
            )
            .await
        {
            Ok(Some(registration)) => {
                created = Some(registration);
                break;
            }
            Ok(None) => {
                return Err(ApiError::Validation(
                    "Event has reached its registration limit".to_string(),
                ));
            }
            Err(sqlx::Error::Database(db)) if db.code().as_deref() == Some("23505") => {
                let constraint = db.constraint().unwrap_or_default();
                if constraint.contains("ticket_code") {
                    continue;
                }
                return Err(ApiError::Conflict(
                    "Already registered for this event".to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        }
    }
    let registration = created
        .ok_or_else(|| ApiError::Internal("Could not issue a unique ticket code".to_string()))?;

    info!(
        registration_id = %registration.id,
        event_id = %event.id,
        participant_id = %session.user_id,
        "Registration created"
    );

    // Confirmation email is best-effort; the registration stands either way.
    let users = UserRepository::new(state.pool.clone());
    if let Some(user) = users.find_by_id(session.user_id).await? {
        if let Err(e) = state
            .email
            .send_ticket_confirmation(
                &user.email,
                user.first_name.as_deref(),
                &event.name,
                &registration.ticket_code,
            )
            .await
        {
            warn!(registration_id = %registration.id, error = %e, "Ticket email failed");
        }
    }

    let detail = registrations
        .find_detail(registration.id)
        .await?
        .ok_or_else(|| ApiError::Internal("Registration vanished after insert".to_string()))?;

    Ok((StatusCode::CREATED, Json(detail.into())))
}

/// GET /api/registrations/:registration_id
///
/// Owner fetches one registration with its merchandise order lines.
pub async fn detail(
    State(state): State<AppState>,
    Participant(session): Participant,
    Path(registration_id): Path<Uuid>,
) -> Result<Json<RegistrationDetailResponse>, ApiError> {
    let repo = RegistrationRepository::new(state.pool.clone());
    let registration = repo
        .find_detail(registration_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Registration not found".to_string()))?;

    if registration.participant_id != session.user_id {
        return Err(ApiError::Forbidden(
            "You do not own this registration".to_string(),
        ));
    }

    let purchases = repo.list_purchase_items(registration_id).await?;

    Ok(Json(RegistrationDetailResponse {
        registration: registration.into(),
        purchases: purchases.into_iter().map(Into::into).collect(),
    }))
}

/// GET /api/registrations/:registration_id/ticket
///
/// Owner fetches the ticket. The QR image is generated on first view and
/// persisted; every later fetch returns the stored value unchanged.
pub async fn ticket(
    State(state): State<AppState>,
    Participant(session): Participant,
    Path(registration_id): Path<Uuid>,
) -> Result<Json<TicketResponse>, ApiError> {
    let repo = RegistrationRepository::new(state.pool.clone());
    let detail = repo
        .find_detail(registration_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Registration not found".to_string()))?;

    if detail.participant_id != session.user_id {
        return Err(ApiError::Forbidden(
            "You do not own this registration".to_string(),
        ));
    }

    let qr_code = match &detail.qr_code {
        Some(existing) => existing.clone(),
        None => {
            let payload = TicketQrPayload {
                ticket_code: detail.ticket_code.clone(),
                participant_id: detail.participant_id,
                event_id: detail.event_id,
                registered_at: detail.registered_at,
            };
            let rendered = qr::render_ticket_qr(&payload)
                .map_err(|e| ApiError::Internal(format!("QR rendering failed: {}", e)))?;

            // COALESCE in the store keeps whichever write landed first, so
            // concurrent first views still converge on one stored image.
            let stored = repo.store_qr_code(registration_id, &rendered).await?;
            stored
                .qr_code
                .ok_or_else(|| ApiError::Internal("QR code missing after store".to_string()))?
        }
    };

    let participant_name = detail.participant_name();
    Ok(Json(TicketResponse {
        ticket_code: detail.ticket_code,
        qr_code,
        status: detail.status.into(),
        registered_at: detail.registered_at,
        attended: detail.attended,
        event: EventBrief {
            id: detail.event_id,
            name: detail.event_name,
            event_type: detail.event_type.into(),
            status: detail.event_status.into(),
            start_date: detail.event_start_date,
            venue: detail.event_venue,
        },
        participant: ParticipantBrief {
            id: detail.participant_id,
            email: detail.participant_email,
            name: participant_name,
        },
    }))
}

/// GET /api/registrations/event/:event_id/csv
///
/// Owning organizer downloads the event's registrations as CSV.
pub async fn export_csv(
    State(state): State<AppState>,
    Organizer(session): Organizer,
    Path(event_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
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
    let csv = csv_export::registrations_to_csv(&rows);

    info!(event_id = %event_id, rows = rows.len(), "Registrations exported");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!(
                    "attachment; filename=\"{}\"",
                    csv_export::export_filename(&event.name)
                ),
            ),
        ],
        csv,
    ))
}

/// POST /api/registrations/verify-qr
///
/// Organizer scans a ticket at the door: resolves the code, checks the
/// ticket belongs to one of their events, and marks attendance.
pub async fn verify_qr(
    State(state): State<AppState>,
    Organizer(session): Organizer,
    Json(request): Json<VerifyQrRequest>,
) -> Result<Json<VerifyQrResponse>, ApiError> {
    request.validate()?;

    let repo = RegistrationRepository::new(state.pool.clone());
    let detail = repo
        .find_by_ticket_code(&request.ticket_code)
        .await?
        .ok_or_else(|| ApiError::NotFound("Invalid ticket".to_string()))?;

    if detail.event_organizer_id != session.user_id {
        return Err(ApiError::Forbidden(
            "Ticket belongs to another organizer's event".to_string(),
        ));
    }

    if detail.status == RegistrationStatusDb::Cancelled {
        return Err(ApiError::Validation(
            "Registration has been cancelled".to_string(),
        ));
    }

    let already_checked_in = detail.attended;
    repo.mark_attended(detail.id).await?;

    info!(
        registration_id = %detail.id,
        already_checked_in,
        "Ticket verified"
    );

    let participant_name = detail.participant_name();
    Ok(Json(VerifyQrResponse {
        ticket_code: detail.ticket_code,
        already_checked_in,
        event: EventBrief {
            id: detail.event_id,
            name: detail.event_name,
            event_type: detail.event_type.into(),
            status: detail.event_status.into(),
            start_date: detail.event_start_date,
            venue: detail.event_venue,
        },
        participant: ParticipantBrief {
            id: detail.participant_id,
            email: detail.participant_email,
            name: participant_name,
        },
    }))
}

/// POST /api/registrations/:registration_id/merchandise
///
/// Appends a merchandise order to the registration and decrements event
/// stock. Every check and write runs against one transaction in the
/// repository: a failed stock decrement rolls the whole order back, so no
/// partial order or lost stock is ever visible.
pub async fn purchase_merchandise(
    State(state): State<AppState>,
    Participant(session): Participant,
    Path(registration_id): Path<Uuid>,
    Json(request): Json<PurchaseRequest>,
) -> Result<(StatusCode, Json<PurchaseResponse>), ApiError> {
    request.validate()?;

    let registrations = RegistrationRepository::new(state.pool.clone());
    let detail = registrations
        .find_detail(registration_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Registration not found".to_string()))?;

    if detail.participant_id != session.user_id {
        return Err(ApiError::Forbidden(
            "You do not own this registration".to_string(),
        ));
    }

    let event_type: EventType = detail.event_type.into();
    if event_type != EventType::Merchandise {
        return Err(ApiError::Validation(
            "Event does not sell merchandise".to_string(),
        ));
    }

    let event_status: EventStatus = detail.event_status.into();
    if event_status != EventStatus::Ongoing {
        return Err(ApiError::Validation("Event is not ongoing".to_string()));
    }

    let events = EventRepository::new(state.pool.clone());
    let catalog: HashMap<Uuid, _> = events
        .list_items(detail.event_id)
        .await?
        .into_iter()
        .map(|item| (item.id, item))
        .collect();

    // The same item may appear on several lines (different sizes); stock and
    // cap checks apply to the summed quantity.
    let mut requested_per_item: HashMap<Uuid, i32> = HashMap::new();
    for line in &request.items {
        *requested_per_item.entry(line.item_id).or_insert(0) += line.quantity;
    }

    for (item_id, requested) in &requested_per_item {
        let item = catalog.get(item_id).ok_or_else(|| {
            ApiError::Validation("Item is not available at this event".to_string())
        })?;

        if *requested > item.max_per_participant {
            return Err(ApiError::Validation(format!(
                "At most {} of {} per participant",
                item.max_per_participant, item.name
            )));
        }

        if *requested > item.quantity {
            return Err(ApiError::Validation(format!(
                "Insufficient stock for {}",
                item.name
            )));
        }
    }

    let mut lines = Vec::with_capacity(request.items.len());
    let mut order_total = Decimal::ZERO;
    for line in &request.items {
        // Catalog membership was checked above.
        let item = &catalog[&line.item_id];
        order_total += item.price * Decimal::from(line.quantity);
        lines.push(PurchaseLine {
            item_id: line.item_id,
            quantity: line.quantity,
            selected_size: line.selected_size.clone(),
            selected_color: line.selected_color.clone(),
            unit_price: item.price,
        });
    }

    registrations
        .apply_purchase(registration_id, detail.event_id, &lines, order_total)
        .await
        .map_err(|e| match e {
            PurchaseError::InsufficientStock { item_id } => {
                let name = catalog
                    .get(&item_id)
                    .map(|i| i.name.as_str())
                    .unwrap_or("item");
                ApiError::Validation(format!("Insufficient stock for {}", name))
            }
            PurchaseError::Db(db) => db.into(),
        })?;

    let updated = registrations
        .find_by_id(registration_id)
        .await?
        .ok_or_else(|| ApiError::Internal("Registration vanished after purchase".to_string()))?;

    info!(
        registration_id = %registration_id,
        event_id = %detail.event_id,
        order_total = %order_total,
        lines = lines.len(),
        "Merchandise purchased"
    );

    // Order confirmation email after commit, best-effort.
    let email_lines: Vec<PurchaseEmailLine> = lines
        .iter()
        .map(|l| PurchaseEmailLine {
            item_name: catalog
                .get(&l.item_id)
                .map(|i| i.name.clone())
                .unwrap_or_default(),
            quantity: l.quantity,
            unit_price: l.unit_price,
        })
        .collect();
    if let Err(e) = state
        .email
        .send_purchase_confirmation(
            &detail.participant_email,
            detail.participant_first_name.as_deref(),
            &detail.event_name,
            &email_lines,
            order_total,
        )
        .await
    {
        warn!(registration_id = %registration_id, error = %e, "Purchase email failed");
    }

    let items = lines
        .into_iter()
        .map(|l| {
            let name = catalog
                .get(&l.item_id)
                .map(|i| i.name.clone())
                .unwrap_or_default();
            PurchaseLineResponse {
                item_id: l.item_id,
                item_name: name,
                quantity: l.quantity,
                selected_size: l.selected_size,
                selected_color: l.selected_color,
                unit_price: l.unit_price,
                line_total: l.unit_price * Decimal::from(l.quantity),
            }
        })
        .collect();

    Ok((
        StatusCode::CREATED,
        Json(PurchaseResponse {
            registration_id,
            items,
            order_total,
            purchase_total: updated.purchase_total,
            payment_status: updated
                .payment_status
                .map(Into::into)
                .unwrap_or(PaymentStatus::Pending),
        }),
    ))
}
