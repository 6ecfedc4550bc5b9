//! Event repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{
    EventEntity, EventStatusDb, EventWithCountEntity, MerchandiseItemEntity, NewEventRow,
};
use crate::metrics::QueryTimer;
use domain::models::NewMerchandiseItem;

const EVENT_COLUMNS: &str = "id, organizer_id, name, description, event_type, status, \
    start_date, end_date, registration_deadline, venue, registration_limit, registration_fee, \
    team_event, max_team_size, created_at, updated_at";

/// Filters for the public event listing.
#[derive(Debug, Clone, Default)]
pub struct BrowseFilter {
    pub event_type: Option<crate::entities::EventTypeDb>,
    pub search: Option<String>,
}

/// Repository for event-related database operations.
#[derive(Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    /// Creates a new EventRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an event in draft status, inserting its merchandise items in
    /// the same transaction.
    pub async fn create_with_items(
        &self,
        organizer_id: Uuid,
        row: &NewEventRow,
        items: &[NewMerchandiseItem],
    ) -> Result<EventEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_event");
        let mut tx = self.pool.begin().await?;

        let event = sqlx::query_as::<_, EventEntity>(&format!(
            r#"
            INSERT INTO events (
                id, organizer_id, name, description, event_type, status,
                start_date, end_date, registration_deadline, venue,
                registration_limit, registration_fee, team_event, max_team_size
            )
            VALUES ($1, $2, $3, $4, $5, 'draft', $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {EVENT_COLUMNS}
            "#,
        ))
        .bind(Uuid::new_v4())
        .bind(organizer_id)
        .bind(&row.name)
        .bind(&row.description)
        .bind(row.event_type)
        .bind(row.start_date)
        .bind(row.end_date)
        .bind(row.registration_deadline)
        .bind(&row.venue)
        .bind(row.registration_limit)
        .bind(row.registration_fee)
        .bind(row.team_event)
        .bind(row.max_team_size)
        .fetch_one(&mut *tx)
        .await?;

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO merchandise_items (
                    id, event_id, name, description, price, quantity,
                    max_per_participant, sizes, colors
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(event.id)
            .bind(&item.name)
            .bind(&item.description)
            .bind(item.price)
            .bind(item.quantity)
            .bind(item.max_per_participant)
            .bind(&item.sizes)
            .bind(&item.colors)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        timer.record();
        Ok(event)
    }

    /// Find an event by id.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<EventEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_event_by_id");
        let result = sqlx::query_as::<_, EventEntity>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List browsable events (published or ongoing), newest start first.
    pub async fn list_browsable(
        &self,
        filter: &BrowseFilter,
    ) -> Result<Vec<EventWithCountEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_browsable_events");
        let result = sqlx::query_as::<_, EventWithCountEntity>(
            r#"
            SELECT
                e.id, e.organizer_id, e.name, e.description, e.event_type, e.status,
                e.start_date, e.end_date, e.registration_deadline, e.venue,
                e.registration_limit, e.registration_fee, e.team_event, e.max_team_size,
                u.organization_name AS organizer_name,
                (SELECT COUNT(*) FROM registrations r
                 WHERE r.event_id = e.id AND r.status <> 'cancelled') AS registration_count
            FROM events e
            JOIN users u ON e.organizer_id = u.id
            WHERE e.status IN ('published', 'ongoing')
              AND ($1::event_type IS NULL OR e.event_type = $1)
              AND ($2::text IS NULL OR e.name ILIKE '%' || $2 || '%')
            ORDER BY e.start_date ASC
            "#,
        )
        .bind(filter.event_type)
        .bind(&filter.search)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List an organizer's events with registration counts.
    pub async fn list_by_organizer(
        &self,
        organizer_id: Uuid,
    ) -> Result<Vec<EventWithCountEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_events_by_organizer");
        let result = sqlx::query_as::<_, EventWithCountEntity>(
            r#"
            SELECT
                e.id, e.organizer_id, e.name, e.description, e.event_type, e.status,
                e.start_date, e.end_date, e.registration_deadline, e.venue,
                e.registration_limit, e.registration_fee, e.team_event, e.max_team_size,
                u.organization_name AS organizer_name,
                (SELECT COUNT(*) FROM registrations r
                 WHERE r.event_id = e.id AND r.status <> 'cancelled') AS registration_count
            FROM events e
            JOIN users u ON e.organizer_id = u.id
            WHERE e.organizer_id = $1
            ORDER BY e.created_at DESC
            "#,
        )
        .bind(organizer_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Update editable fields while the event is still a draft.
    ///
    /// Returns None when the event does not exist or is past draft.
    #[allow(clippy::too_many_arguments)]
    pub async fn update_draft(
        &self,
        id: Uuid,
        organizer_id: Uuid,
        row: &NewEventRow,
    ) -> Result<Option<EventEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_draft_event");
        let result = sqlx::query_as::<_, EventEntity>(&format!(
            r#"
            UPDATE events
            SET name = $3, description = $4, start_date = $5, end_date = $6,
                registration_deadline = $7, venue = $8, registration_limit = $9,
                registration_fee = $10, team_event = $11, max_team_size = $12,
                updated_at = NOW()
            WHERE id = $1 AND organizer_id = $2 AND status = 'draft'
            RETURNING {EVENT_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(organizer_id)
        .bind(&row.name)
        .bind(&row.description)
        .bind(row.start_date)
        .bind(row.end_date)
        .bind(row.registration_deadline)
        .bind(&row.venue)
        .bind(row.registration_limit)
        .bind(row.registration_fee)
        .bind(row.team_event)
        .bind(row.max_team_size)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Advance an event's status. The `WHERE status = $3` guard makes the
    /// transition a compare-and-set so concurrent updates cannot skip steps.
    pub async fn set_status(
        &self,
        id: Uuid,
        from: EventStatusDb,
        to: EventStatusDb,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("set_event_status");
        let result = sqlx::query(
            "UPDATE events SET status = $2, updated_at = NOW() WHERE id = $1 AND status = $3",
        )
        .bind(id)
        .bind(to)
        .bind(from)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// List merchandise items for an event.
    pub async fn list_items(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<MerchandiseItemEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_event_items");
        let result = sqlx::query_as::<_, MerchandiseItemEntity>(
            r#"
            SELECT id, event_id, name, description, price, quantity,
                   max_per_participant, sizes, colors, created_at
            FROM merchandise_items
            WHERE event_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Count all events.
    pub async fn count_all(&self) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_events");
        let result = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await;
        timer.record();
        result
    }
}
