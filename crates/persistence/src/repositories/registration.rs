//! Registration repository for database operations.
//!
//! The merchandise purchase runs as a single transaction with conditional
//! stock decrements, so two concurrent purchases of the last unit cannot
//! both succeed and no partial order is ever persisted.

use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::entities::{
    PurchaseItemWithNameEntity, PurchaseLine, RegistrationDetailEntity, RegistrationEntity,
};
use crate::metrics::QueryTimer;

const REGISTRATION_COLUMNS: &str = "id, event_id, participant_id, ticket_code, status, \
    registered_at, qr_code, attended, attended_at, purchase_total, payment_status";

const DETAIL_QUERY: &str = r#"
    SELECT
        r.id, r.event_id, r.participant_id, r.ticket_code, r.status,
        r.registered_at, r.qr_code, r.attended, r.attended_at,
        r.purchase_total, r.payment_status,
        e.name AS event_name, e.event_type, e.status AS event_status,
        e.start_date AS event_start_date, e.venue AS event_venue,
        e.organizer_id AS event_organizer_id,
        u.email AS participant_email,
        u.first_name AS participant_first_name,
        u.last_name AS participant_last_name
    FROM registrations r
    JOIN events e ON r.event_id = e.id
    JOIN users u ON r.participant_id = u.id
"#;

/// Error type for the purchase transaction.
#[derive(Debug, Error)]
pub enum PurchaseError {
    /// The conditional decrement matched no row: the item no longer has
    /// enough stock. The whole transaction is rolled back.
    #[error("Insufficient stock for item {item_id}")]
    InsufficientStock { item_id: Uuid },

    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Repository for registration-related database operations.
#[derive(Clone)]
pub struct RegistrationRepository {
    pool: PgPool,
}

impl RegistrationRepository {
    /// Creates a new RegistrationRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a registration, enforcing the event's registration limit in
    /// the same statement as the insert.
    ///
    /// Returns None when the event is already full. A duplicate
    /// registration surfaces as a unique-violation database error.
    pub async fn create(
        &self,
        event_id: Uuid,
        participant_id: Uuid,
        ticket_code: &str,
        registration_limit: Option<i32>,
    ) -> Result<Option<RegistrationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("create_registration");
        let result = sqlx::query_as::<_, RegistrationEntity>(&format!(
            r#"
            INSERT INTO registrations (id, event_id, participant_id, ticket_code, status)
            SELECT $1, $2, $3, $4, 'confirmed'
            WHERE $5::INT IS NULL
               OR (SELECT COUNT(*) FROM registrations
                   WHERE event_id = $2 AND status <> 'cancelled') < $5
            RETURNING {REGISTRATION_COLUMNS}
            "#,
        ))
        .bind(Uuid::new_v4())
        .bind(event_id)
        .bind(participant_id)
        .bind(ticket_code)
        .bind(registration_limit)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a registration by id.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<RegistrationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_registration_by_id");
        let result = sqlx::query_as::<_, RegistrationEntity>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a registration with event and participant info.
    pub async fn find_detail(
        &self,
        id: Uuid,
    ) -> Result<Option<RegistrationDetailEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_registration_detail");
        let result = sqlx::query_as::<_, RegistrationDetailEntity>(&format!(
            "{DETAIL_QUERY} WHERE r.id = $1",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a participant's registration for an event, if any.
    pub async fn find_for_event_and_participant(
        &self,
        event_id: Uuid,
        participant_id: Uuid,
    ) -> Result<Option<RegistrationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_registration_for_event_and_participant");
        let result = sqlx::query_as::<_, RegistrationEntity>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations \
             WHERE event_id = $1 AND participant_id = $2",
        ))
        .bind(event_id)
        .bind(participant_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a registration by ticket code, for attendance scanning.
    pub async fn find_by_ticket_code(
        &self,
        ticket_code: &str,
    ) -> Result<Option<RegistrationDetailEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_registration_by_ticket_code");
        let result = sqlx::query_as::<_, RegistrationDetailEntity>(&format!(
            "{DETAIL_QUERY} WHERE r.ticket_code = $1",
        ))
        .bind(ticket_code)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List an event's registrations, oldest first (export order).
    pub async fn list_for_event(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<RegistrationDetailEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_registrations_for_event");
        let result = sqlx::query_as::<_, RegistrationDetailEntity>(&format!(
            "{DETAIL_QUERY} WHERE r.event_id = $1 ORDER BY r.registered_at ASC",
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List a participant's registrations, newest first.
    pub async fn list_for_participant(
        &self,
        participant_id: Uuid,
    ) -> Result<Vec<RegistrationDetailEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_registrations_for_participant");
        let result = sqlx::query_as::<_, RegistrationDetailEntity>(&format!(
            "{DETAIL_QUERY} WHERE r.participant_id = $1 ORDER BY r.registered_at DESC",
        ))
        .bind(participant_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Store a ticket's QR data URI if none exists yet.
    ///
    /// COALESCE keeps the first stored value, so the returned row always
    /// carries the same QR code no matter how many callers race here.
    pub async fn store_qr_code(
        &self,
        id: Uuid,
        qr_code: &str,
    ) -> Result<RegistrationEntity, sqlx::Error> {
        let timer = QueryTimer::new("store_registration_qr_code");
        let result = sqlx::query_as::<_, RegistrationEntity>(&format!(
            r#"
            UPDATE registrations
            SET qr_code = COALESCE(qr_code, $2)
            WHERE id = $1
            RETURNING {REGISTRATION_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(qr_code)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Mark a registration attended. Keeps the first scan timestamp.
    pub async fn mark_attended(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("mark_registration_attended");
        let result = sqlx::query(
            r#"
            UPDATE registrations
            SET attended = TRUE, attended_at = COALESCE(attended_at, NOW())
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Count an event's non-cancelled registrations.
    pub async fn count_for_event(&self, event_id: Uuid) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_registrations_for_event");
        let result = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM registrations WHERE event_id = $1 AND status <> 'cancelled'",
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Count all registrations.
    pub async fn count_all(&self) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_registrations");
        let result = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM registrations")
            .fetch_one(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Apply a validated merchandise purchase in one transaction.
    ///
    /// For each line the stock decrement is conditional on sufficient
    /// quantity; a miss rolls back everything already applied, including
    /// lines that had stock. On success the purchase lines are appended and
    /// the registration's running total updated, all atomically.
    pub async fn apply_purchase(
        &self,
        registration_id: Uuid,
        event_id: Uuid,
        lines: &[PurchaseLine],
        total: Decimal,
    ) -> Result<(), PurchaseError> {
        let timer = QueryTimer::new("apply_purchase");
        let mut tx = self.pool.begin().await.map_err(PurchaseError::Db)?;

        for line in lines {
            let updated = sqlx::query(
                r#"
                UPDATE merchandise_items
                SET quantity = quantity - $1
                WHERE id = $2 AND event_id = $3 AND quantity >= $1
                "#,
            )
            .bind(line.quantity)
            .bind(line.item_id)
            .bind(event_id)
            .execute(&mut *tx)
            .await
            .map_err(PurchaseError::Db)?;

            if updated.rows_affected() == 0 {
                // Dropping tx rolls back earlier decrements.
                return Err(PurchaseError::InsufficientStock {
                    item_id: line.item_id,
                });
            }
        }

        for line in lines {
            sqlx::query(
                r#"
                INSERT INTO purchase_items
                    (registration_id, item_id, quantity, selected_size, selected_color, unit_price)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(registration_id)
            .bind(line.item_id)
            .bind(line.quantity)
            .bind(&line.selected_size)
            .bind(&line.selected_color)
            .bind(line.unit_price)
            .execute(&mut *tx)
            .await
            .map_err(PurchaseError::Db)?;
        }

        sqlx::query(
            r#"
            UPDATE registrations
            SET purchase_total = purchase_total + $2,
                payment_status = COALESCE(payment_status, 'pending')
            WHERE id = $1
            "#,
        )
        .bind(registration_id)
        .bind(total)
        .execute(&mut *tx)
        .await
        .map_err(PurchaseError::Db)?;

        tx.commit().await.map_err(PurchaseError::Db)?;
        timer.record();
        Ok(())
    }

    /// List a registration's purchase lines with item names, oldest first.
    pub async fn list_purchase_items(
        &self,
        registration_id: Uuid,
    ) -> Result<Vec<PurchaseItemWithNameEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_purchase_items");
        let result = sqlx::query_as::<_, PurchaseItemWithNameEntity>(
            r#"
            SELECT
                p.id, p.registration_id, p.item_id, m.name AS item_name,
                p.quantity, p.selected_size, p.selected_color, p.unit_price, p.purchased_at
            FROM purchase_items p
            JOIN merchandise_items m ON p.item_id = m.id
            WHERE p.registration_id = $1
            ORDER BY p.id ASC
            "#,
        )
        .bind(registration_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
