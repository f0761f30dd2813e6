use aerobook_core::repository::{EmailLogRepository, RepositoryError};
use aerobook_core::EmailLog;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::database::map_sqlx_error;

pub struct PostgresEmailLogRepository {
    pool: PgPool,
}

impl PostgresEmailLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct EmailLogRow {
    id: i64,
    pnr: String,
    recipient: String,
    subject: String,
    body: String,
    environment: String,
    sent_at: DateTime<Utc>,
}

impl From<EmailLogRow> for EmailLog {
    fn from(row: EmailLogRow) -> Self {
        EmailLog {
            id: row.id,
            pnr: row.pnr,
            recipient: row.recipient,
            subject: row.subject,
            body: row.body,
            environment: row.environment,
            sent_at: row.sent_at,
        }
    }
}

#[async_trait]
impl EmailLogRepository for PostgresEmailLogRepository {
    async fn append(&self, entry: &EmailLog) -> Result<i64, RepositoryError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO email_logs (pnr, recipient, subject, body, environment, sent_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&entry.pnr)
        .bind(&entry.recipient)
        .bind(&entry.subject)
        .bind(&entry.body)
        .bind(&entry.environment)
        .bind(entry.sent_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, &entry.pnr))?;

        Ok(id)
    }

    async fn list_for_reference(&self, pnr: &str) -> Result<Vec<EmailLog>, RepositoryError> {
        let rows: Vec<EmailLogRow> = sqlx::query_as(
            "SELECT id, pnr, recipient, subject, body, environment, sent_at FROM email_logs WHERE pnr = $1 ORDER BY id",
        )
        .bind(pnr)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, pnr))?;

        Ok(rows.into_iter().map(EmailLog::from).collect())
    }
}
