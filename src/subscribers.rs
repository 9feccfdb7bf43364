use crate::domain::{Subscriber, SubscriberEmail};
use crate::utils::error_chain_fmt;
use sqlx::PgPool;
use std::fmt::Debug;

const UNIQUE_VIOLATION: &str = "23505";

#[derive(thiserror::Error)]
pub enum SubscribeError {
    #[error("Email already subscribed")]
    AlreadySubscribed,
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl Debug for SubscribeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

#[tracing::instrument(
    name = "Insert a new subscriber into database",
    skip(pg_pool, email),
    fields(email = %email)
)]
pub async fn insert_subscriber(
    pg_pool: &PgPool,
    email: &SubscriberEmail,
) -> Result<i64, SubscribeError> {
    let inserted = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO subscribers (email)
        VALUES ($1)
        RETURNING id
        "#,
    )
    .bind(email.as_ref())
    .fetch_one(pg_pool)
    .await;

    match inserted {
        Ok(id) => Ok(id),
        Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            Err(SubscribeError::AlreadySubscribed)
        }
        Err(e) => Err(anyhow::Error::new(e)
            .context("Failed to insert new subscriber")
            .into()),
    }
}

#[tracing::instrument(name = "Get subscribers from database", skip_all)]
pub async fn list_subscribers(pg_pool: &PgPool) -> Result<Vec<Subscriber>, sqlx::Error> {
    sqlx::query_as::<_, Subscriber>(
        r#"
        SELECT id, email, created_at
        FROM subscribers
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .fetch_all(pg_pool)
    .await
}
