use chrono::{DateTime, Utc};

#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct Subscriber {
    pub id: i64,
    pub email: String,
    pub created_at: DateTime<Utc>,
}
