use crate::domain::SubscriberEmail;
use crate::routes::{ApiError, Created};
use crate::subscribers::{insert_subscriber, SubscribeError};
use actix_web::{web, HttpResponse};
use sqlx::PgPool;

#[derive(serde::Deserialize)]
pub struct SubscribeForm {
    email: Option<String>,
}

impl From<SubscribeError> for ApiError {
    fn from(error: SubscribeError) -> Self {
        match error {
            SubscribeError::AlreadySubscribed => ApiError::Conflict(error.to_string()),
            SubscribeError::UnexpectedError(e) => ApiError::Storage(e),
        }
    }
}

#[tracing::instrument(
    name = "Add a new subscriber",
    skip(form, pg_pool),
    fields(
        email = ?form.email,
        subscriber_id = tracing::field::Empty
    )
)]
pub async fn subscribe(
    web::Json(form): web::Json<SubscribeForm>,
    pg_pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let email = SubscriberEmail::parse(form.email).map_err(ApiError::Validation)?;
    let id = insert_subscriber(&pg_pool, &email).await?;
    tracing::Span::current().record("subscriber_id", &id);

    Ok(HttpResponse::Ok().json(Created::new(id)))
}
