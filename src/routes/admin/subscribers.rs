use crate::authentication::AdminIdentity;
use crate::routes::{ApiError, Listing};
use crate::subscribers::list_subscribers;
use actix_web::{web, HttpResponse};
use anyhow::Context;
use sqlx::PgPool;

#[tracing::instrument(
    name = "List subscribers",
    skip_all,
    fields(admin = %admin.username)
)]
pub async fn list_all_subscribers(
    pg_pool: web::Data<PgPool>,
    admin: web::ReqData<AdminIdentity>,
) -> Result<HttpResponse, ApiError> {
    let subscribers = list_subscribers(&pg_pool)
        .await
        .context("Failed to fetch subscribers")?;

    Ok(HttpResponse::Ok().json(Listing::new(subscribers)))
}
