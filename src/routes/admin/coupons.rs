use crate::authentication::AdminIdentity;
use crate::coupons::{insert_coupon, list_all, remove, set_status};
use crate::domain::{parse_coupon_id, CouponFields, CouponStatus, NewCoupon};
use crate::routes::{ApiError, Changes, Created, Listing};
use actix_web::{web, HttpResponse};
use anyhow::Context;
use sqlx::PgPool;

#[tracing::instrument(
    name = "List every coupon",
    skip_all,
    fields(admin = %admin.username)
)]
pub async fn list_all_coupons(
    pg_pool: web::Data<PgPool>,
    admin: web::ReqData<AdminIdentity>,
) -> Result<HttpResponse, ApiError> {
    let coupons = list_all(&pg_pool)
        .await
        .context("Failed to fetch coupons")?;

    Ok(HttpResponse::Ok().json(Listing::new(coupons)))
}

#[tracing::instrument(
    name = "Add an approved coupon",
    skip_all,
    fields(
        admin = %admin.username,
        coupon_id = tracing::field::Empty
    )
)]
pub async fn add_coupon(
    web::Json(fields): web::Json<CouponFields>,
    pg_pool: web::Data<PgPool>,
    admin: web::ReqData<AdminIdentity>,
) -> Result<HttpResponse, ApiError> {
    let coupon = NewCoupon::curated(fields);
    let id = insert_coupon(&pg_pool, &coupon)
        .await
        .context("Failed to insert coupon")?;
    tracing::Span::current().record("coupon_id", &id);

    Ok(HttpResponse::Ok().json(Created::new(id)))
}

#[derive(serde::Deserialize)]
pub struct StatusUpdate {
    status: Option<String>,
}

#[tracing::instrument(
    name = "Change coupon status",
    skip(update, pg_pool, admin),
    fields(admin = %admin.username, status = ?update.status)
)]
pub async fn update_coupon_status(
    id: web::Path<String>,
    web::Json(update): web::Json<StatusUpdate>,
    pg_pool: web::Data<PgPool>,
    admin: web::ReqData<AdminIdentity>,
) -> Result<HttpResponse, ApiError> {
    // The status is checked first, a bad value is a 400 whatever the id
    let status = CouponStatus::parse(update.status.as_deref().unwrap_or_default())
        .map_err(ApiError::Validation)?;
    let Some(id) = parse_coupon_id(&id) else {
        tracing::info!("Id does not name any coupon, nothing to update");
        return Ok(HttpResponse::Ok().json(Changes::new(0)));
    };
    let changes = set_status(&pg_pool, id, status)
        .await
        .context("Failed to update coupon status")?;

    Ok(HttpResponse::Ok().json(Changes::new(changes)))
}

#[tracing::instrument(
    name = "Delete a coupon",
    skip(pg_pool, admin),
    fields(admin = %admin.username)
)]
pub async fn delete_coupon(
    id: web::Path<String>,
    pg_pool: web::Data<PgPool>,
    admin: web::ReqData<AdminIdentity>,
) -> Result<HttpResponse, ApiError> {
    let Some(id) = parse_coupon_id(&id) else {
        tracing::info!("Id does not name any coupon, nothing to delete");
        return Ok(HttpResponse::Ok().json(Changes::new(0)));
    };
    let changes = remove(&pg_pool, id)
        .await
        .context("Failed to delete coupon")?;

    Ok(HttpResponse::Ok().json(Changes::new(changes)))
}
