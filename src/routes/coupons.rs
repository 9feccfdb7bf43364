use crate::coupons::{insert_coupon, list_approved};
use crate::domain::{CategoryFilter, CouponFields, NewCoupon};
use crate::routes::{ApiError, Created, Listing};
use actix_web::{web, HttpResponse};
use anyhow::Context;
use sqlx::PgPool;

#[derive(serde::Deserialize)]
pub struct CatalogQuery {
    category: Option<String>,
}

#[tracing::instrument(
    name = "List approved coupons",
    skip(query, pg_pool),
    fields(category = ?query.category)
)]
pub async fn list_coupons(
    web::Query(query): web::Query<CatalogQuery>,
    pg_pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let category = CategoryFilter::parse(query.category);
    let coupons = list_approved(&pg_pool, &category)
        .await
        .context("Failed to fetch approved coupons")?;

    Ok(HttpResponse::Ok().json(Listing::new(coupons)))
}

#[tracing::instrument(
    name = "Submit a coupon for review",
    skip(submission, pg_pool),
    fields(
        store_name = ?submission.store_name,
        coupon_id = tracing::field::Empty
    )
)]
pub async fn submit_coupon(
    web::Json(submission): web::Json<CouponFields>,
    pg_pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let coupon = NewCoupon::submission(submission).map_err(ApiError::Validation)?;
    let id = insert_coupon(&pg_pool, &coupon)
        .await
        .context("Failed to insert submitted coupon")?;
    tracing::Span::current().record("coupon_id", &id);

    Ok(HttpResponse::Ok().json(Created::new(id).with_info("Coupon submitted for approval")))
}
