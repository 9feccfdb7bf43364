use crate::domain::{CategoryFilter, Coupon, CouponStatus, NewCoupon};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

#[derive(sqlx::FromRow)]
struct CouponRow {
    id: i64,
    store_name: String,
    description: String,
    code: String,
    category: String,
    discount_amount: String,
    expiry_date: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<CouponRow> for Coupon {
    type Error = anyhow::Error;

    fn try_from(row: CouponRow) -> Result<Self, Self::Error> {
        let status = CouponStatus::parse(&row.status)
            .map_err(|e| anyhow::anyhow!("{} `{}` for coupon {}", e, row.status, row.id))?;
        Ok(Self {
            id: row.id,
            store_name: row.store_name,
            description: row.description,
            code: row.code,
            category: row.category,
            discount_amount: row.discount_amount,
            expiry_date: row.expiry_date,
            status,
            created_at: row.created_at,
        })
    }
}

fn into_coupons(rows: Vec<CouponRow>) -> Result<Vec<Coupon>, anyhow::Error> {
    rows.into_iter().map(Coupon::try_from).collect()
}

#[tracing::instrument(name = "Get approved coupons from database", skip(pg_pool))]
pub async fn list_approved(
    pg_pool: &PgPool,
    category: &CategoryFilter,
) -> Result<Vec<Coupon>, anyhow::Error> {
    let rows = sqlx::query_as::<_, CouponRow>(
        r#"
        SELECT id, store_name, description, code, category,
               discount_amount, expiry_date, status, created_at
        FROM coupons
        WHERE status = $1 AND ($2::TEXT IS NULL OR category = $2)
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(CouponStatus::Approved.as_ref())
    .bind(category.as_deref())
    .fetch_all(pg_pool)
    .await?;

    into_coupons(rows)
}

#[tracing::instrument(name = "Get all coupons from database", skip_all)]
pub async fn list_all(pg_pool: &PgPool) -> Result<Vec<Coupon>, anyhow::Error> {
    let rows = sqlx::query_as::<_, CouponRow>(
        r#"
        SELECT id, store_name, description, code, category,
               discount_amount, expiry_date, status, created_at
        FROM coupons
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .fetch_all(pg_pool)
    .await?;

    into_coupons(rows)
}

#[tracing::instrument(
    name = "Insert a new coupon into database",
    skip(pg_pool, coupon),
    fields(
        store_name = %coupon.store_name,
        status = %coupon.status,
    )
)]
pub async fn insert_coupon(pg_pool: &PgPool, coupon: &NewCoupon) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO coupons (store_name, description, code, category, discount_amount, expiry_date, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id
        "#,
    )
    .bind(&coupon.store_name)
    .bind(&coupon.description)
    .bind(&coupon.code)
    .bind(&coupon.category)
    .bind(&coupon.discount_amount)
    .bind(&coupon.expiry_date)
    .bind(coupon.status.as_ref())
    .fetch_one(pg_pool)
    .await
}

/// Any status may move to any other, itself included. A missing id is not an
/// error: the caller sees zero affected rows.
#[tracing::instrument(name = "Update coupon status", skip(pg_pool))]
pub async fn set_status(
    pg_pool: &PgPool,
    id: i64,
    status: CouponStatus,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE coupons
        SET status = $1
        WHERE id = $2
        "#,
    )
    .bind(status.as_ref())
    .bind(id)
    .execute(pg_pool)
    .await?;

    Ok(result.rows_affected())
}

#[tracing::instrument(name = "Delete coupon", skip(pg_pool))]
pub async fn remove(pg_pool: &PgPool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        DELETE FROM coupons
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(pg_pool)
    .await?;

    Ok(result.rows_affected())
}

const STARTER_CATALOG: [(&str, &str, &str, &str, &str); 5] = [
    ("Amazon", "Save 50% on all Echo devices", "SUMMER50", "tech", "50% OFF"),
    ("Nike", "20% off your first order", "NIKE20NEW", "fashion", "20% OFF"),
    ("Spotify", "3 Months Free Premium", "SPOTIFY3FREE", "tech", "3 Months Free"),
    ("Uber Eats", "Free delivery on orders over $20", "EATS20", "food", "Free Delivery"),
    ("ASOS", "15% Student Discount", "STUDENT15", "fashion", "15% OFF"),
];

/// Fills an empty catalog with a handful of approved coupons so a fresh
/// deployment has something to show. Returns how many were inserted.
#[tracing::instrument(name = "Seed coupon catalog", skip_all)]
pub async fn seed_catalog_if_empty(pg_pool: &PgPool) -> Result<usize, sqlx::Error> {
    let count = sqlx::query_scalar::<_, i64>("SELECT count(*) FROM coupons")
        .fetch_one(pg_pool)
        .await?;
    if count > 0 {
        return Ok(0);
    }

    tracing::info!("Seeding initial coupons");
    for (store_name, description, code, category, discount_amount) in STARTER_CATALOG {
        let coupon = NewCoupon {
            store_name: store_name.into(),
            description: description.into(),
            code: code.into(),
            category: category.into(),
            discount_amount: discount_amount.into(),
            expiry_date: Some("2025-12-31".into()),
            status: CouponStatus::Approved,
        };
        insert_coupon(pg_pool, &coupon).await?;
    }
    Ok(STARTER_CATALOG.len())
}
