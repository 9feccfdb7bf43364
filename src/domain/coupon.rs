use chrono::{DateTime, Utc};
use std::str::FromStr;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    serde::Serialize,
    serde::Deserialize,
    strum::AsRefStr,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CouponStatus {
    Pending,
    Approved,
    Rejected,
}

impl CouponStatus {
    pub fn parse(status: &str) -> Result<Self, String> {
        Self::from_str(status).map_err(|_| "Invalid status".to_string())
    }
}

/// Fields accepted when a coupon is created, before any validation.
#[derive(Debug, Default, serde::Deserialize)]
pub struct CouponFields {
    #[serde(default)]
    pub store_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub discount_amount: Option<String>,
    #[serde(default)]
    pub expiry_date: Option<String>,
}

#[derive(Debug)]
pub struct NewCoupon {
    pub store_name: String,
    pub description: String,
    pub code: String,
    pub category: String,
    pub discount_amount: String,
    pub expiry_date: Option<String>,
    pub status: CouponStatus,
}

impl NewCoupon {
    /// Public submissions must name the store, describe the deal and carry a code.
    /// Everything else is taken as-is and the coupon waits for moderation.
    pub fn submission(fields: CouponFields) -> Result<Self, String> {
        let store_name = required(fields.store_name)?;
        let description = required(fields.description)?;
        let code = required(fields.code)?;

        Ok(Self {
            store_name,
            description,
            code,
            category: fields.category.unwrap_or_default(),
            discount_amount: fields.discount_amount.unwrap_or_default(),
            expiry_date: fields.expiry_date,
            status: CouponStatus::Pending,
        })
    }

    /// Admin inserts skip field checks and go straight into the catalog.
    pub fn curated(fields: CouponFields) -> Self {
        Self {
            store_name: fields.store_name.unwrap_or_default(),
            description: fields.description.unwrap_or_default(),
            code: fields.code.unwrap_or_default(),
            category: fields.category.unwrap_or_default(),
            discount_amount: fields.discount_amount.unwrap_or_default(),
            expiry_date: fields.expiry_date,
            status: CouponStatus::Approved,
        }
    }
}

fn required(value: Option<String>) -> Result<String, String> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err("Missing required fields".into()),
    }
}

/// Category requested by a catalog reader. The storefront's `all` tab, an
/// empty value and no value at all mean the unfiltered catalog.
#[derive(Debug, PartialEq, Eq)]
pub struct CategoryFilter(Option<String>);

impl CategoryFilter {
    pub fn parse(category: Option<String>) -> Self {
        match category {
            Some(category) if !category.is_empty() && category != "all" => Self(Some(category)),
            _ => Self(None),
        }
    }

    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

/// Coupon id as it arrives in a URL segment.
///
/// Anything that is not an `i64` cannot name a stored coupon, so it parses to
/// `None` and by-id mutations report zero changes instead of failing.
pub fn parse_coupon_id(raw: &str) -> Option<i64> {
    raw.parse().ok()
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct Coupon {
    pub id: i64,
    pub store_name: String,
    pub description: String,
    pub code: String,
    pub category: String,
    pub discount_amount: String,
    pub expiry_date: Option<String>,
    pub status: CouponStatus,
    pub created_at: DateTime<Utc>,
}
