pub mod authentication;
pub mod configuration;
pub mod coupons;
pub mod domain;
pub mod routes;
pub mod startup;
pub mod subscribers;
pub mod telemetry;
pub mod utils;
