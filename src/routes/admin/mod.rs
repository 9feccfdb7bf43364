mod coupons;
mod subscribers;

pub use coupons::*;
pub use subscribers::*;
