mod admin;
mod coupons;
mod errors;
mod health_check;
mod helpers;
mod login;
mod logout;
mod me;
mod subscriptions;

pub use admin::*;
pub use coupons::*;
pub use errors::*;
pub use health_check::*;
pub use helpers::*;
pub use login::*;
pub use logout::*;
pub use me::*;
pub use subscriptions::*;
