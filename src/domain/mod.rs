mod coupon;
mod subscriber;
mod subscriber_email;

pub use coupon::*;
pub use subscriber::*;
pub use subscriber_email::*;
