mod middleware;
mod password;
mod session;

pub use middleware::*;
pub use password::*;
pub use session::*;
