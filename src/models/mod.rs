pub mod reading;
pub mod user;

pub use reading::{LineError, Reading, TIMESTAMP_FORMAT};
pub use user::UserId;
