pub mod access;
pub mod cache;
pub mod dispatch;
pub mod idempotency;
pub mod points;
pub mod results;
pub mod standings;
