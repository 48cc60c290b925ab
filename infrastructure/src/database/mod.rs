//! SQLite adapter: scoped sessions, per-session targets and value rendering.

mod error;
mod registry;
pub mod render;
mod session;

pub use error::DatabaseError;
pub use registry::{DatabaseHandle, DatabaseRegistry, DatabaseTarget};
pub use session::{ScopedSession, runs_outside_transaction};
