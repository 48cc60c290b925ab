//! Database tool implementations
//!
//! [`SqlToolExecutor`] runs the four database tools against the SQLite file
//! selected for a session. [`JsonSchemaToolConverter`] renders the tool
//! contracts in the function-calling format the model gateway sends.

mod executor;
mod schema;

pub use executor::SqlToolExecutor;
pub use schema::JsonSchemaToolConverter;
