//! Session persistence backed by one JSON file per session.

mod json_store;

pub use json_store::JsonSessionStore;
