//! Writing load plans into the shared SQLite schema.
#![forbid(unsafe_code)]

mod persistence;

pub use persistence::{LoadReport, PersistError, persist_plan};
