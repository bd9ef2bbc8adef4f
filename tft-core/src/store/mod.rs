//! SQLite storage shared by the loader and the read API.
//!
//! - [`schema`] materialises the tables, keys, and indexes, and records the
//!   schema version.
//! - [`sqlite`] implements [`Catalog`](crate::Catalog) over those tables.

mod schema;
mod sqlite;

pub use schema::{
    SCHEMA_VERSION, SchemaError, TABLES_IN_DELETE_ORDER, initialise_schema, stored_version,
};
pub use sqlite::SqliteCatalog;

#[cfg(test)]
mod tests;
