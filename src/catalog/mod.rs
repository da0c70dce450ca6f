//! Catalog Module
//!
//! The book catalog behind `/api/books`: book records carrying an ordered,
//! append-only list of free-text comments, exposed as a small JSON API.
//!
//! # Features
//!
//! - List, create, fetch, comment on and delete books
//! - Ready-to-use HTTP handlers and routes
//! - Database migrations included

mod handler;
mod lib;
mod routes;

// Re-export the core library types and functions
pub use lib::*;

// Re-export the routes function
pub use routes::routes;

/// Returns the migrations for the catalog module.
///
/// These should be run during application startup to ensure the database
/// schema is up to date.
pub fn migrations() -> &'static [(&'static str, &'static str)] {
    &[(
        "catalog_001_schema.sql",
        include_str!("migrations/001_schema.sql"),
    )]
}
