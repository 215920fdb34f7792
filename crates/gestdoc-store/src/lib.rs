//! Storage layer: read contracts over the case/document tables, the chat
//! history store, and their DuckDB implementation.

mod conversations;
mod error;
mod schema;
mod source;

pub use conversations::ConversationStore;
pub use error::StoreError;
pub use schema::{CHAT_DDL, DOMAIN_DDL, REQUIRED_TABLES};
pub use source::{CaseHit, DocumentHit, DomainSource};

#[cfg(feature = "duckdb")]
mod duck;
#[cfg(feature = "duckdb")]
pub use duck::DuckStore;

#[cfg(feature = "duckdb")]
mod seed;
#[cfg(feature = "duckdb")]
pub use seed::{SeedSummary, seed_demo};
