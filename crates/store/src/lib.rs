//! Transactional document store for the marketplace order core.
//!
//! The order coordinator never touches persistence directly: every read and
//! write goes through a [`StoreSession`], the unit-of-work context obtained
//! from [`DocumentStore::begin`]. A session is a required parameter of every
//! repository call, so running an adjustment outside the transaction scope
//! is a compile error rather than a latent bug.

pub mod error;
pub mod memory;
pub mod postgres;
mod store;

pub use error::{Result, StoreError};
pub use memory::{InMemorySession, InMemoryStore};
pub use postgres::{PostgresSession, PostgresStore};
pub use store::{DocumentStore, StoreSession};
