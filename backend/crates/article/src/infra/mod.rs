//! Infrastructure Layer
//!
//! Database implementations and the content-generation HTTP client.

pub mod ai;
pub mod postgres;

#[cfg(test)]
pub mod memory;

pub use ai::{AiBackend, HttpAiClient};
pub use postgres::PgArticleRepository;
