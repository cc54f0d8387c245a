//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Password hashing (Argon2id) and strength policy
//! - Signed access / refresh tokens (HS256)
//! - Cryptographic utilities (SHA-256, opaque random tokens)
//! - Client metadata extraction
//! - Rate limiting infrastructure

pub mod client;
pub mod crypto;
pub mod password;
pub mod rate_limit;
pub mod token;
