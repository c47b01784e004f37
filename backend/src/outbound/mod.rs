//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL repositories on Diesel
//! - **memory**: in-process repositories used without a database
//! - **security**: Argon2 password hashing and HS256 tokens
//! - **mail**: reset-code delivery
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod mail;
pub mod memory;
pub mod persistence;
pub mod security;
