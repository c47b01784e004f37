//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repository implementations only translate between Diesel rows and domain
//! types. Row structs (`models.rs`) and table definitions (`schema.rs`) stay
//! private to this module; all errors surface through the port error enums.
//!
//! ```ignore
//! use nightlist::outbound::persistence::{DbPool, DieselIdentityRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/nightlist")).await?;
//! let identities = DieselIdentityRepository::new(pool);
//! ```

mod diesel_conversation_repository;
mod diesel_error_mapping;
mod diesel_event_repository;
mod diesel_feedback_repository;
mod diesel_identity_repository;
mod diesel_reset_code_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_conversation_repository::DieselConversationRepository;
pub use diesel_event_repository::DieselEventRepository;
pub use diesel_feedback_repository::DieselFeedbackRepository;
pub use diesel_identity_repository::DieselIdentityRepository;
pub use diesel_reset_code_repository::DieselResetCodeRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
