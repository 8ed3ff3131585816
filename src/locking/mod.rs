//! Conflict-detection predicates for optimistic locking.
//!
//! A [`LockingPolicy`] turns a record's edit session into an [`UpdatePlan`]:
//! the columns to `SET` and the equality conditions the `WHERE` clause must
//! satisfy for the update to apply.

pub mod config;
pub mod plan;
pub mod policy;
pub mod strategy;

pub use config::{DEFAULT_VERSION_COLUMN, LockingConfig};
pub use plan::UpdatePlan;
pub use policy::LockingPolicy;
pub use strategy::{LockingStrategy, validate_strategy};
