//! Molt Domain Layer
//!
//! This crate contains the core domain model for Molt, the post retirement engine.
//! It has ZERO external dependencies and defines the records, lifecycle states,
//! remote outcome vocabulary and trait interfaces that all other layers depend upon.
//!
//! ## Key Concepts
//!
//! - **Post record**: One tracked remote post (`PostId` + creation time) and its lifecycle state
//! - **Lifecycle state**: `ToDelete` → `Deleted` | `CannotDelete`, with `ToKeep` reserved for curation
//! - **Eligibility**: `ToDelete` records older than the retention window
//! - **Remote outcome**: The closed vocabulary a delete attempt resolves to
//! - **Classifier**: Pure mapping from a remote outcome to a lifecycle transition
//!
//! ## Architecture
//!
//! - No external crate dependencies
//! - Pure business logic only
//! - Storage and HTTP implementations live in other crates
//! - Trait definitions for all external interactions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod outcome;
pub mod post;
pub mod state;
pub mod traits;

// Re-exports for convenience
pub use outcome::{classify, RemoteOutcome};
pub use post::{eligibility_cutoff, PostId, PostRecord};
pub use state::{PostState, StateCounts};
