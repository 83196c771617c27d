//! # Domain Layer
//!
//! Core entities, value objects, and port interfaces for the hybrid
//! retrieval-and-answer pipeline. Contains no infrastructure: no Redis
//! client, no HTTP client, nothing that talks over a socket. Only the
//! shapes of the data and the traits that infrastructure crates implement.
//!
//! ## Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`entities`] | `Job`, `Chunk`, `RetrievalResult`, `AnswerRecord` |
//! | [`value_objects`] | Search options, queue selectors, error taxonomy helpers |
//! | [`ports`] | Traits implemented by the providers crate |
//! | [`error`] | The shared domain error type |

/// Core business entities with identity and lifecycle.
pub mod entities;
/// Domain error type shared across the workspace.
pub mod error;
/// External provider port interfaces.
pub mod ports;
/// Immutable value objects used across entities and ports.
pub mod value_objects;

pub use error::{Error, Result};
