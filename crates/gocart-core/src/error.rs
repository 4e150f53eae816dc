//! # Error Types
//!
//! Payload error types for gocart-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  gocart-core errors (this file)                                         │
//! │  └── PayloadError   - Snapshot payload rejected by the decoder          │
//! │                                                                         │
//! │  gocart-persist errors (separate crate)                                 │
//! │  └── StorageError   - Backend load/save failures                        │
//! │                                                                         │
//! │  Flow on load: StorageError or PayloadError → logged → empty cart       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (the offending item id)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Payload Error
// =============================================================================

/// A persisted snapshot payload that cannot become a cart.
///
/// The store treats every variant the same way on load: log it and start
/// from an empty cart. The variants exist so the log says *what* was wrong.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// The payload is not valid JSON, or not an array of item objects.
    ///
    /// ## When This Occurs
    /// - The stored value was written by something other than this crate
    /// - The stored value was truncated or corrupted at rest
    #[error("Payload is not a valid item array: {0}")]
    Json(#[from] serde_json::Error),

    /// Two lines in the payload share a product id.
    ///
    /// A live cart can never produce this; it means the snapshot was
    /// hand-edited or produced by a buggy writer.
    #[error("Duplicate item id '{id}' in payload")]
    DuplicateId { id: String },

    /// A line in the payload holds zero units.
    ///
    /// A live cart removes a line instead of letting it reach zero, so a
    /// zero-quantity line marks the snapshot as foreign.
    #[error("Item '{id}' has zero quantity in payload")]
    ZeroQuantity { id: String },
}
