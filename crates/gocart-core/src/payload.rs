//! # Snapshot Payload Codec
//!
//! Turns a [`Cart`] into the string a persistence backend stores, and turns
//! a stored string back into a cart.
//!
//! ## Payload Format
//! The payload is a JSON array of item objects, nothing else:
//!
//! ```json
//! [
//!   {"id": "sku-1", "title": "Espresso Beans", "image_url": "beans.png",
//!    "price": 12.5, "quantity": 2}
//! ]
//! ```
//!
//! ## Where Validation Lives
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Cart ──── encode ────► String ────► backend.save(key, payload)        │
//! │                                                                         │
//! │   backend.load(key) ───► String ──── decode ────► Cart                  │
//! │                                          │                              │
//! │                                          ├── bad JSON      ► Json       │
//! │                                          ├── repeated id   ► DuplicateId│
//! │                                          └── zero quantity ► ZeroQty    │
//! │                                                                         │
//! │   Encoding cannot fail. Decoding re-checks the cart invariants so a     │
//! │   foreign or corrupted snapshot can never smuggle a broken cart into    │
//! │   the store.                                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashSet;

use crate::cart::Cart;
use crate::error::PayloadError;
use crate::item::CartItem;

// =============================================================================
// Encode
// =============================================================================

/// Serializes a cart to its snapshot payload.
///
/// An empty cart encodes as `[]`, not as an absent value; restoring it later
/// yields an empty cart rather than "nothing stored yet".
pub fn encode(cart: &Cart) -> String {
    // Plain strings and numbers; there is no failing path through serde here.
    serde_json::to_string(cart).expect("cart items always serialize to JSON")
}

// =============================================================================
// Decode
// =============================================================================

/// Parses and validates a snapshot payload.
///
/// ## Behavior
/// - Parses the payload as a JSON array of item objects
/// - Rejects repeated product ids
/// - Rejects lines with zero quantity (negative or fractional quantities
///   already fail JSON parsing for a `u32` field)
/// - Preserves the array order as the cart's insertion order
///
/// ## Returns
/// The restored cart, or the first [`PayloadError`] encountered.
pub fn decode(payload: &str) -> Result<Cart, PayloadError> {
    let items: Vec<CartItem> = serde_json::from_str(payload)?;

    let mut seen: HashSet<&str> = HashSet::with_capacity(items.len());
    for item in &items {
        if item.quantity == 0 {
            return Err(PayloadError::ZeroQuantity {
                id: item.id.clone(),
            });
        }
        if !seen.insert(item.id.as_str()) {
            return Err(PayloadError::DuplicateId {
                id: item.id.clone(),
            });
        }
    }

    Ok(Cart::from_items(items))
}

// =============================================================================
// Tests
// =============================================================================
