//! # The Cart
//!
//! An ordered collection of [`CartItem`] lines and the three mutations that
//! are allowed to touch it.
//!
//! ## Mutation Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Cart Mutations                                  │
//! │                                                                         │
//! │  Operation             Id in cart?          Effect                      │
//! │  ─────────────         ───────────          ──────────────────────      │
//! │                                                                         │
//! │  add(item) ──────────► yes ───────────────► quantity + 1 (increment)    │
//! │                        no  ───────────────► append line, quantity = 1   │
//! │                                                                         │
//! │  increment(id) ──────► yes ───────────────► quantity + 1                │
//! │                        no  ───────────────► no-op                       │
//! │                                                                         │
//! │  decrement(id) ──────► yes, quantity > 1 ─► quantity - 1                │
//! │                        yes, quantity = 1 ─► remove the line             │
//! │                        no  ───────────────► no-op                       │
//! │                                                                         │
//! │  NOTE: Every call reports what happened via CartChange. No mutation     │
//! │        can fail; unknown ids are silently tolerated.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::item::{CartItem, NewItem};

// =============================================================================
// CartChange
// =============================================================================

/// What a cart mutation actually did.
///
/// Callers that only care about the new contents can ignore this; the store
/// layer uses it for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartChange {
    /// A new line was appended with quantity 1.
    Added,
    /// An existing line's quantity went up by one.
    Incremented,
    /// An existing line's quantity went down by one.
    Decremented,
    /// A line at quantity 1 was decremented away.
    Removed,
    /// The id was not in the cart; nothing changed.
    Unchanged,
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
///
/// ## Invariants
/// - Items are unique by `id` (adding a known id increases its quantity)
/// - Every quantity is >= 1 (a decrement at quantity 1 removes the line)
/// - Insertion order is preserved; removing a line never reorders the rest
///
/// Serialization is transparent: a cart serializes as the JSON array of its
/// items, which is exactly the snapshot payload format.
///
/// ## Why Are the Items Private?
/// The invariants above hold because `add`, `increment` and `decrement` are
/// the only ways to change a cart. Deserialization goes through
/// [`payload::decode`](crate::payload::decode), which re-checks them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Builds a cart from already-validated lines.
    ///
    /// Only the payload decoder may call this; it has checked id uniqueness
    /// and nonzero quantities first.
    pub(crate) fn from_items(items: Vec<CartItem>) -> Self {
        Cart { items }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds a candidate item to the cart.
    ///
    /// ## Behavior
    /// - Id already in cart: delegates to [`increment`](Cart::increment);
    ///   the candidate's title, image and price are discarded and the
    ///   existing line keeps its own
    /// - Id not in cart: appends a new line with quantity 1
    ///
    /// ## Example
    /// ```rust
    /// use gocart_core::{Cart, CartChange, NewItem};
    ///
    /// let mut cart = Cart::new();
    /// assert_eq!(cart.add(NewItem::new("a", "A", "a.png", 1.0)), CartChange::Added);
    /// assert_eq!(cart.add(NewItem::new("a", "A", "a.png", 1.0)), CartChange::Incremented);
    /// ```
    pub fn add(&mut self, item: NewItem) -> CartChange {
        if self.contains(&item.id) {
            self.increment(&item.id)
        } else {
            self.items.push(item.into_item());
            CartChange::Added
        }
    }

    /// Raises the quantity of the line with the given id by one.
    ///
    /// ## Behavior
    /// - Id in cart: quantity + 1 (saturating at `u32::MAX`)
    /// - Id not in cart: no-op, returns [`CartChange::Unchanged`]
    pub fn increment(&mut self, id: &str) -> CartChange {
        match self.items.iter_mut().find(|i| i.id == id) {
            Some(item) => {
                item.quantity = item.quantity.saturating_add(1);
                CartChange::Incremented
            }
            None => CartChange::Unchanged,
        }
    }

    /// Lowers the quantity of the line with the given id by one.
    ///
    /// ## Behavior
    /// - Id in cart with quantity > 1: quantity - 1
    /// - Id in cart with quantity 1: the line is removed; the order of the
    ///   remaining lines is untouched
    /// - Id not in cart: no-op, returns [`CartChange::Unchanged`]
    pub fn decrement(&mut self, id: &str) -> CartChange {
        match self.items.iter().position(|i| i.id == id) {
            Some(pos) if self.items[pos].quantity > 1 => {
                self.items[pos].quantity -= 1;
                CartChange::Decremented
            }
            Some(pos) => {
                self.items.remove(pos);
                CartChange::Removed
            }
            None => CartChange::Unchanged,
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Returns the cart lines in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Iterates over the cart lines in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, CartItem> {
        self.items.iter()
    }

    /// Looks up a line by product id.
    pub fn get(&self, id: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Checks whether a product id has a line in the cart.
    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|i| i.id == id)
    }

    /// Returns the number of lines in the cart.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the total number of units across all lines.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Sums price × quantity over all lines.
    ///
    /// Display value only: no mutation ever consults it, and prices carry
    /// whatever unit the catalog assigned them.
    pub fn subtotal(&self) -> f64 {
        self.items
            .iter()
            .map(|i| i.price * f64::from(i.quantity))
            .sum()
    }
}

// =============================================================================
// Tests
// =============================================================================
