//! # gocart-core: Pure Cart Logic for gocart
//!
//! This crate is the **heart** of gocart. It contains the cart data model
//! and its mutation rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         gocart Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Consumer Code                                │   │
//! │  │    product listing ──► cart screen ──► checkout                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 gocart-store (CartStore)                        │   │
//! │  │    add_to_cart, increment, decrement, subscribe                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ gocart-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐   │   │
//! │  │   │   item    │  │   cart    │  │  payload  │  │   error   │   │   │
//! │  │   │ CartItem  │  │   Cart    │  │  encode   │  │ Payload   │   │   │
//! │  │   │  NewItem  │  │ mutations │  │  decode   │  │  Error    │   │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                gocart-persist (Storage Layer)                   │   │
//! │  │              SQLite snapshots, in-memory backend                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`item`] - Item types (CartItem, NewItem)
//! - [`cart`] - The Cart collection and its three mutations
//! - [`payload`] - Snapshot payload encoding and validated decoding
//! - [`error`] - Payload error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every mutation is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Closed Mutation Set**: A cart changes only through `add`, `increment`
//!    and `decrement`; there is no way to smuggle in a duplicate id or a
//!    zero-quantity line
//! 4. **Explicit Errors**: Decoding failures are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use gocart_core::{Cart, CartChange, NewItem};
//!
//! let mut cart = Cart::new();
//!
//! let change = cart.add(NewItem::new("sku-1", "Espresso Beans", "beans.png", 12.5));
//! assert_eq!(change, CartChange::Added);
//!
//! // Adding a known id is exactly an increment
//! cart.add(NewItem::new("sku-1", "Espresso Beans", "beans.png", 12.5));
//! assert_eq!(cart.get("sku-1").map(|i| i.quantity), Some(2));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod item;
pub mod payload;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use gocart_core::Cart` instead of
// `use gocart_core::cart::Cart`

pub use cart::{Cart, CartChange};
pub use error::PayloadError;
pub use item::{CartItem, NewItem};
