//! # Item Types
//!
//! The two item shapes that flow through a cart.
//!
//! ## Why Two Types?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   NewItem (catalog side)              CartItem (cart side)              │
//! │   ──────────────────────              ────────────────────              │
//! │   id                                  id                                │
//! │   title                     add()     title                             │
//! │   image_url               ────────►   image_url                         │
//! │   price                               price                             │
//! │   (no quantity)                       quantity  >= 1, store-managed     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A caller describes *what* to add; only the cart decides *how many* are
//! held. Keeping quantity off [`NewItem`] makes it impossible to inject a
//! zero or conflicting quantity through the add path.

use serde::{Deserialize, Serialize};

// =============================================================================
// CartItem
// =============================================================================

/// One line of the cart: a product plus how many units of it are held.
///
/// The field names and types below are the snapshot payload format; a
/// serialized cart is exactly a JSON array of these objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Caller-assigned product identifier. Unique within a cart.
    pub id: String,

    /// Display name shown in cart listings.
    pub title: String,

    /// Where to fetch the product image from.
    pub image_url: String,

    /// Unit price. Opaque to the cart: never summed or compared to decide
    /// a mutation, only carried and displayed.
    pub price: f64,

    /// Units of this product in the cart. Always >= 1; a line that would
    /// reach zero is removed instead.
    pub quantity: u32,
}

// =============================================================================
// NewItem
// =============================================================================

/// A candidate item for [`Cart::add`](crate::Cart::add).
///
/// Carries everything a [`CartItem`] does except the quantity, which the
/// cart manages itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    /// Caller-assigned product identifier.
    pub id: String,

    /// Display name shown in cart listings.
    pub title: String,

    /// Where to fetch the product image from.
    pub image_url: String,

    /// Unit price.
    pub price: f64,
}

impl NewItem {
    /// Creates a candidate item.
    ///
    /// ## Example
    /// ```rust
    /// use gocart_core::NewItem;
    ///
    /// let item = NewItem::new("sku-7", "Filter Papers", "filters.png", 3.2);
    /// assert_eq!(item.id, "sku-7");
    /// ```
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: f64,
    ) -> Self {
        NewItem {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }

    /// Converts into a cart line holding a single unit.
    pub(crate) fn into_item(self) -> CartItem {
        CartItem {
            id: self.id,
            title: self.title,
            image_url: self.image_url,
            price: self.price,
            quantity: 1,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_item_starts_with_one_unit() {
        let item = NewItem::new("sku-1", "Espresso Beans", "beans.png", 12.5).into_item();

        assert_eq!(item.id, "sku-1");
        assert_eq!(item.title, "Espresso Beans");
        assert_eq!(item.image_url, "beans.png");
        assert_eq!(item.price, 12.5);
        assert_eq!(item.quantity, 1);
    }

    #[test]
    fn test_cart_item_wire_field_names() {
        let item = CartItem {
            id: "sku-1".to_string(),
            title: "Espresso Beans".to_string(),
            image_url: "beans.png".to_string(),
            price: 12.5,
            quantity: 3,
        };

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["id"], "sku-1");
        assert_eq!(json["title"], "Espresso Beans");
        assert_eq!(json["image_url"], "beans.png");
        assert_eq!(json["price"], 12.5);
        assert_eq!(json["quantity"], 3);
    }
}
