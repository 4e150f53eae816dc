//! # Storefront Walkthrough
//!
//! Drives a cart through a small shopping session against a real SQLite
//! backend, then shows the restore on the next run.
//!
//! ## Usage
//! ```bash
//! # First run: builds a cart and persists it
//! cargo run -p gocart-store --example storefront
//!
//! # Second run: starts from the persisted cart
//! cargo run -p gocart-store --example storefront
//!
//! # Start over (path is under the system temp dir, /tmp on Linux)
//! rm /tmp/gocart-storefront/cart.db
//!
//! # Verbose logging
//! RUST_LOG=gocart=debug cargo run -p gocart-store --example storefront
//! ```

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use gocart_persist::{SqliteBackend, SqliteConfig};
use gocart_store::{CartStore, NewItem, StoreConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    // Keep the demo database away from any real gocart data.
    let db_path = std::env::temp_dir().join("gocart-storefront").join("cart.db");
    let backend = SqliteBackend::new(SqliteConfig::new(&db_path)).await?;
    let store = CartStore::open(Arc::new(backend), StoreConfig::default()).await;

    let restored = store.items();
    if restored.is_empty() {
        println!("Starting with an empty cart");
    } else {
        println!("Restored {} line(s) from {}:", restored.len(), db_path.display());
        print_cart(&restored);
    }

    let mut rx = store.subscribe();

    println!("\nShopping...");
    store.add_to_cart(NewItem::new(
        "beans",
        "Espresso Beans 1kg",
        "https://img.example/beans.png",
        12.5,
    ));
    store.add_to_cart(NewItem::new(
        "filters",
        "Filter Papers",
        "https://img.example/filters.png",
        3.2,
    ));
    store.increment("beans");
    store.decrement("filters");

    // Each mutation pushed a fresh snapshot to the subscription.
    rx.changed().await?;
    print_cart(&rx.borrow_and_update());

    // Make sure the snapshot reached SQLite before we report success.
    store.flush().await;
    match store.save_failures() {
        0 => println!("\nCart persisted to {}", db_path.display()),
        n => println!("\nWARNING: {} save attempt(s) failed; check the logs", n),
    }

    store.shutdown().await;
    println!("Run this example again to see the cart come back.");

    Ok(())
}

fn print_cart(cart: &gocart_store::Cart) {
    for item in cart.iter() {
        println!("  {:>3} x {:<20} @ {:>6.2}  [{}]", item.quantity, item.title, item.price, item.id);
    }
    println!("  ({} unit(s), subtotal {:.2})", cart.total_quantity(), cart.subtotal());
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=gocart=trace` - Show trace for gocart crates only
/// - Default: INFO level
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,gocart=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
