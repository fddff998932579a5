//! # Seed Data Generator
//!
//! Populates the catalog with demo discounts for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./vela_dev.db, valid for 30 days from now (default)
//! cargo run -p vela-db --bin seed
//!
//! # Longer validity window
//! cargo run -p vela-db --bin seed -- --days 90
//!
//! # Specify database path
//! cargo run -p vela-db --bin seed -- --db ./data/vela.db
//! ```
//!
//! ## Generated Discounts
//! One of each shape the evaluator understands:
//! - Code-entered percentage and fixed discounts
//! - Category, product and customer targets
//! - First-purchase and minimum-order conditions
//! - Two stacking automatic discounts
//! - An expired and an inactive code (for rejection testing)

use chrono::{Duration, Utc};
use std::collections::BTreeSet;
use std::env;
use vela_core::{DiscountEffect, DiscountStatus, DiscountTarget, Money, PercentRate};
use vela_db::migrations::migration_status;
use vela_db::{Database, DbConfig, NewDiscount};

fn percent(bps: u32, cap: Option<i64>) -> DiscountEffect {
    DiscountEffect::Percentage {
        rate: PercentRate::from_bps(bps),
        cap: cap.map(Money::from_minor),
    }
}

fn fixed(amount: i64) -> DiscountEffect {
    DiscountEffect::Fixed {
        amount: Money::from_minor(amount),
    }
}

fn set(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut days: i64 = 30;
    let mut db_path = String::from("./vela_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--days" | "-n" => {
                if i + 1 < args.len() {
                    days = args[i + 1].parse().unwrap_or(30);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Vela Discount Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -n, --days <N>     Validity window in days from now (default: 30)");
                println!("  -d, --db <PATH>    Database file path (default: ./vela_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Vela Discount Seed Data Generator");
    println!("====================================");
    println!("Database: {}", db_path);
    println!("Window:   {} days", days);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let schema = migration_status(db.pool()).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied ({}/{})", schema.applied, schema.embedded);

    let existing = db.discounts().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} discounts", existing);
        println!("  Skipping seed to avoid duplicate codes.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let now = Utc::now();
    let start = now - Duration::days(1);
    let end = now + Duration::days(days);

    let discounts = vec![
        NewDiscount::new("10% off everything", percent(1000, None), start, end).code("SALE10"),
        NewDiscount::new("Welcome gift", fixed(20_000), start, end)
            .code("WELCOME")
            .first_purchase_only(),
        NewDiscount::new("15% off shoes", percent(1500, Some(50_000)), start, end)
            .code("SHOES15")
            .target(DiscountTarget::Categories(set(&["shoes"])))
            .min_order(Money::from_minor(100_000)),
        NewDiscount::new("Bundle saver", fixed(5_000), start, end)
            .code("BUNDLE5")
            .target(DiscountTarget::Products(set(&["tee-01", "cap-02"])))
            .usage(Some(100), 0),
        NewDiscount::new("VIP 25%", percent(2500, Some(100_000)), start, end)
            .code("VIP25")
            .target(DiscountTarget::Customers(set(&["cust-vip-1", "cust-vip-2"]))),
        NewDiscount::new("Flash sale", fixed(20_000), start, end)
            .automatic(Some(10))
            .min_order(Money::from_minor(150_000)),
        NewDiscount::new("Autumn 5%", percent(500, None), start, end).automatic(Some(5)),
        NewDiscount::new("Last season", percent(2000, None), now - Duration::days(90), now - Duration::days(60))
            .code("SUMMER20")
            .status(DiscountStatus::Expired),
        NewDiscount::new("Paused promo", fixed(10_000), start, end)
            .code("PAUSED")
            .status(DiscountStatus::Inactive),
    ];

    let mut inserted = 0;
    for discount in &discounts {
        match db.discounts().insert(discount).await {
            Ok(id) => {
                inserted += 1;
                println!(
                    "  #{:<3} {:<10} {}",
                    id,
                    discount.code.as_deref().unwrap_or("(auto)"),
                    discount.name
                );
            }
            Err(e) => eprintln!("Failed to insert {}: {}", discount.name, e),
        }
    }

    println!();
    println!("✓ Inserted {} discounts", inserted);

    let candidates = db.discounts().list_automatic_candidates(now).await?;
    println!("  Automatic candidates right now: {}", candidates.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
