//! # Seed Data Generator
//!
//! Populates the database with a small veterinary catalog and one price
//! book, then prints a few price simulations.
//!
//! ## Usage
//! ```bash
//! # Seed ./vetpos_dev.db
//! cargo run -p vetpos-db --bin seed
//!
//! # Specify database path
//! cargo run -p vetpos-db --bin seed -- --db ./data/vetpos.db
//!
//! # Simulations honour VETPOS_* settings and RUST_LOG
//! VETPOS_TAX_RATE=11 RUST_LOG=debug cargo run -p vetpos-db --bin seed
//! ```
//!
//! ## Seeded Data
//! - Products across antibiotics, vaccines, parasiticides and food
//! - Price book "Clinic" with sku, category and catch-all rules
//! - Volume tiers for one SKU and one category

use chrono::{Duration, Utc};
use std::env;
use tracing_subscriber::EnvFilter;
use vetpos_core::money::Money;
use vetpos_core::pricing::{PriceSimulator, SimulationRequest};
use vetpos_core::{
    Percentage, PriceRule, PricingConfig, Product, RuleAction, Scope, TierDiscount, TierScope,
    VolumeTier,
};
use vetpos_db::repository::product::generate_product_id;
use vetpos_db::{Database, DbConfig};

/// (sku, name, list price in major units, category)
const PRODUCTS: &[(&str, &str, i64, &str)] = &[
    ("AMOX-250", "Amoxicillin 250mg", 100_000, "antibiotics"),
    ("DOXY-100", "Doxycycline 100mg", 65_000, "antibiotics"),
    ("ENRO-50", "Enrofloxacin 50mg", 80_000, "antibiotics"),
    ("VAX-RAB", "Rabies Vaccine", 150_000, "vaccines"),
    ("VAX-DHPP", "DHPP Vaccine", 175_000, "vaccines"),
    ("NEX-CHEW", "Flea & Tick Chewable", 120_000, "parasiticides"),
    ("FOOD-RC2", "Renal Diet 2kg", 310_000, "food"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./vetpos_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("VetPOS Pricing Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./vetpos_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 VetPOS Pricing Seed Data Generator");
    println!("====================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    let book_id = if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        1
    } else {
        seed(&db).await?
    };

    println!();
    println!("Sample simulations (price book {}):", book_id);

    let config = PricingConfig::from_env();
    let simulator = PriceSimulator::new(db.clone(), config);
    let now = Utc::now();

    for (sku, qty) in [("AMOX-250", 1), ("AMOX-250", 12), ("DOXY-100", 30), ("VAX-RAB", 2), ("FOOD-RC2", 4)] {
        let request = SimulationRequest {
            price_book_id: book_id,
            sku: sku.to_string(),
            qty,
            when: now,
        };

        match simulator.simulate(&request).await {
            Ok(sim) => {
                let shown = sim
                    .final_price
                    .map(|p| simulator.config().format_currency(p))
                    .unwrap_or_else(|| "-".to_string());
                println!("  {} x{} → {} ({})", sku, qty, shown, sim.applied_reason);
                println!("{}", serde_json::to_string_pretty(&sim)?);
            }
            Err(e) => eprintln!("  {} x{} failed: {}", sku, qty, e),
        }
    }

    db.close().await;

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Inserts the catalog, one price book, its rules and tiers.
///
/// Returns the price book id.
async fn seed(db: &Database) -> Result<i64, Box<dyn std::error::Error>> {
    println!();
    println!("Generating catalog...");

    let mut amoxicillin_id = None;
    for (sku, name, major, category) in PRODUCTS {
        let product = db
            .products()
            .insert(&Product {
                id: generate_product_id(),
                sku: sku.to_string(),
                name: name.to_string(),
                list_price: Money::from_major(*major),
                category_id: Some(category.to_string()),
                is_active: true,
            })
            .await?;

        if product.sku == "AMOX-250" {
            amoxicillin_id = Some(product.id.clone());
        }
    }
    println!("✓ Inserted {} products", PRODUCTS.len());

    let book = db.price_books().insert("Clinic").await?;
    println!("✓ Created price book #{} \"{}\"", book.id, book.name);

    let now = Utc::now();
    let rules = [
        rule(book.id, "Clinic amoxicillin", RuleAction::Percent(Percentage::from_percent(10)), 10, Scope::Sku, Some("AMOX-250")),
        rule(book.id, "Antibiotics", RuleAction::Amount(Money::from_major(5_000)), 5, Scope::Category, Some("antibiotics")),
        rule(book.id, "Rabies campaign", RuleAction::Net(Money::from_major(120_000)), 20, Scope::Sku, Some("VAX-RAB")),
        rule(book.id, "Members", RuleAction::Percent(Percentage::from_percent(2)), 0, Scope::All, None),
    ];

    for mut rule in rules {
        if rule.name == "Rabies campaign" {
            rule.effective_from = Some(now - Duration::days(7));
            rule.effective_to = Some(now + Duration::days(30));
        }
        db.price_rules().insert(&rule).await?;
    }
    println!("✓ Inserted 4 price rules");

    let tiers = [
        tier(TierScope::Sku, amoxicillin_id, None, 10, TierDiscount::Percent(Percentage::from_percent(5))),
        tier(TierScope::Category, None, Some("antibiotics"), 25, TierDiscount::Percent(Percentage::from_percent(8))),
        tier(TierScope::Category, None, Some("food"), 3, TierDiscount::Amount(Money::from_major(10_000))),
    ];
    for tier in &tiers {
        db.volume_tiers().insert(tier).await?;
    }
    println!("✓ Inserted {} volume tiers", tiers.len());

    Ok(book.id)
}

fn rule(
    price_book_id: i64,
    name: &str,
    action: RuleAction,
    priority: i32,
    scope: Scope,
    target: Option<&str>,
) -> PriceRule {
    PriceRule {
        id: 0,
        price_book_id,
        name: name.to_string(),
        action,
        priority,
        min_qty: None,
        max_qty: None,
        scope,
        target: target.map(str::to_string),
        is_active: true,
        effective_from: None,
        effective_to: None,
    }
}

fn tier(
    scope: TierScope,
    product_id: Option<String>,
    category_id: Option<&str>,
    min_qty: i64,
    discount: TierDiscount,
) -> VolumeTier {
    VolumeTier {
        tier_id: 0,
        scope,
        product_id,
        category_id: category_id.map(str::to_string),
        min_qty,
        discount,
        is_active: true,
        effective_from: None,
        effective_to: None,
    }
}
