//! # vetpos-db: Database Layer for VetPOS Pricing
//!
//! The data-access collaborator of the pricing engine. Stores products,
//! price books, price rules and volume tiers in SQLite via sqlx, and serves
//! them to [`vetpos_core::pricing::PriceSimulator`] through the
//! [`PricingCatalog`](vetpos_core::pricing::PricingCatalog) trait.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        VetPOS Pricing Data Flow                         │
//! │                                                                         │
//! │  PriceSimulator::simulate(request)                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     vetpos-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ ProductRepo   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ PriceBookRepo │    │ 001_pricing_ │  │   │
//! │  │   │ + catalog.rs  │    │ PriceRuleRepo │    │   schema.sql │  │   │
//! │  │   │               │    │ VolumeTierRepo│    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - One repository per table
//! - [`catalog`] - `PricingCatalog` implementation
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vetpos_core::pricing::{PriceSimulator, SimulationRequest};
//! use vetpos_core::PricingConfig;
//! use vetpos_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./vetpos.db")).await?;
//! let simulator = PriceSimulator::new(db, PricingConfig::from_env());
//!
//! let sim = simulator
//!     .simulate(&SimulationRequest { price_book_id: 1, sku: "AMOX-250".into(), qty: 12, when: Utc::now() })
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::price_book::PriceBookRepository;
pub use repository::price_rule::PriceRuleRepository;
pub use repository::product::ProductRepository;
pub use repository::volume_tier::VolumeTierRepository;
