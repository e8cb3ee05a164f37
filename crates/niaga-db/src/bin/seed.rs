//! # Seed Data Generator
//!
//! Populates a database with an admin, a customer and a small catalog for
//! local development.
//!
//! ## Usage
//! ```bash
//! cargo run -p niaga-db --bin seed
//!
//! # Specify database path
//! cargo run -p niaga-db --bin seed -- --db ./data/niaga.db
//! ```

use std::env;

use anyhow::Context;
use niaga_core::{Money, Role};
use niaga_db::{Database, DbConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// (name, description, price)
const PRODUCTS: &[(&str, &str, i64)] = &[
    ("Beras Premium", "5kg", 75_000),
    ("Minyak Goreng", "Botol 2L", 38_000),
    ("Gula Pasir", "1kg", 18_000),
    ("Kopi Bubuk", "250g", 50_000),
    ("Teh Celup", "Isi 25", 9_500),
    ("Susu UHT", "Kotak 1L", 19_000),
    ("Telur Ayam", "10 butir", 28_000),
    ("Garam Dapur", "500g", 4_000),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./niaga_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-d" | "--db" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "-h" | "--help" => {
                println!("Niaga Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./niaga_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => warn!(arg = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    let db = Database::new(DbConfig::new(&db_path))
        .await
        .with_context(|| format!("opening {db_path}"))?;

    let users = db.users();
    if users.get_by_email("admin@niaga.local").await?.is_none() {
        let admin = users
            .insert(
                "Super Admin",
                "admin@niaga.local",
                Role::Admin,
                Some("Kantor Pusat"),
                Some("081234567890"),
            )
            .await?;
        info!(id = admin.id, email = %admin.email, "Created admin");
    }
    if users.get_by_email("pelanggan@niaga.local").await?.is_none() {
        let customer = users
            .insert(
                "Pelanggan Contoh",
                "pelanggan@niaga.local",
                Role::Customer,
                Some("Jl. Merdeka 1"),
                Some("081298765432"),
            )
            .await?;
        info!(id = customer.id, email = %customer.email, "Created customer");
    }

    let products = db.products();
    let existing = products.count().await?;
    if existing > 0 {
        warn!(existing, "Catalog already has products, skipping");
    } else {
        for (name, description, price) in PRODUCTS {
            let p = products.insert(name, Some(*description), *price).await?;
            info!(id = p.id, name = %p.name, price = %Money::from_minor(p.price), "Created product");
        }
    }

    info!(path = %db_path, "Seed complete");
    db.close().await;
    Ok(())
}
