//! # Seed Data Loader
//!
//! Populates a development database with sample suppliers and stock.
//!
//! ## Usage
//! ```bash
//! # Seed ./shopkeep.db (default)
//! cargo run -p shopkeep-db --bin seed
//!
//! # Specify database path
//! cargo run -p shopkeep-db --bin seed -- --db ./data/shopkeep.db
//!
//! # Also record a sample sale (3 × A001 at 50,000)
//! cargo run -p shopkeep-db --bin seed -- --with-sale
//! ```

use chrono::Utc;
use shopkeep_core::{Category, DraftLine, Money, NewProduct, NewSupplier, SaleDraft};
use shopkeep_db::{Database, DbConfig};
use std::env;

/// (name, contact, address, payment terms)
const SUPPLIERS: &[(&str, &str, &str, &str)] = &[
    ("ABC Arms Supplier", "03001234567", "Karachi, Pakistan", "30 days"),
    ("XYZ Weapons Co", "03007654321", "Lahore, Pakistan", "15 days"),
];

/// (productId, name, quantity, cost price, category, supplier index)
const PRODUCTS: &[(&str, &str, i64, i64, Category, usize)] = &[
    ("A001", "PX3 CHINA 30 BORE", 10, 35_000, Category::Pistol, 0),
    ("A002", "TT PISTOL 30 BORE", 6, 28_000, Category::Pistol, 0),
    ("B001", "222 BOLT ACTION", 4, 120_000, Category::Rifle, 1),
    ("B002", "7MM SPORTER", 2, 185_000, Category::Rifle, 1),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./shopkeep.db");
    let mut with_sale = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--with-sale" => with_sale = true,
            "--help" | "-h" => {
                println!("Shopkeep Seed Data Loader");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./shopkeep.db)");
                println!("      --with-sale    Also record a sample sale");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Shopkeep Seed Data Loader");
    println!("============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await? + db.suppliers().count().await?;
    if existing > 0 {
        println!("⚠ Database already has data");
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        db.close().await;
        return Ok(());
    }

    let mut supplier_ids = Vec::with_capacity(SUPPLIERS.len());
    for (name, contact, address, terms) in SUPPLIERS {
        let supplier = db
            .suppliers()
            .create(NewSupplier {
                name: name.to_string(),
                contact: contact.to_string(),
                address: Some(address.to_string()),
                payment_terms: Some(terms.to_string()),
            })
            .await?;
        println!("  + supplier {}", supplier.name);
        supplier_ids.push(supplier.id);
    }

    let mut first_product = None;
    for (code, name, quantity, cost, category, supplier) in PRODUCTS {
        let product = db
            .products()
            .create(NewProduct {
                product_code: code.to_string(),
                name: name.to_string(),
                quantity: *quantity,
                cost_price: Money::from_minor(*cost),
                category: *category,
                supplier: supplier_ids.get(*supplier).cloned(),
            })
            .await?;
        println!("  + product {} {} (qty {})", product.product_code, product.name, product.quantity);
        first_product.get_or_insert(product);
    }

    if let (true, Some(product)) = (with_sale, first_product) {
        let sale = db
            .processor()
            .create_sale(SaleDraft {
                voucher_number: format!("TEST-{}", Utc::now().timestamp_millis()),
                products: vec![DraftLine {
                    product: product.id.clone(),
                    quantity: 3,
                    sale_price: Money::from_minor(50_000),
                }],
                date: None,
            })
            .await?;
        println!(
            "  + sale {} total {} profit {}",
            sale.voucher_number, sale.total_amount, sale.profit
        );
    }

    db.close().await;

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
