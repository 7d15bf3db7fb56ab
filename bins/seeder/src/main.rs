//! Database seeder for Khata development and testing.
//!
//! Seeds a test customer, supplier, a small product catalog, and the invoice
//! sequence configuration for local development.
//!
//! Usage: cargo run --bin seeder

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use khata_core::invoice::InvoiceConfig;
use khata_db::entities::{customers, products, settings, suppliers};
use khata_db::repositories::INVOICE_CONFIG_KEY;

/// Test customer ID (consistent for all seeds)
const TEST_CUSTOMER_ID: &str = "00000000-0000-0000-0000-000000000001";
/// Test supplier ID (consistent for all seeds)
const TEST_SUPPLIER_ID: &str = "00000000-0000-0000-0000-000000000002";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = khata_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding test customer...");
    seed_test_customer(&db).await;

    println!("Seeding test supplier...");
    seed_test_supplier(&db).await;

    println!("Seeding products...");
    seed_products(&db).await;

    println!("Seeding invoice configuration...");
    seed_invoice_config(&db).await;

    println!("Seeding complete!");
}

fn test_customer_id() -> Uuid {
    Uuid::parse_str(TEST_CUSTOMER_ID).unwrap()
}

fn test_supplier_id() -> Uuid {
    Uuid::parse_str(TEST_SUPPLIER_ID).unwrap()
}

/// Seeds a test customer for development.
async fn seed_test_customer(db: &DatabaseConnection) {
    if customers::Entity::find_by_id(test_customer_id())
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Test customer already exists, skipping...");
        return;
    }

    let now = Utc::now().into();
    let customer = customers::ActiveModel {
        id: Set(test_customer_id()),
        name: Set("Asha Traders".to_string()),
        phone: Set(Some("9876543210".to_string())),
        gst_number: Set(Some("27AAAAA0000A1Z5".to_string())),
        state: Set(Some("Maharashtra".to_string())),
        state_code: Set(Some("27".to_string())),
        credit_limit: Set(Decimal::new(50_000, 0)),
        outstanding_balance: Set(Decimal::ZERO),
        created_at: Set(now),
        updated_at: Set(now),
    };
    customer.insert(db).await.expect("Failed to seed customer");
}

/// Seeds a test supplier for development.
async fn seed_test_supplier(db: &DatabaseConnection) {
    if suppliers::Entity::find_by_id(test_supplier_id())
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Test supplier already exists, skipping...");
        return;
    }

    let now = Utc::now().into();
    let supplier = suppliers::ActiveModel {
        id: Set(test_supplier_id()),
        name: Set("Mehta & Sons".to_string()),
        gst_number: Set(Some("27BBBBB0000B1Z5".to_string())),
        outstanding_balance: Set(Decimal::ZERO),
        created_at: Set(now),
        updated_at: Set(now),
    };
    supplier.insert(db).await.expect("Failed to seed supplier");
}

/// Seeds a small product catalog.
async fn seed_products(db: &DatabaseConnection) {
    let catalog = [
        ("Steel Bucket 10L", 120, 150, 40),
        ("Garden Hose 15m", 300, 380, 25),
        ("LED Bulb 9W", 45, 60, 200),
    ];

    let now = Utc::now().into();
    for (name, purchase_price, selling_price, stock) in catalog {
        let existing = products::Entity::find()
            .all(db)
            .await
            .unwrap_or_default()
            .into_iter()
            .any(|p| p.name == name);
        if existing {
            println!("  Product '{name}' already exists, skipping...");
            continue;
        }

        let product = products::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            purchase_price: Set(Decimal::new(purchase_price, 0)),
            selling_price: Set(Decimal::new(selling_price, 0)),
            stock: Set(stock),
            gst_rate: Set(Some(Decimal::new(18, 0))),
            hsn_code: Set(None),
            supplier_id: Set(Some(test_supplier_id())),
            created_at: Set(now),
            updated_at: Set(now),
        };
        product.insert(db).await.expect("Failed to seed product");
    }
}

/// Seeds the invoice sequence configuration.
async fn seed_invoice_config(db: &DatabaseConnection) {
    if settings::Entity::find_by_id(INVOICE_CONFIG_KEY)
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Invoice configuration already exists, skipping...");
        return;
    }

    let config = InvoiceConfig::default();
    let row = settings::ActiveModel {
        key: Set(INVOICE_CONFIG_KEY.to_string()),
        value: Set(serde_json::to_value(&config).expect("Failed to serialize invoice config")),
        updated_at: Set(Utc::now().into()),
    };
    row.insert(db).await.expect("Failed to seed invoice config");
}
