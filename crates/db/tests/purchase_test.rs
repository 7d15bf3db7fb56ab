//! Integration tests for the purchase repository.
//!
//! Runs against an in-memory SQLite database.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait, QueryFilter};
use uuid::Uuid;

use khata_core::settlement::SettlementMethod;
use khata_db::entities::{products, supplier_transactions};
use khata_db::migration::{Migrator, MigratorTrait};
use khata_db::repositories::{
    AdvanceAdjustment, CreatePurchaseInput, CreateSupplierInput, PurchaseError, PurchaseItemInput,
    PurchaseRepository, SupplierRepository, VoucherInput, VoucherRepository,
};

async fn setup() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);
    let db = Database::connect(options)
        .await
        .expect("Failed to connect to in-memory database");
    Migrator::up(&db, None).await.expect("Failed to migrate");
    db
}

async fn seed_supplier(db: &DatabaseConnection, name: &str) -> Uuid {
    let repo = SupplierRepository::new(db.clone());
    let supplier = repo
        .create(CreateSupplierInput {
            name: name.to_string(),
            gst_number: None,
        })
        .await
        .expect("Failed to seed supplier");
    supplier.id
}

fn received() -> NaiveDate {
    Utc::now().date_naive()
}

fn line(name: &str, quantity: i32, rate: Decimal) -> PurchaseItemInput {
    PurchaseItemInput {
        product_name: name.to_string(),
        quantity,
        rate,
        amount: None,
        hsn_code: None,
        gst_rate: None,
    }
}

#[tokio::test]
async fn test_purchase_creates_product_and_bill() {
    let db = setup().await;
    let supplier_id = seed_supplier(&db, "Mehta & Sons").await;

    let repo = PurchaseRepository::new(db.clone());
    let created = repo
        .create_purchase(CreatePurchaseInput {
            supplier_id,
            invoice_number: "MS-1042".to_string(),
            received_date: received(),
            items: vec![line("Widget", 10, dec!(50))],
            advance_adjustments: vec![],
        })
        .await
        .expect("Failed to create purchase");

    assert_eq!(created.items.len(), 1);
    assert_eq!(created.items[0].total_cost, dec!(500));
    assert_eq!(created.bill.entry_type.as_str(), "bill");
    assert_eq!(created.bill.amount, dec!(500));
    assert_eq!(created.bill.amount_due, dec!(500));
    assert_eq!(created.bill.status.as_str(), "pending");
    assert_eq!(created.bill.purchase_invoice.as_deref(), Some("MS-1042"));
    assert_eq!(created.supplier_balance, dec!(500));

    // Unknown product was created with the purchase rate on both prices.
    let product = products::Entity::find()
        .filter(products::Column::Name.eq("Widget"))
        .one(&db)
        .await
        .unwrap()
        .expect("Product should exist");
    assert_eq!(product.stock, 10);
    assert_eq!(product.purchase_price, dec!(50));
    assert_eq!(product.selling_price, dec!(50));
    assert_eq!(product.supplier_id, Some(supplier_id));
}

#[tokio::test]
async fn test_restock_refreshes_both_master_prices() {
    let db = setup().await;
    let supplier_id = seed_supplier(&db, "Mehta & Sons").await;
    let repo = PurchaseRepository::new(db.clone());

    repo.create_purchase(CreatePurchaseInput {
        supplier_id,
        invoice_number: "MS-1042".to_string(),
        received_date: received(),
        items: vec![line("Widget", 10, dec!(50))],
        advance_adjustments: vec![],
    })
    .await
    .unwrap();

    repo.create_purchase(CreatePurchaseInput {
        supplier_id,
        invoice_number: "MS-1043".to_string(),
        received_date: received(),
        items: vec![line("Widget", 5, dec!(60))],
        advance_adjustments: vec![],
    })
    .await
    .unwrap();

    let product = products::Entity::find()
        .filter(products::Column::Name.eq("Widget"))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(product.stock, 15);
    // Last transaction price wins on both master prices.
    assert_eq!(product.purchase_price, dec!(60));
    assert_eq!(product.selling_price, dec!(60));
}

#[tokio::test]
async fn test_explicit_line_amount_wins_over_derived() {
    let db = setup().await;
    let supplier_id = seed_supplier(&db, "Mehta & Sons").await;
    let repo = PurchaseRepository::new(db.clone());

    let created = repo
        .create_purchase(CreatePurchaseInput {
            supplier_id,
            invoice_number: "MS-1044".to_string(),
            received_date: received(),
            items: vec![PurchaseItemInput {
                product_name: "Widget".to_string(),
                quantity: 10,
                rate: dec!(50),
                amount: Some(dec!(495)),
                hsn_code: None,
                gst_rate: None,
            }],
            advance_adjustments: vec![],
        })
        .await
        .unwrap();

    assert_eq!(created.items[0].total_cost, dec!(495));
    assert_eq!(created.bill.amount, dec!(495));
}

#[tokio::test]
async fn test_advance_adjustment_is_capped() {
    let db = setup().await;
    let supplier_id = seed_supplier(&db, "Mehta & Sons").await;

    // Record a 200 advance to the supplier.
    let vouchers = VoucherRepository::new(db.clone());
    let advance = vouchers
        .record_payment(VoucherInput {
            party_id: supplier_id,
            amount: dec!(200),
            method: SettlementMethod::Advance,
            entry_date: received(),
        })
        .await
        .expect("Failed to record advance");
    assert_eq!(advance.new_balance, dec!(-200));

    // Bill of 500, requesting 300 from the advance: capped at its 200.
    let repo = PurchaseRepository::new(db.clone());
    let created = repo
        .create_purchase(CreatePurchaseInput {
            supplier_id,
            invoice_number: "MS-1045".to_string(),
            received_date: received(),
            items: vec![line("Widget", 10, dec!(50))],
            advance_adjustments: vec![AdvanceAdjustment {
                advance_id: advance.entry_id,
                amount: Some(dec!(300)),
            }],
        })
        .await
        .expect("Failed to create purchase");

    assert_eq!(created.bill.amount_paid, dec!(200));
    assert_eq!(created.bill.amount_due, dec!(300));
    assert_eq!(created.bill.status.as_str(), "partial");
    // Balance: -200 from the advance, +300 still due on the bill.
    assert_eq!(created.supplier_balance, dec!(100));

    let advance_row = supplier_transactions::Entity::find_by_id(advance.entry_id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(advance_row.remaining_advance, dec!(0));
}

#[tokio::test]
async fn test_new_product_carries_line_tax_metadata() {
    let db = setup().await;
    let supplier_id = seed_supplier(&db, "Mehta & Sons").await;
    let repo = PurchaseRepository::new(db.clone());

    repo.create_purchase(CreatePurchaseInput {
        supplier_id,
        invoice_number: "MS-1051".to_string(),
        received_date: received(),
        items: vec![PurchaseItemInput {
            product_name: "Router".to_string(),
            quantity: 4,
            rate: dec!(1200),
            amount: None,
            hsn_code: Some("8517".to_string()),
            gst_rate: Some(dec!(18)),
        }],
        advance_adjustments: vec![],
    })
    .await
    .unwrap();

    let product = products::Entity::find()
        .filter(products::Column::Name.eq("Router"))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(product.hsn_code.as_deref(), Some("8517"));
    assert_eq!(product.gst_rate, Some(dec!(18)));
}

#[tokio::test]
async fn test_omitted_adjustment_amount_consumes_full_remainder() {
    let db = setup().await;
    let supplier_id = seed_supplier(&db, "Mehta & Sons").await;

    let vouchers = VoucherRepository::new(db.clone());
    let advance = vouchers
        .record_payment(VoucherInput {
            party_id: supplier_id,
            amount: dec!(150),
            method: SettlementMethod::Advance,
            entry_date: received(),
        })
        .await
        .unwrap();

    let repo = PurchaseRepository::new(db.clone());
    let created = repo
        .create_purchase(CreatePurchaseInput {
            supplier_id,
            invoice_number: "MS-1052".to_string(),
            received_date: received(),
            items: vec![line("Widget", 10, dec!(50))],
            advance_adjustments: vec![AdvanceAdjustment {
                advance_id: advance.entry_id,
                amount: None,
            }],
        })
        .await
        .unwrap();

    assert_eq!(created.bill.amount_paid, dec!(150));
    assert_eq!(created.bill.amount_due, dec!(350));

    let advance_row = supplier_transactions::Entity::find_by_id(advance.entry_id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(advance_row.remaining_advance, dec!(0));
}

#[tokio::test]
async fn test_unknown_advance_rejected() {
    let db = setup().await;
    let supplier_id = seed_supplier(&db, "Mehta & Sons").await;
    let repo = PurchaseRepository::new(db);

    let result = repo
        .create_purchase(CreatePurchaseInput {
            supplier_id,
            invoice_number: "MS-1046".to_string(),
            received_date: received(),
            items: vec![line("Widget", 1, dec!(50))],
            advance_adjustments: vec![AdvanceAdjustment {
                advance_id: Uuid::new_v4(),
                amount: Some(dec!(10)),
            }],
        })
        .await;

    assert!(matches!(result, Err(PurchaseError::AdvanceNotFound(_))));
}

#[tokio::test]
async fn test_empty_items_rejected() {
    let db = setup().await;
    let supplier_id = seed_supplier(&db, "Mehta & Sons").await;
    let repo = PurchaseRepository::new(db);

    let result = repo
        .create_purchase(CreatePurchaseInput {
            supplier_id,
            invoice_number: "MS-1047".to_string(),
            received_date: received(),
            items: vec![],
            advance_adjustments: vec![],
        })
        .await;

    assert!(matches!(result, Err(PurchaseError::EmptyItems)));
}

#[tokio::test]
async fn test_missing_supplier_rejected() {
    let db = setup().await;
    let repo = PurchaseRepository::new(db);

    let result = repo
        .create_purchase(CreatePurchaseInput {
            supplier_id: Uuid::new_v4(),
            invoice_number: "MS-1048".to_string(),
            received_date: received(),
            items: vec![line("Widget", 1, dec!(50))],
            advance_adjustments: vec![],
        })
        .await;

    assert!(matches!(result, Err(PurchaseError::SupplierNotFound(_))));
}

#[tokio::test]
async fn test_unpaid_bills_skips_settled_and_orders_oldest_first() {
    let db = setup().await;
    let supplier_id = seed_supplier(&db, "Mehta & Sons").await;
    let repo = PurchaseRepository::new(db.clone());

    let first = repo
        .create_purchase(CreatePurchaseInput {
            supplier_id,
            invoice_number: "MS-1049".to_string(),
            received_date: received(),
            items: vec![line("Widget", 2, dec!(50))],
            advance_adjustments: vec![],
        })
        .await
        .unwrap();
    let second = repo
        .create_purchase(CreatePurchaseInput {
            supplier_id,
            invoice_number: "MS-1050".to_string(),
            received_date: received(),
            items: vec![line("Widget", 1, dec!(50))],
            advance_adjustments: vec![],
        })
        .await
        .unwrap();

    // Settle the first bill in full.
    let vouchers = VoucherRepository::new(db.clone());
    vouchers
        .record_payment(VoucherInput {
            party_id: supplier_id,
            amount: dec!(100),
            method: SettlementMethod::AgainstBill(first.bill.id),
            entry_date: received(),
        })
        .await
        .unwrap();

    let unpaid = repo.unpaid_bills(supplier_id).await.unwrap();
    assert_eq!(unpaid.len(), 1);
    assert_eq!(unpaid[0].id, second.bill.id);
}
