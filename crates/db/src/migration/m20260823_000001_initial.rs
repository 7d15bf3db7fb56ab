//! Initial database migration.
//!
//! Creates the ledger store: parties, products, sales and line items,
//! purchases, the two audit ledgers, and the settings key/value store.
//! Written with the portable schema DSL so the same migration runs on
//! Postgres in production and SQLite in the test suite.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Customers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Customers::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Customers::Name).string().not_null())
                    .col(ColumnDef::new(Customers::Phone).string())
                    .col(ColumnDef::new(Customers::GstNumber).string())
                    .col(ColumnDef::new(Customers::State).string())
                    .col(ColumnDef::new(Customers::StateCode).string())
                    .col(
                        ColumnDef::new(Customers::CreditLimit)
                            .decimal_len(14, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Customers::OutstandingBalance)
                            .decimal_len(14, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Customers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Customers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Suppliers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Suppliers::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Suppliers::Name).string().not_null())
                    .col(ColumnDef::new(Suppliers::GstNumber).string())
                    .col(
                        ColumnDef::new(Suppliers::OutstandingBalance)
                            .decimal_len(14, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Suppliers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Suppliers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Products::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Products::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Products::PurchasePrice)
                            .decimal_len(14, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Products::SellingPrice)
                            .decimal_len(14, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Products::Stock).integer().not_null().default(0))
                    .col(ColumnDef::new(Products::GstRate).decimal_len(5, 2))
                    .col(ColumnDef::new(Products::HsnCode).string())
                    .col(ColumnDef::new(Products::SupplierId).uuid())
                    .col(
                        ColumnDef::new(Products::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Products::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_products_supplier")
                            .from(Products::Table, Products::SupplierId)
                            .to(Suppliers::Table, Suppliers::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Sales::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Sales::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Sales::InvoiceNumber)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Sales::CustomerId).uuid())
                    .col(ColumnDef::new(Sales::Subtotal).decimal_len(14, 2).not_null())
                    .col(ColumnDef::new(Sales::Tax).decimal_len(14, 2).not_null())
                    .col(
                        ColumnDef::new(Sales::Discount)
                            .decimal_len(14, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Sales::Total).decimal_len(14, 2).not_null())
                    .col(
                        ColumnDef::new(Sales::AmountPaid)
                            .decimal_len(14, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Sales::AmountDue).decimal_len(14, 2).not_null())
                    .col(ColumnDef::new(Sales::PaymentMode).string_len(32).not_null())
                    .col(ColumnDef::new(Sales::Status).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Sales::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Sales::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sales_customer")
                            .from(Sales::Table, Sales::CustomerId)
                            .to(Customers::Table, Customers::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SaleItems::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SaleItems::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(SaleItems::SaleId).uuid().not_null())
                    .col(ColumnDef::new(SaleItems::ProductId).uuid().not_null())
                    .col(ColumnDef::new(SaleItems::Quantity).integer().not_null())
                    .col(ColumnDef::new(SaleItems::Price).decimal_len(14, 2).not_null())
                    .col(ColumnDef::new(SaleItems::Total).decimal_len(14, 2).not_null())
                    .col(ColumnDef::new(SaleItems::HsnCode).string())
                    .col(ColumnDef::new(SaleItems::GstRate).decimal_len(5, 2))
                    .col(
                        ColumnDef::new(SaleItems::Discount)
                            .decimal_len(14, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SaleItems::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sale_items_sale")
                            .from(SaleItems::Table, SaleItems::SaleId)
                            .to(Sales::Table, Sales::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sale_items_product")
                            .from(SaleItems::Table, SaleItems::ProductId)
                            .to(Products::Table, Products::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Purchases::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Purchases::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Purchases::ProductId).uuid().not_null())
                    .col(ColumnDef::new(Purchases::SupplierId).uuid().not_null())
                    .col(ColumnDef::new(Purchases::InvoiceNumber).string().not_null())
                    .col(ColumnDef::new(Purchases::QuantityReceived).integer().not_null())
                    .col(ColumnDef::new(Purchases::UnitCost).decimal_len(14, 2).not_null())
                    .col(ColumnDef::new(Purchases::TotalCost).decimal_len(14, 2).not_null())
                    .col(ColumnDef::new(Purchases::ReceivedDate).date().not_null())
                    .col(
                        ColumnDef::new(Purchases::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_purchases_product")
                            .from(Purchases::Table, Purchases::ProductId)
                            .to(Products::Table, Products::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_purchases_supplier")
                            .from(Purchases::Table, Purchases::SupplierId)
                            .to(Suppliers::Table, Suppliers::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_purchases_invoice_number")
                    .table(Purchases::Table)
                    .col(Purchases::InvoiceNumber)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CreditTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CreditTransactions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CreditTransactions::CustomerId).uuid().not_null())
                    .col(ColumnDef::new(CreditTransactions::SaleId).uuid())
                    .col(
                        ColumnDef::new(CreditTransactions::EntryType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CreditTransactions::Amount)
                            .decimal_len(14, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CreditTransactions::AmountPaid)
                            .decimal_len(14, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(CreditTransactions::AmountDue)
                            .decimal_len(14, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(CreditTransactions::Status)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(CreditTransactions::Method).string_len(16))
                    .col(
                        ColumnDef::new(CreditTransactions::IsAdvance)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(CreditTransactions::RemainingAdvance)
                            .decimal_len(14, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(CreditTransactions::EntryDate).date().not_null())
                    .col(
                        ColumnDef::new(CreditTransactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_credit_transactions_customer")
                            .from(CreditTransactions::Table, CreditTransactions::CustomerId)
                            .to(Customers::Table, Customers::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_credit_transactions_sale")
                            .from(CreditTransactions::Table, CreditTransactions::SaleId)
                            .to(Sales::Table, Sales::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_credit_transactions_customer")
                    .table(CreditTransactions::Table)
                    .col(CreditTransactions::CustomerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SupplierTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SupplierTransactions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SupplierTransactions::SupplierId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SupplierTransactions::PurchaseInvoice).string())
                    .col(
                        ColumnDef::new(SupplierTransactions::EntryType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SupplierTransactions::Amount)
                            .decimal_len(14, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SupplierTransactions::AmountPaid)
                            .decimal_len(14, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SupplierTransactions::AmountDue)
                            .decimal_len(14, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SupplierTransactions::Status)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(SupplierTransactions::Method).string_len(16))
                    .col(
                        ColumnDef::new(SupplierTransactions::IsAdvance)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(SupplierTransactions::RemainingAdvance)
                            .decimal_len(14, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SupplierTransactions::EntryDate)
                            .date()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SupplierTransactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_supplier_transactions_supplier")
                            .from(SupplierTransactions::Table, SupplierTransactions::SupplierId)
                            .to(Suppliers::Table, Suppliers::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_supplier_transactions_supplier")
                    .table(SupplierTransactions::Table)
                    .col(SupplierTransactions::SupplierId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Settings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Settings::Key)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Settings::Value).json_binary().not_null())
                    .col(
                        ColumnDef::new(Settings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Settings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SupplierTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CreditTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Purchases::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SaleItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Sales::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Suppliers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Customers::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Customers {
    Table,
    Id,
    Name,
    Phone,
    GstNumber,
    State,
    StateCode,
    CreditLimit,
    OutstandingBalance,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Suppliers {
    Table,
    Id,
    Name,
    GstNumber,
    OutstandingBalance,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    Name,
    PurchasePrice,
    SellingPrice,
    Stock,
    GstRate,
    HsnCode,
    SupplierId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Sales {
    Table,
    Id,
    InvoiceNumber,
    CustomerId,
    Subtotal,
    Tax,
    Discount,
    Total,
    AmountPaid,
    AmountDue,
    PaymentMode,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum SaleItems {
    Table,
    Id,
    SaleId,
    ProductId,
    Quantity,
    Price,
    Total,
    HsnCode,
    GstRate,
    Discount,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Purchases {
    Table,
    Id,
    ProductId,
    SupplierId,
    InvoiceNumber,
    QuantityReceived,
    UnitCost,
    TotalCost,
    ReceivedDate,
    CreatedAt,
}

#[derive(DeriveIden)]
enum CreditTransactions {
    Table,
    Id,
    CustomerId,
    SaleId,
    EntryType,
    Amount,
    AmountPaid,
    AmountDue,
    Status,
    Method,
    IsAdvance,
    RemainingAdvance,
    EntryDate,
    CreatedAt,
}

#[derive(DeriveIden)]
enum SupplierTransactions {
    Table,
    Id,
    SupplierId,
    PurchaseInvoice,
    EntryType,
    Amount,
    AmountPaid,
    AmountDue,
    Status,
    Method,
    IsAdvance,
    RemainingAdvance,
    EntryDate,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Settings {
    Table,
    Key,
    Value,
    UpdatedAt,
}
