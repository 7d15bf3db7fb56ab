//! Customer and supplier repositories.
//!
//! Parties carry a mutable `outstanding_balance` cache alongside their
//! append-only ledgers. These repositories handle plain CRUD; every balance
//! mutation goes through the sale, purchase, and voucher repositories so the
//! cache and its justifying ledger rows move in one database transaction.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::{customers, suppliers};

/// Error types for party operations.
#[derive(Debug, thiserror::Error)]
pub enum PartyError {
    /// Customer not found.
    #[error("Customer not found: {0}")]
    CustomerNotFound(Uuid),

    /// Supplier not found.
    #[error("Supplier not found: {0}")]
    SupplierNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a customer.
#[derive(Debug, Clone)]
pub struct CreateCustomerInput {
    /// Display name.
    pub name: String,
    /// Optional phone number.
    pub phone: Option<String>,
    /// Optional GST registration number.
    pub gst_number: Option<String>,
    /// Optional state name.
    pub state: Option<String>,
    /// Optional state code.
    pub state_code: Option<String>,
    /// Credit limit; zero when unset.
    pub credit_limit: Decimal,
}

/// Input for creating a supplier.
#[derive(Debug, Clone)]
pub struct CreateSupplierInput {
    /// Display name.
    pub name: String,
    /// Optional GST registration number.
    pub gst_number: Option<String>,
}

/// Customer repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    db: DatabaseConnection,
}

impl CustomerRepository {
    /// Creates a new customer repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a customer with a zero outstanding balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn create(&self, input: CreateCustomerInput) -> Result<customers::Model, PartyError> {
        let now = Utc::now().into();

        let customer = customers::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            phone: Set(input.phone),
            gst_number: Set(input.gst_number),
            state: Set(input.state),
            state_code: Set(input.state_code),
            credit_limit: Set(input.credit_limit),
            outstanding_balance: Set(Decimal::ZERO),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(customer.insert(&self.db).await?)
    }

    /// Finds a customer by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the customer is not found or the query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<customers::Model, PartyError> {
        customers::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(PartyError::CustomerNotFound(id))
    }

    /// Lists all customers by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<customers::Model>, PartyError> {
        Ok(customers::Entity::find()
            .order_by_asc(customers::Column::Name)
            .all(&self.db)
            .await?)
    }
}

/// Supplier repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct SupplierRepository {
    db: DatabaseConnection,
}

impl SupplierRepository {
    /// Creates a new supplier repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a supplier with a zero outstanding balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn create(&self, input: CreateSupplierInput) -> Result<suppliers::Model, PartyError> {
        let now = Utc::now().into();

        let supplier = suppliers::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            gst_number: Set(input.gst_number),
            outstanding_balance: Set(Decimal::ZERO),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(supplier.insert(&self.db).await?)
    }

    /// Finds a supplier by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the supplier is not found or the query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<suppliers::Model, PartyError> {
        suppliers::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(PartyError::SupplierNotFound(id))
    }

    /// Lists all suppliers by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<suppliers::Model>, PartyError> {
        Ok(suppliers::Entity::find()
            .order_by_asc(suppliers::Column::Name)
            .all(&self.db)
            .await?)
    }
}
