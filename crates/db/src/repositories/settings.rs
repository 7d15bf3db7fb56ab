//! Settings repository and the invoice number sequencer.
//!
//! Settings are a key → JSON store. The invoice sequencer keeps an
//! [`InvoiceConfig`] under the `invoice_config` key and advances it with a
//! compare-and-swap: the update is guarded by equality on the previous JSON
//! value, so two transactions racing for the same number cannot both win.
//! The loser gets [`SettingsError::SequenceConflict`] and its enclosing
//! database transaction rolls back.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, Set,
};

use khata_core::invoice::InvoiceConfig;

use crate::entities::settings;

/// Settings key holding the invoice sequence state.
pub const INVOICE_CONFIG_KEY: &str = "invoice_config";

/// Error types for settings operations.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The stored value under a key did not deserialize to the expected shape.
    #[error("Malformed settings value under key '{key}': {source}")]
    Malformed {
        /// Settings key.
        key: String,
        /// Deserialization failure.
        #[source]
        source: serde_json::Error,
    },

    /// Another transaction advanced the invoice sequence first.
    #[error("Invoice sequence advanced concurrently, please retry")]
    SequenceConflict,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Settings repository for the key → JSON store.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    db: DatabaseConnection,
}

impl SettingsRepository {
    /// Creates a new settings repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Gets the raw JSON value under a key, if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, SettingsError> {
        let row = settings::Entity::find_by_id(key).one(&self.db).await?;
        Ok(row.map(|r| r.value))
    }

    /// Upserts the value under a key.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn put(&self, key: &str, value: serde_json::Value) -> Result<(), SettingsError> {
        let now = Utc::now().into();

        let updated = settings::Entity::update_many()
            .col_expr(settings::Column::Value, Expr::value(value.clone()))
            .col_expr(settings::Column::UpdatedAt, Expr::value(now))
            .filter(settings::Column::Key.eq(key))
            .exec(&self.db)
            .await?;

        if updated.rows_affected == 0 {
            let row = settings::ActiveModel {
                key: Set(key.to_string()),
                value: Set(value),
                updated_at: Set(now),
            };
            row.insert(&self.db).await?;
        }

        Ok(())
    }
}

/// Issues the next invoice number inside an open database transaction.
///
/// Reads the sequence state (seeding the default on first use), formats the
/// number the current state would produce, then advances the state with a
/// compare-and-swap on the previous JSON value. Because this runs inside the
/// caller's transaction, a rollback of the sale also returns the number.
///
/// # Errors
///
/// Returns [`SettingsError::SequenceConflict`] if another transaction
/// advanced the sequence between the read and the swap.
pub async fn issue_invoice_number(txn: &DatabaseTransaction) -> Result<String, SettingsError> {
    let now = Utc::now().into();

    let config = match settings::Entity::find_by_id(INVOICE_CONFIG_KEY)
        .one(txn)
        .await?
    {
        Some(row) => {
            serde_json::from_value::<InvoiceConfig>(row.value).map_err(|source| {
                SettingsError::Malformed {
                    key: INVOICE_CONFIG_KEY.to_string(),
                    source,
                }
            })?
        }
        None => {
            let config = InvoiceConfig::default();
            let row = settings::ActiveModel {
                key: Set(INVOICE_CONFIG_KEY.to_string()),
                value: Set(serde_json::to_value(&config).map_err(|source| {
                    SettingsError::Malformed {
                        key: INVOICE_CONFIG_KEY.to_string(),
                        source,
                    }
                })?),
                updated_at: Set(now),
            };
            row.insert(txn).await?;
            config
        }
    };

    let invoice_number = config.format_invoice_number();

    let old_value = serde_json::to_value(&config).map_err(|source| SettingsError::Malformed {
        key: INVOICE_CONFIG_KEY.to_string(),
        source,
    })?;
    let new_value =
        serde_json::to_value(config.advanced()).map_err(|source| SettingsError::Malformed {
            key: INVOICE_CONFIG_KEY.to_string(),
            source,
        })?;

    let swapped = settings::Entity::update_many()
        .col_expr(settings::Column::Value, Expr::value(new_value))
        .col_expr(settings::Column::UpdatedAt, Expr::value(now))
        .filter(settings::Column::Key.eq(INVOICE_CONFIG_KEY))
        .filter(settings::Column::Value.eq(old_value))
        .exec(txn)
        .await?;

    if swapped.rows_affected == 0 {
        return Err(SettingsError::SequenceConflict);
    }

    Ok(invoice_number)
}
