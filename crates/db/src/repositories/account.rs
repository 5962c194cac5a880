//! Account repository for onboarding and lookups.
//!
//! Opening an account is the only place besides the recalculation engine
//! that writes `current_balance`.

use ledgerline_shared::types::{AccountId, UserId};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use tracing::info;

use crate::entities::{accounts, users};

/// Errors from account onboarding.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Opening balance below zero.
    #[error("Opening balance must not be negative: {0}")]
    NegativeOpeningBalance(Decimal),

    /// Required onboarding field left blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Account product type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountType {
    /// Savings account.
    Savings,
    /// Current account.
    Current,
}

impl AccountType {
    /// Stored column value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Savings => "SAVINGS",
            Self::Current => "CURRENT",
        }
    }
}

/// Input for onboarding a user with their account.
#[derive(Debug, Clone)]
pub struct OpenAccountInput {
    /// Login name.
    pub username: String,
    /// Bank account number.
    pub account_number: String,
    /// Name on the account.
    pub account_holder_name: String,
    /// Savings or current.
    pub account_type: AccountType,
    /// Balance the ledger starts from.
    pub opening_balance: Decimal,
    /// Customer identifier.
    pub customer_id: String,
    /// Contact email.
    pub email: String,
    /// Contact phone number.
    pub mobile_number: String,
    /// Postal address.
    pub address: Option<String>,
    /// City or branch location.
    pub location: Option<String>,
}

/// Account repository for onboarding and lookups.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a user and their account, seeding the opening balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is invalid or either insert fails;
    /// nothing is kept in that case.
    pub async fn open(&self, input: OpenAccountInput) -> Result<accounts::Model, AccountError> {
        if input.opening_balance < Decimal::ZERO {
            return Err(AccountError::NegativeOpeningBalance(input.opening_balance));
        }
        for (field, value) in [
            ("Username", &input.username),
            ("Account number", &input.account_number),
            ("Account holder name", &input.account_holder_name),
        ] {
            if value.trim().is_empty() {
                return Err(AccountError::MissingField(field));
            }
        }

        let txn = self.db.begin().await?;
        let now = chrono::Utc::now().into();
        let user_id = UserId::new().into_inner();

        let user = users::ActiveModel {
            id: Set(user_id),
            account_number: Set(input.account_number),
            username: Set(input.username),
            status: Set("ACTIVE".to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        user.insert(&txn).await?;

        let account = accounts::ActiveModel {
            id: Set(AccountId::new().into_inner()),
            user_id: Set(user_id),
            account_holder_name: Set(input.account_holder_name),
            account_type: Set(input.account_type.as_str().to_string()),
            current_balance: Set(input.opening_balance),
            customer_id: Set(input.customer_id),
            email: Set(input.email),
            mobile_number: Set(input.mobile_number),
            address: Set(input.address),
            location: Set(input.location),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let account = account.insert(&txn).await?;

        txn.commit().await?;

        info!(
            account_id = %account.id,
            opening_balance = %account.current_balance,
            "Account opened"
        );
        Ok(account)
    }

    /// Finds an account by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: AccountId) -> Result<Option<accounts::Model>, DbErr> {
        accounts::Entity::find_by_id(id.into_inner()).one(&self.db).await
    }

    /// Lists the IDs of every account, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_ids(&self) -> Result<Vec<AccountId>, DbErr> {
        let ids: Vec<uuid::Uuid> = accounts::Entity::find()
            .select_only()
            .column(accounts::Column::Id)
            .order_by_asc(accounts::Column::CreatedAt)
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(ids.into_iter().map(AccountId::from_uuid).collect())
    }
}
