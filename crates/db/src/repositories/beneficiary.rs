//! Beneficiary repository.
//!
//! Payees are scoped to an account and carry no balance semantics.

use ledgerline_shared::types::{AccountId, BeneficiaryId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::beneficiaries;

/// Input for adding a beneficiary.
#[derive(Debug, Clone)]
pub struct NewBeneficiary {
    /// Owning account.
    pub account_id: AccountId,
    /// Payee name.
    pub beneficiary_name: String,
    /// Payee account number.
    pub account_number: String,
    /// Payee IFSC code.
    pub ifsc_code: String,
    /// Payee bank name.
    pub bank_name: String,
    /// Optional short name.
    pub nickname: Option<String>,
}

/// Beneficiary repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct BeneficiaryRepository {
    db: DatabaseConnection,
}

impl BeneficiaryRepository {
    /// Creates a new beneficiary repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Adds an active beneficiary.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails, including when the payee is
    /// already registered for the account.
    pub async fn create(&self, input: NewBeneficiary) -> Result<beneficiaries::Model, DbErr> {
        let beneficiary = beneficiaries::ActiveModel {
            id: Set(BeneficiaryId::new().into_inner()),
            account_id: Set(input.account_id.into_inner()),
            beneficiary_name: Set(input.beneficiary_name),
            account_number: Set(input.account_number),
            ifsc_code: Set(input.ifsc_code),
            bank_name: Set(input.bank_name),
            nickname: Set(input.nickname),
            is_active: Set(true),
            created_at: Set(chrono::Utc::now().into()),
        };

        beneficiary.insert(&self.db).await
    }

    /// Lists an account's beneficiaries by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_account(
        &self,
        account_id: AccountId,
        active_only: bool,
    ) -> Result<Vec<beneficiaries::Model>, DbErr> {
        let mut query = beneficiaries::Entity::find()
            .filter(beneficiaries::Column::AccountId.eq(account_id.into_inner()));
        if active_only {
            query = query.filter(beneficiaries::Column::IsActive.eq(true));
        }

        query
            .order_by_asc(beneficiaries::Column::BeneficiaryName)
            .all(&self.db)
            .await
    }

    /// Activates or deactivates a beneficiary. Returns false if it does not
    /// exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn set_active(&self, id: BeneficiaryId, is_active: bool) -> Result<bool, DbErr> {
        let result = beneficiaries::Entity::update_many()
            .col_expr(
                beneficiaries::Column::IsActive,
                sea_orm::sea_query::Expr::value(is_active),
            )
            .filter(beneficiaries::Column::Id.eq(id.into_inner()))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Deletes a beneficiary. Returns false if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn delete(&self, id: BeneficiaryId) -> Result<bool, DbErr> {
        let result = beneficiaries::Entity::delete_by_id(id.into_inner())
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }
}
