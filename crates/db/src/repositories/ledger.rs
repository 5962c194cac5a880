//! `SeaORM` implementation of the ledger store.

use chrono::{NaiveDate, NaiveTime, Utc};
use ledgerline_core::ledger::{
    DebitCreditColumns, LedgerStore, LedgerTransaction, NewTransaction, StoreError,
    TransactionDetails, TransactionPatch, TransactionStatus,
};
use ledgerline_shared::types::{AccountId, TransactionId};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, Condition, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Select, Set,
};
use uuid::Uuid;

use crate::entities::{accounts, user_transactions};

fn backend(err: DbErr) -> StoreError {
    StoreError::backend(err.to_string())
}

/// Converts a stored row into the domain type.
///
/// # Errors
///
/// Returns `StoreError::Backend` if the status column holds an unknown value.
pub fn to_domain(model: user_transactions::Model) -> Result<LedgerTransaction, StoreError> {
    let status = model
        .status
        .parse::<TransactionStatus>()
        .map_err(StoreError::backend)?;

    Ok(LedgerTransaction {
        id: TransactionId::from_uuid(model.id),
        account_id: AccountId::from_uuid(model.account_id),
        reference: model.reference,
        transaction_date: model.transaction_date,
        transaction_time: model.transaction_time,
        transaction_type: model.transaction_type,
        amount: model.amount,
        columns: DebitCreditColumns {
            debit: model.debit,
            credit: model.credit,
        },
        balance_after: model.balance_after,
        status,
        details: TransactionDetails {
            narration: model.narration,
            description: model.description,
            beneficiary_name: model.beneficiary_name,
            beneficiary_account_number: model.beneficiary_account_number,
            beneficiary_ifsc: model.beneficiary_ifsc,
            beneficiary_bank_name: model.beneficiary_bank_name,
            beneficiary_bank_code: model.beneficiary_bank_code,
            remarks: model.remarks,
            reference_number: model.reference_number,
            category: model.category,
            is_within_bank: model.is_within_bank,
        },
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

/// Builds the insert model for a new row.
#[must_use]
pub fn new_active_model(row: NewTransaction) -> user_transactions::ActiveModel {
    let now = Utc::now().into();
    let details = row.details;

    user_transactions::ActiveModel {
        id: Set(TransactionId::new().into_inner()),
        account_id: Set(row.account_id.into_inner()),
        reference: Set(row.reference),
        transaction_date: Set(row.transaction_date),
        transaction_time: Set(row.transaction_time),
        transaction_type: Set(row.transaction_type),
        amount: Set(row.amount),
        debit: Set(row.columns.debit),
        credit: Set(row.columns.credit),
        balance_after: Set(row.balance_after),
        status: Set(row.status.as_str().to_string()),
        narration: Set(details.narration),
        description: Set(details.description),
        beneficiary_name: Set(details.beneficiary_name),
        beneficiary_account_number: Set(details.beneficiary_account_number),
        beneficiary_ifsc: Set(details.beneficiary_ifsc),
        beneficiary_bank_name: Set(details.beneficiary_bank_name),
        beneficiary_bank_code: Set(details.beneficiary_bank_code),
        remarks: Set(details.remarks),
        reference_number: Set(details.reference_number),
        category: Set(details.category),
        is_within_bank: Set(details.is_within_bank),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

/// Builds the update model for a partial patch. Untouched columns stay
/// `NotSet`.
#[must_use]
pub fn patch_active_model(id: TransactionId, patch: &TransactionPatch) -> user_transactions::ActiveModel {
    let mut model = user_transactions::ActiveModel {
        id: ActiveValue::Unchanged(id.into_inner()),
        updated_at: Set(Utc::now().into()),
        ..Default::default()
    };

    if let Some(label) = &patch.transaction_type {
        model.transaction_type = Set(label.clone());
    }
    if let Some(amount) = patch.amount {
        model.amount = Set(amount);
    }
    if let Some(columns) = patch.columns {
        model.debit = Set(columns.debit);
        model.credit = Set(columns.credit);
    }
    if let Some(status) = patch.status {
        model.status = Set(status.as_str().to_string());
    }
    if let Some(balance) = patch.balance_after {
        model.balance_after = Set(balance);
    }
    if let Some(narration) = &patch.narration {
        model.narration = Set(Some(narration.clone()));
    }
    if let Some(description) = &patch.description {
        model.description = Set(description.clone());
    }
    if let Some(name) = &patch.beneficiary_name {
        model.beneficiary_name = Set(Some(name.clone()));
    }
    if let Some(reference) = &patch.reference_number {
        model.reference_number = Set(Some(reference.clone()));
    }

    model
}

fn ledger_order(
    query: Select<user_transactions::Entity>,
) -> Select<user_transactions::Entity> {
    query
        .order_by_asc(user_transactions::Column::TransactionDate)
        .order_by_asc(user_transactions::Column::TransactionTime)
        .order_by_asc(user_transactions::Column::CreatedAt)
        .order_by_asc(user_transactions::Column::Id)
}

fn reverse_ledger_order(
    query: Select<user_transactions::Entity>,
) -> Select<user_transactions::Entity> {
    query
        .order_by_desc(user_transactions::Column::TransactionDate)
        .order_by_desc(user_transactions::Column::TransactionTime)
        .order_by_desc(user_transactions::Column::CreatedAt)
        .order_by_desc(user_transactions::Column::Id)
}

/// Ledger store backed by Postgres through `SeaORM`.
#[derive(Debug, Clone)]
pub struct SeaOrmLedgerStore {
    db: DatabaseConnection,
}

impl SeaOrmLedgerStore {
    /// Creates a new ledger store.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn for_account(account_id: AccountId) -> Select<user_transactions::Entity> {
        user_transactions::Entity::find()
            .filter(user_transactions::Column::AccountId.eq(account_id.into_inner()))
    }

    fn uuids(ids: &[TransactionId]) -> Vec<Uuid> {
        ids.iter().map(|id| id.into_inner()).collect()
    }
}

impl LedgerStore for SeaOrmLedgerStore {
    async fn account_balance(&self, account_id: AccountId) -> Result<Option<Decimal>, StoreError> {
        let account = accounts::Entity::find_by_id(account_id.into_inner())
            .one(&self.db)
            .await
            .map_err(backend)?;

        Ok(account.map(|a| a.current_balance))
    }

    async fn set_account_balance(
        &self,
        account_id: AccountId,
        balance: Decimal,
    ) -> Result<(), StoreError> {
        let result = accounts::Entity::update_many()
            .col_expr(accounts::Column::CurrentBalance, Expr::value(balance))
            .filter(accounts::Column::Id.eq(account_id.into_inner()))
            .exec(&self.db)
            .await
            .map_err(backend)?;

        if result.rows_affected == 0 {
            return Err(StoreError::NotFound {
                entity: "account",
                id: account_id.into_inner(),
            });
        }
        Ok(())
    }

    async fn first_transaction(
        &self,
        account_id: AccountId,
    ) -> Result<Option<LedgerTransaction>, StoreError> {
        ledger_order(Self::for_account(account_id))
            .one(&self.db)
            .await
            .map_err(backend)?
            .map(to_domain)
            .transpose()
    }

    async fn latest_transaction_before(
        &self,
        account_id: AccountId,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<Option<LedgerTransaction>, StoreError> {
        let earlier = Condition::any()
            .add(user_transactions::Column::TransactionDate.lt(date))
            .add(
                Condition::all()
                    .add(user_transactions::Column::TransactionDate.eq(date))
                    .add(user_transactions::Column::TransactionTime.lt(time)),
            );

        reverse_ledger_order(Self::for_account(account_id).filter(earlier))
            .one(&self.db)
            .await
            .map_err(backend)?
            .map(to_domain)
            .transpose()
    }

    async fn ordered_transactions(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<LedgerTransaction>, StoreError> {
        ledger_order(Self::for_account(account_id))
            .all(&self.db)
            .await
            .map_err(backend)?
            .into_iter()
            .map(to_domain)
            .collect()
    }

    async fn count_transactions(&self, account_id: AccountId) -> Result<u64, StoreError> {
        Self::for_account(account_id)
            .count(&self.db)
            .await
            .map_err(backend)
    }

    async fn find_transaction(
        &self,
        id: TransactionId,
    ) -> Result<Option<LedgerTransaction>, StoreError> {
        user_transactions::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(backend)?
            .map(to_domain)
            .transpose()
    }

    async fn find_transactions(
        &self,
        ids: &[TransactionId],
    ) -> Result<Vec<LedgerTransaction>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        user_transactions::Entity::find()
            .filter(user_transactions::Column::Id.is_in(Self::uuids(ids)))
            .all(&self.db)
            .await
            .map_err(backend)?
            .into_iter()
            .map(to_domain)
            .collect()
    }

    async fn insert_transaction(&self, row: NewTransaction) -> Result<LedgerTransaction, StoreError> {
        let model = new_active_model(row)
            .insert(&self.db)
            .await
            .map_err(backend)?;
        to_domain(model)
    }

    async fn update_transaction(
        &self,
        id: TransactionId,
        patch: &TransactionPatch,
    ) -> Result<(), StoreError> {
        match user_transactions::Entity::update(patch_active_model(id, patch))
            .exec(&self.db)
            .await
        {
            Ok(_) => Ok(()),
            Err(DbErr::RecordNotUpdated) => Err(StoreError::NotFound {
                entity: "transaction",
                id: id.into_inner(),
            }),
            Err(e) => Err(backend(e)),
        }
    }

    async fn delete_transaction(&self, id: TransactionId) -> Result<bool, StoreError> {
        let result = user_transactions::Entity::delete_by_id(id.into_inner())
            .exec(&self.db)
            .await
            .map_err(backend)?;

        Ok(result.rows_affected > 0)
    }

    async fn delete_transactions(&self, ids: &[TransactionId]) -> Result<u64, StoreError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = user_transactions::Entity::delete_many()
            .filter(user_transactions::Column::Id.is_in(Self::uuids(ids)))
            .exec(&self.db)
            .await
            .map_err(backend)?;

        Ok(result.rows_affected)
    }
}
