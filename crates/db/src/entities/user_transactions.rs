//! `SeaORM` Entity for `user_transactions` table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "user_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub account_id: Uuid,
    #[sea_orm(unique)]
    pub reference: String,
    pub transaction_date: Date,
    pub transaction_time: Time,
    pub transaction_type: String,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub debit: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub credit: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub balance_after: Decimal,
    /// `success`, `pending`, `failed` or `reversed`.
    pub status: String,
    pub narration: Option<String>,
    pub description: String,
    pub beneficiary_name: Option<String>,
    pub beneficiary_account_number: Option<String>,
    pub beneficiary_ifsc: Option<String>,
    pub beneficiary_bank_name: Option<String>,
    pub beneficiary_bank_code: Option<String>,
    pub remarks: Option<String>,
    pub reference_number: Option<String>,
    pub category: Option<String>,
    pub is_within_bank: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id"
    )]
    Accounts,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
