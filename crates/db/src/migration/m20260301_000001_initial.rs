//! Initial database migration.
//!
//! Creates users, their accounts, the transaction ledger and beneficiaries.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: OWNERS
        // ============================================================
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(ACCOUNTS_SQL).await?;

        // ============================================================
        // PART 2: LEDGER
        // ============================================================
        db.execute_unprepared(USER_TRANSACTIONS_SQL).await?;

        // ============================================================
        // PART 3: PAYEES
        // ============================================================
        db.execute_unprepared(BENEFICIARIES_SQL).await?;

        // ============================================================
        // PART 4: TRIGGERS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    account_number VARCHAR(20) NOT NULL UNIQUE,
    username VARCHAR(100) NOT NULL,
    status VARCHAR(10) NOT NULL DEFAULT 'ACTIVE',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_users_status CHECK (status IN ('ACTIVE', 'INACTIVE', 'BLOCKED'))
);
";

const ACCOUNTS_SQL: &str = r"
-- One account per user; current_balance is a cached projection of the ledger
CREATE TABLE accounts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
    account_holder_name VARCHAR(200) NOT NULL,
    account_type VARCHAR(10) NOT NULL,
    current_balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    customer_id VARCHAR(50) NOT NULL UNIQUE,
    email VARCHAR(255) NOT NULL,
    mobile_number VARCHAR(20) NOT NULL,
    address TEXT,
    location VARCHAR(200),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_accounts_type CHECK (account_type IN ('SAVINGS', 'CURRENT'))
);
";

const USER_TRANSACTIONS_SQL: &str = r"
CREATE TABLE user_transactions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    account_id UUID NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
    reference VARCHAR(64) NOT NULL UNIQUE,
    transaction_date DATE NOT NULL,
    transaction_time TIME NOT NULL,
    transaction_type VARCHAR(50) NOT NULL,
    amount NUMERIC(19, 4) NOT NULL,
    debit NUMERIC(19, 4),
    credit NUMERIC(19, 4),
    balance_after NUMERIC(19, 4) NOT NULL,
    status VARCHAR(10) NOT NULL DEFAULT 'success',
    narration TEXT,
    description TEXT NOT NULL DEFAULT '',
    beneficiary_name VARCHAR(200),
    beneficiary_account_number VARCHAR(34),
    beneficiary_ifsc VARCHAR(11),
    beneficiary_bank_name VARCHAR(200),
    beneficiary_bank_code VARCHAR(20),
    remarks TEXT,
    reference_number VARCHAR(100),
    category VARCHAR(100),
    is_within_bank BOOLEAN NOT NULL DEFAULT false,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_amount_positive CHECK (amount > 0),
    CONSTRAINT chk_status CHECK (status IN ('success', 'pending', 'failed', 'reversed')),
    CONSTRAINT chk_debit_credit_not_both CHECK (debit IS NULL OR credit IS NULL)
);

-- Replay order: (date, time, creation)
CREATE INDEX idx_user_transactions_ledger_order
    ON user_transactions(account_id, transaction_date, transaction_time, created_at);
";

const BENEFICIARIES_SQL: &str = r"
CREATE TABLE beneficiaries (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    account_id UUID NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
    beneficiary_name VARCHAR(200) NOT NULL,
    account_number VARCHAR(34) NOT NULL,
    ifsc_code VARCHAR(11) NOT NULL,
    bank_name VARCHAR(200) NOT NULL,
    nickname VARCHAR(100),
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_beneficiary_per_account UNIQUE (account_id, account_number, ifsc_code)
);

CREATE INDEX idx_beneficiaries_account ON beneficiaries(account_id) WHERE is_active = true;
";

const TRIGGERS_SQL: &str = r"
CREATE OR REPLACE FUNCTION touch_updated_at()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at = now();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_users_updated_at
    BEFORE UPDATE ON users
    FOR EACH ROW EXECUTE FUNCTION touch_updated_at();

CREATE TRIGGER trg_accounts_updated_at
    BEFORE UPDATE ON accounts
    FOR EACH ROW EXECUTE FUNCTION touch_updated_at();

CREATE TRIGGER trg_user_transactions_updated_at
    BEFORE UPDATE ON user_transactions
    FOR EACH ROW EXECUTE FUNCTION touch_updated_at();
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS beneficiaries CASCADE;
DROP TABLE IF EXISTS user_transactions CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;
DROP TABLE IF EXISTS users CASCADE;
DROP FUNCTION IF EXISTS touch_updated_at();
";
