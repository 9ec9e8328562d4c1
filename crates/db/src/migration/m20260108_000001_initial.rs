//! Initial database migration.
//!
//! Creates the enums, tables and indexes the reporting queries read from.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: CURRENCIES, COMPANIES & MASTER DATA
        // ============================================================
        db.execute_unprepared(CURRENCIES_SQL).await?;
        db.execute_unprepared(COMPANIES_SQL).await?;
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(DIMENSIONS_SQL).await?;

        // ============================================================
        // PART 3: JOURNAL ENTRIES
        // ============================================================
        db.execute_unprepared(MOVES_SQL).await?;
        db.execute_unprepared(MOVE_LINES_SQL).await?;

        // ============================================================
        // PART 4: REPORT DEFINITIONS
        // ============================================================
        db.execute_unprepared(FINANCIAL_REPORT_LINES_SQL).await?;

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

const ENUMS_SQL: &str = r"
-- Journal entry state
CREATE TYPE move_state AS ENUM ('draft', 'posted');

-- Report line kinds
CREATE TYPE report_line_type AS ENUM (
    'sum',
    'accounts',
    'account_type',
    'account_report'
);

-- Report line styles
CREATE TYPE report_line_style AS ENUM (
    'automatic',
    'main_title',
    'title',
    'subtitle',
    'normal',
    'italic',
    'smallest'
);

-- Account detail under a report line
CREATE TYPE display_detail AS ENUM (
    'no_detail',
    'detail_flat',
    'detail_with_hierarchy'
);

-- Currency symbol placement
CREATE TYPE currency_position AS ENUM ('before', 'after');
";

const CURRENCIES_SQL: &str = r"
CREATE TABLE currencies (
    code CHAR(3) PRIMARY KEY,
    name VARCHAR(100) NOT NULL,
    symbol VARCHAR(10) NOT NULL,
    position currency_position NOT NULL DEFAULT 'before',
    rounding NUMERIC(12, 6) NOT NULL DEFAULT 0.01,
    CONSTRAINT chk_currency_code CHECK (code ~ '^[A-Z]{3}$'),
    CONSTRAINT chk_currency_rounding CHECK (rounding > 0)
);

INSERT INTO currencies (code, name, symbol, position, rounding) VALUES
    ('USD', 'US Dollar', '$', 'before', 0.01),
    ('EUR', 'Euro', '€', 'after', 0.01),
    ('GBP', 'Pound Sterling', '£', 'before', 0.01),
    ('CHF', 'Swiss Franc', 'CHF', 'before', 0.01),
    ('IDR', 'Indonesian Rupiah', 'Rp', 'before', 1),
    ('JPY', 'Japanese Yen', '¥', 'before', 1),
    ('MYR', 'Malaysian Ringgit', 'RM', 'before', 0.01),
    ('SGD', 'Singapore Dollar', 'S$', 'before', 0.01),
    ('THB', 'Thai Baht', '฿', 'before', 0.01);
";

const COMPANIES_SQL: &str = r"
CREATE TABLE companies (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    currency_code CHAR(3) REFERENCES currencies(code),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE account_types (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL UNIQUE
);

CREATE TABLE accounts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    code VARCHAR(64) NOT NULL,
    name VARCHAR(255) NOT NULL,
    account_type_id UUID REFERENCES account_types(id),
    currency_code CHAR(3) REFERENCES currencies(code),
    is_active BOOLEAN NOT NULL DEFAULT true,
    UNIQUE (company_id, code)
);

CREATE INDEX idx_accounts_company ON accounts(company_id) WHERE is_active = true;
CREATE INDEX idx_accounts_type ON accounts(account_type_id) WHERE account_type_id IS NOT NULL;

CREATE TABLE account_tags (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL
);

CREATE TABLE account_account_tags (
    account_id UUID NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
    account_tag_id UUID NOT NULL REFERENCES account_tags(id) ON DELETE CASCADE,
    PRIMARY KEY (account_id, account_tag_id)
);
";

const DIMENSIONS_SQL: &str = r"
CREATE TABLE journals (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    code VARCHAR(16) NOT NULL,
    name VARCHAR(255) NOT NULL,
    UNIQUE (company_id, code)
);

CREATE TABLE analytic_accounts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL
);

CREATE TABLE analytic_tags (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_id UUID REFERENCES companies(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL
);

CREATE TABLE operating_units (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    code VARCHAR(32) NOT NULL,
    name VARCHAR(255) NOT NULL,
    UNIQUE (company_id, code)
);
";

const MOVES_SQL: &str = r"
CREATE TABLE moves (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    journal_id UUID NOT NULL REFERENCES journals(id),
    name VARCHAR(100) NOT NULL,
    date DATE NOT NULL,
    state move_state NOT NULL DEFAULT 'draft',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_moves_company_date ON moves(company_id, date);
CREATE INDEX idx_moves_state ON moves(company_id, state);
";

const MOVE_LINES_SQL: &str = r"
CREATE TABLE move_lines (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    move_id UUID NOT NULL REFERENCES moves(id) ON DELETE CASCADE,
    account_id UUID NOT NULL REFERENCES accounts(id),
    journal_id UUID NOT NULL REFERENCES journals(id),
    date DATE NOT NULL,
    name TEXT,
    reference VARCHAR(255),
    partner_name VARCHAR(255),
    debit NUMERIC(19, 4) NOT NULL DEFAULT 0 CHECK (debit >= 0),
    credit NUMERIC(19, 4) NOT NULL DEFAULT 0 CHECK (credit >= 0),
    balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    analytic_account_id UUID REFERENCES analytic_accounts(id),
    operating_unit_id UUID REFERENCES operating_units(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT move_lines_balance_check CHECK (balance = debit - credit)
);

CREATE INDEX idx_move_lines_company_date ON move_lines(company_id, date);
CREATE INDEX idx_move_lines_account_date ON move_lines(account_id, date);
CREATE INDEX idx_move_lines_move ON move_lines(move_id);

CREATE TABLE move_line_analytic_tags (
    move_line_id UUID NOT NULL REFERENCES move_lines(id) ON DELETE CASCADE,
    analytic_tag_id UUID NOT NULL REFERENCES analytic_tags(id) ON DELETE CASCADE,
    PRIMARY KEY (move_line_id, analytic_tag_id)
);

CREATE INDEX idx_move_line_tags_tag ON move_line_analytic_tags(analytic_tag_id);
";

const FINANCIAL_REPORT_LINES_SQL: &str = r"
CREATE TABLE financial_report_lines (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    parent_id UUID REFERENCES financial_report_lines(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    sequence INTEGER NOT NULL DEFAULT 0,
    report_type report_line_type NOT NULL DEFAULT 'sum',
    report_reference_id UUID REFERENCES financial_report_lines(id) ON DELETE SET NULL,
    sign SMALLINT NOT NULL DEFAULT 1 CHECK (sign IN (-1, 1)),
    style report_line_style NOT NULL DEFAULT 'automatic',
    display_detail display_detail NOT NULL DEFAULT 'detail_flat'
);

CREATE INDEX idx_report_lines_parent ON financial_report_lines(parent_id);

CREATE TABLE report_line_accounts (
    report_line_id UUID NOT NULL REFERENCES financial_report_lines(id) ON DELETE CASCADE,
    account_id UUID NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
    PRIMARY KEY (report_line_id, account_id)
);

CREATE TABLE report_line_account_types (
    report_line_id UUID NOT NULL REFERENCES financial_report_lines(id) ON DELETE CASCADE,
    account_type_id UUID NOT NULL REFERENCES account_types(id) ON DELETE CASCADE,
    PRIMARY KEY (report_line_id, account_type_id)
);
";

const DROP_ALL_SQL: &str = r"
-- Drop tables (reverse order of creation)
DROP TABLE IF EXISTS report_line_account_types CASCADE;
DROP TABLE IF EXISTS report_line_accounts CASCADE;
DROP TABLE IF EXISTS financial_report_lines CASCADE;
DROP TABLE IF EXISTS move_line_analytic_tags CASCADE;
DROP TABLE IF EXISTS move_lines CASCADE;
DROP TABLE IF EXISTS moves CASCADE;
DROP TABLE IF EXISTS operating_units CASCADE;
DROP TABLE IF EXISTS analytic_tags CASCADE;
DROP TABLE IF EXISTS analytic_accounts CASCADE;
DROP TABLE IF EXISTS journals CASCADE;
DROP TABLE IF EXISTS account_account_tags CASCADE;
DROP TABLE IF EXISTS account_tags CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;
DROP TABLE IF EXISTS account_types CASCADE;
DROP TABLE IF EXISTS companies CASCADE;
DROP TABLE IF EXISTS currencies CASCADE;

-- Drop enums
DROP TYPE IF EXISTS currency_position CASCADE;
DROP TYPE IF EXISTS display_detail CASCADE;
DROP TYPE IF EXISTS report_line_style CASCADE;
DROP TYPE IF EXISTS report_line_type CASCADE;
DROP TYPE IF EXISTS move_state CASCADE;
";
