//! Initial database migration.
//!
//! Creates all enums and tables for the payment engine: trade documents,
//! payment terms and stages, schedule items, payments, allocations, the
//! state-transition audit log, reference sequences, and exchange rates.

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
        // PART 2: PAYMENT TERMS
        // ============================================================
        db.execute_unprepared(PAYMENT_TERMS_SQL).await?;
        db.execute_unprepared(PAYMENT_TERM_STAGES_SQL).await?;

        // ============================================================
        // PART 3: TRADE DOCUMENTS & SCHEDULE
        // ============================================================
        db.execute_unprepared(TRADE_DOCUMENTS_SQL).await?;
        db.execute_unprepared(SCHEDULE_ITEMS_SQL).await?;

        // ============================================================
        // PART 4: PAYMENTS & ALLOCATIONS
        // ============================================================
        db.execute_unprepared(PAYMENTS_SQL).await?;
        db.execute_unprepared(PAYMENT_ALLOCATIONS_SQL).await?;

        // ============================================================
        // PART 5: AUDIT LOG & SEQUENCES
        // ============================================================
        db.execute_unprepared(STATE_TRANSITIONS_SQL).await?;
        db.execute_unprepared(REFERENCE_SEQUENCES_SQL).await?;

        // ============================================================
        // PART 6: EXCHANGE RATES
        // ============================================================
        db.execute_unprepared(EXCHANGE_RATES_SQL).await?;

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
-- Trade document type
CREATE TYPE document_type AS ENUM (
    'proforma_invoice',
    'purchase_order',
    'shipment'
);

-- Trade document status
CREATE TYPE trade_status AS ENUM (
    'draft',
    'sent',
    'confirmed',
    'in_production',
    'shipped',
    'completed',
    'cancelled'
);

-- Payment direction
CREATE TYPE payment_direction AS ENUM ('inbound', 'outbound');

-- Payment status
CREATE TYPE payment_status AS ENUM (
    'pending_approval',
    'approved',
    'rejected',
    'cancelled'
);

-- Schedule item status
CREATE TYPE schedule_item_status AS ENUM (
    'pending',
    'due',
    'paid',
    'overdue',
    'waived'
);

-- Schedule stage calculation base
CREATE TYPE calculation_base AS ENUM (
    'order_date',
    'po_date',
    'invoice_date',
    'before_production',
    'before_shipment',
    'after_shipment'
);

-- Reference sequence kind
CREATE TYPE reference_kind AS ENUM (
    'inquiry',
    'quotation',
    'proforma_invoice',
    'purchase_order',
    'shipment',
    'payment'
);

-- Exchange rate approval status
CREATE TYPE rate_status AS ENUM ('pending', 'approved');

-- Exchange rate source
CREATE TYPE rate_source AS ENUM ('manual', 'api');
";

const PAYMENT_TERMS_SQL: &str = r"
CREATE TABLE payment_terms (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL UNIQUE,
    description TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const PAYMENT_TERM_STAGES_SQL: &str = r"
CREATE TABLE payment_term_stages (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    payment_term_id UUID NOT NULL REFERENCES payment_terms(id) ON DELETE CASCADE,
    percentage SMALLINT NOT NULL CHECK (percentage >= 0 AND percentage <= 100),
    days INTEGER NOT NULL DEFAULT 0 CHECK (days >= 0),
    calculation_base calculation_base NOT NULL,
    sort_order SMALLINT NOT NULL DEFAULT 0
);

CREATE INDEX idx_payment_term_stages_term ON payment_term_stages(payment_term_id, sort_order);
";

const TRADE_DOCUMENTS_SQL: &str = r"
CREATE TABLE trade_documents (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    document_type document_type NOT NULL,
    reference VARCHAR(64) NOT NULL UNIQUE,
    counterparty VARCHAR(255) NOT NULL,
    total_amount BIGINT NOT NULL CHECK (total_amount >= 0),
    currency CHAR(3) NOT NULL,
    direction payment_direction NOT NULL,
    status trade_status NOT NULL DEFAULT 'draft',
    issue_date DATE,
    payment_term_id UUID REFERENCES payment_terms(id) ON DELETE SET NULL,
    paid_amount BIGINT NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_trade_documents_type_status ON trade_documents(document_type, status);
";

const SCHEDULE_ITEMS_SQL: &str = r"
CREATE TABLE schedule_items (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    document_id UUID NOT NULL REFERENCES trade_documents(id) ON DELETE CASCADE,
    payment_term_stage_id UUID REFERENCES payment_term_stages(id) ON DELETE SET NULL,
    label VARCHAR(255) NOT NULL,
    percentage SMALLINT NOT NULL CHECK (percentage >= 0 AND percentage <= 100),
    amount BIGINT NOT NULL,
    currency CHAR(3) NOT NULL,
    calculation_base calculation_base NOT NULL,
    due_date DATE,
    status schedule_item_status NOT NULL DEFAULT 'pending',
    is_blocking BOOLEAN NOT NULL DEFAULT false,
    sort_order SMALLINT NOT NULL DEFAULT 0,
    waived_by UUID,
    waived_at TIMESTAMPTZ,
    waive_reason TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_schedule_items_document ON schedule_items(document_id, sort_order);
CREATE INDEX idx_schedule_items_blocking ON schedule_items(document_id, is_blocking)
    WHERE status NOT IN ('paid', 'waived');
";

const PAYMENTS_SQL: &str = r"
CREATE TABLE payments (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    reference VARCHAR(64) NOT NULL UNIQUE,
    direction payment_direction NOT NULL,
    amount BIGINT NOT NULL CHECK (amount > 0),
    currency CHAR(3) NOT NULL,
    exchange_rate NUMERIC(20, 10),
    status payment_status NOT NULL DEFAULT 'pending_approval',
    notes TEXT,
    approved_by UUID,
    decided_at TIMESTAMPTZ,
    created_by UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_payments_status ON payments(status);
";

const PAYMENT_ALLOCATIONS_SQL: &str = r"
CREATE TABLE payment_allocations (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    payment_id UUID NOT NULL REFERENCES payments(id) ON DELETE RESTRICT,
    schedule_item_id UUID NOT NULL REFERENCES schedule_items(id) ON DELETE RESTRICT,
    document_id UUID NOT NULL REFERENCES trade_documents(id) ON DELETE RESTRICT,
    amount BIGINT NOT NULL CHECK (amount > 0),
    exchange_rate NUMERIC(20, 10) NOT NULL,
    amount_in_document_currency BIGINT NOT NULL,
    rate_fallback BOOLEAN NOT NULL DEFAULT false,
    created_by UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_payment_allocations_payment ON payment_allocations(payment_id);
CREATE INDEX idx_payment_allocations_item ON payment_allocations(schedule_item_id);
CREATE INDEX idx_payment_allocations_document ON payment_allocations(document_id);
";

const STATE_TRANSITIONS_SQL: &str = r"
CREATE TABLE state_transitions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    entity_kind VARCHAR(64) NOT NULL,
    entity_id UUID NOT NULL,
    from_status VARCHAR(64) NOT NULL,
    to_status VARCHAR(64) NOT NULL,
    notes TEXT,
    metadata JSONB,
    actor_id UUID,
    occurred_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_state_transitions_entity ON state_transitions(entity_kind, entity_id, occurred_at);
CREATE INDEX idx_state_transitions_actor ON state_transitions(actor_id, occurred_at);
";

const REFERENCE_SEQUENCES_SQL: &str = r"
CREATE TABLE reference_sequences (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    kind reference_kind NOT NULL,
    year INTEGER NOT NULL,
    next_number BIGINT NOT NULL DEFAULT 1 CHECK (next_number >= 1),
    UNIQUE (kind, year)
);
";

const EXCHANGE_RATES_SQL: &str = r"
CREATE TABLE exchange_rates (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    from_currency CHAR(3) NOT NULL,
    to_currency CHAR(3) NOT NULL,
    rate NUMERIC(20, 10) NOT NULL CHECK (rate > 0),
    effective_date DATE NOT NULL,
    status rate_status NOT NULL DEFAULT 'pending',
    source rate_source NOT NULL DEFAULT 'manual',
    source_reference VARCHAR(255),
    created_by UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CHECK (from_currency <> to_currency),
    UNIQUE (from_currency, to_currency, effective_date)
);

CREATE INDEX idx_exchange_rates_lookup ON exchange_rates(from_currency, to_currency, effective_date)
    WHERE status = 'approved';
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS exchange_rates;
DROP TABLE IF EXISTS reference_sequences;
DROP TABLE IF EXISTS state_transitions;
DROP TABLE IF EXISTS payment_allocations;
DROP TABLE IF EXISTS payments;
DROP TABLE IF EXISTS schedule_items;
DROP TABLE IF EXISTS trade_documents;
DROP TABLE IF EXISTS payment_term_stages;
DROP TABLE IF EXISTS payment_terms;

DROP TYPE IF EXISTS rate_source;
DROP TYPE IF EXISTS rate_status;
DROP TYPE IF EXISTS reference_kind;
DROP TYPE IF EXISTS calculation_base;
DROP TYPE IF EXISTS schedule_item_status;
DROP TYPE IF EXISTS payment_status;
DROP TYPE IF EXISTS payment_direction;
DROP TYPE IF EXISTS trade_status;
DROP TYPE IF EXISTS document_type;
";
