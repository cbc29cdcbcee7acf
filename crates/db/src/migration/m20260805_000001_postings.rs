//! Postings migration.
//!
//! Creates the postings table for job records and their payment state.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(POSTINGS_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DROP TABLE IF EXISTS postings CASCADE;")
            .await?;
        Ok(())
    }
}

const POSTINGS_SQL: &str = r"
-- Postings table: job records and their unpaid -> paid state
CREATE TABLE postings (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    title VARCHAR(100) NOT NULL,
    description VARCHAR(4000) NOT NULL,
    client_email VARCHAR(320) NOT NULL,
    poster_email VARCHAR(320) NOT NULL,
    created TIMESTAMPTZ NOT NULL DEFAULT now(),
    status VARCHAR(16) NOT NULL DEFAULT 'unpaid',
    fee_structure VARCHAR(32) NOT NULL,
    fee_amount NUMERIC(19, 4),
    fee_percentage NUMERIC(7, 6),
    expected_settlement_amount NUMERIC(19, 4),
    settlement_amount NUMERIC(19, 4),
    amount_paid NUMERIC(19, 4),
    paid_on TIMESTAMPTZ
);

-- Indexes for the filtered listings by either party
CREATE INDEX idx_postings_client_email ON postings(client_email);
CREATE INDEX idx_postings_poster_email ON postings(poster_email);

-- Indexes for the sort orders offered by the listing endpoint
CREATE INDEX idx_postings_title ON postings(title);
CREATE INDEX idx_postings_created ON postings(created);
";
