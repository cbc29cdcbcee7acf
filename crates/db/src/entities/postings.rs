//! `SeaORM` Entity for the postings table.
//!
//! `status` and `fee_structure` are stored as plain strings and parsed into
//! their domain enums on read; a value outside the known set surfaces the
//! integrity-fault path instead of panicking.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "postings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub client_email: String,
    pub poster_email: String,
    pub created: DateTimeWithTimeZone,
    pub status: String,
    pub fee_structure: String,
    pub fee_amount: Option<Decimal>,
    pub fee_percentage: Option<Decimal>,
    pub expected_settlement_amount: Option<Decimal>,
    pub settlement_amount: Option<Decimal>,
    pub amount_paid: Option<Decimal>,
    pub paid_on: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
