//! `SeaORM` entity definitions.

pub mod postings;
