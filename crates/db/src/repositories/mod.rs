//! Repository implementations for data access.
//!
//! Repositories implement the capability traits defined in `lexmarket-core`,
//! hiding the `SeaORM` details from the rest of the application.

pub mod posting;

pub use posting::SqlPostingRepository;
