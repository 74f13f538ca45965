//! Database entities mapped one-to-one onto the persistence tables.

pub mod product;
pub mod purchase;
pub mod sale;
pub mod supplier;
pub mod user;

pub use user::Role;
