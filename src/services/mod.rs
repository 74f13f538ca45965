//! Business logic layer. Handlers validate and translate; these services own
//! the queries, the transaction boundaries, and the invariants.

pub mod orders;
pub mod products;
pub mod reports;
pub mod suppliers;
pub mod users;
