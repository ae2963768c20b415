pub mod ledger;
pub mod position;
pub mod quote;
pub mod summary;
