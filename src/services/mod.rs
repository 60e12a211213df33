pub mod ledger;
pub mod summary;
