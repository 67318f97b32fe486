pub mod ledger;
pub mod sessions;
