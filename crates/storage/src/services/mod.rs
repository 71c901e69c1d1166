pub mod conflict;
pub mod credit_ledger;
pub mod eligibility;
pub mod lifecycle;
pub mod warnings;
