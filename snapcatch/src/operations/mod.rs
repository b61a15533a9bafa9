pub mod catchup;
pub mod reconcile;
