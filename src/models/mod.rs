pub mod activity;
pub mod summary;
