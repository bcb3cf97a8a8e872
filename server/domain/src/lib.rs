pub mod models;
pub mod ranking;
pub mod repositories;
pub mod snapshot_builder;
