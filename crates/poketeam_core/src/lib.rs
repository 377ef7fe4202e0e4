pub mod core_api;
pub mod creature;
pub mod tier;
