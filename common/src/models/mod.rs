// common/src/models/mod.rs
pub mod principal;
pub mod token;
