pub mod account;
pub mod item;
pub mod types;
