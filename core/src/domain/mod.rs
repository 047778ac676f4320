pub mod common;
pub mod donation;
