pub mod donation;
pub mod health;
pub mod server;
