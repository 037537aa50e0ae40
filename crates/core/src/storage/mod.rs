pub mod crypto;
pub mod envelope;
pub mod manager;
