pub mod consumer;
pub mod hub;
pub mod record;
