pub mod crypto;
pub mod links;
pub mod telemetry;
pub mod token;
