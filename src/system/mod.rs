pub mod platform;
pub mod snapshot;
