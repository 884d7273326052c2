pub mod auth;
pub mod constants;
pub mod permissions;
pub mod tracing;
pub mod workspace;
