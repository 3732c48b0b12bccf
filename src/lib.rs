pub mod config;
pub mod constants;
pub mod env_state;
pub mod exoclass;
pub mod exoclass_errors;
pub mod input;
pub mod missions;
pub mod projection;
pub mod request;
pub mod results;
pub mod services;
pub mod session;
pub mod transport;
