#![doc = "The `taskgate` library crate."]
#![doc = ""]
#![doc = "Credential storage, password hashing, stateless session tokens and the"]
#![doc = "authorization gate in front of an owner-scoped task API. The binary"]
#![doc = "(`main.rs`) wires these into an actix-web server backed by PostgreSQL."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;

pub use config::Config;
pub use error::AppError;
pub use state::AppState;
