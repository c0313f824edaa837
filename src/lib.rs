pub mod app;
pub mod applications;
pub mod auth;
pub mod config;
pub mod dates;
pub mod error;
pub mod events;
pub mod opportunities;
pub mod policy;
pub mod state;
pub mod store;
pub mod users;
