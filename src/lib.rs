// Library exports for Shutter
// The binary and the integration tests both build on these modules

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod flash;
pub mod guard;
pub mod routes;
pub mod state;
pub mod uploads;
pub mod views;
