//! Beheer Kernel Library
//!
//! The authorization module of a multi-module backoffice: module
//! registration over the bus, role-based access control, session tokens,
//! and per-user navigation. The `beheer` binary wires these together.

pub mod bus;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod menu;
pub mod middleware;
pub mod models;
pub mod permissions;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
