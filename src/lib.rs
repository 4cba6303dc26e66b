//! Library crate for tourney-link, exposing modules for binaries and integration tests.

pub mod config;
pub mod dao;
pub mod dto;
pub mod error;
pub mod ipc;
pub mod routes;
pub mod services;
pub mod state;
