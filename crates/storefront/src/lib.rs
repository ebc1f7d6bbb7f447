//! Autohaus Storefront library.
//!
//! This crate provides the storefront functionality as a library,
//! allowing it to be tested and reused by the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod mappers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
