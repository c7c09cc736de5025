//! Core library components.
//!
//! This module contains the reusable logic for provisioning secrets and
//! building deployment artifacts. Nothing in here prints to the terminal.

pub mod build;
pub mod config;
pub mod constants;
pub mod domain;
pub mod provision;
pub mod store;
pub mod types;
pub mod validation;
