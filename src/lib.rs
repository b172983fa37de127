//! Taskdeck library
//!
//! This module exports the core components for testing and integration.

pub mod config;
pub mod db;
pub mod error;
pub mod types;
pub mod web;
