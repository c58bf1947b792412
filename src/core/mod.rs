//! Core module - Application state, configuration, errors and events

pub mod config;
pub mod error;
pub mod events;
pub mod state;
