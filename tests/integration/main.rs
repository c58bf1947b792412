//! Integration tests

mod hotkeys;
mod pipeline;
mod translator;
