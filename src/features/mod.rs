//! Features - Vertical Feature Slices
//!
//! Each feature owns its controller and the state it drives.

pub mod config;
