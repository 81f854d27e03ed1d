// src/lib.rs

//! Flavor Scout Library
//!
//! Watches custard shops' social pages for the daily "flavor of the day"
//! post and turns it into a structured record.

pub mod browser;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod utils;
