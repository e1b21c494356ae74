// src/lib.rs

//! SIRI-SX Disruptions Feed Generator Library

pub mod config;
pub mod error;
pub mod extracts;
pub mod handler;
pub mod models;
pub mod pipeline;
pub mod siri;
pub mod storage;
