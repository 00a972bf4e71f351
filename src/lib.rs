// src/lib.rs

//! Lambda Console Library

pub mod backend;
pub mod codec;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;
