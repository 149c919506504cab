// src/lib.rs

//! study-scout library

pub mod error;
#[cfg(feature = "lambda")]
pub mod handler;
pub mod models;
pub mod notify;
pub mod services;
pub mod storage;
pub mod utils;
