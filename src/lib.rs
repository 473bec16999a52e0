// src/lib.rs

//! Web archive access toolkit for the National Library of New Zealand

pub mod archive;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;
pub mod visualize;
