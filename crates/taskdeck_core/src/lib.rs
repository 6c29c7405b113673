pub mod auth;
pub mod config;
pub mod error;
pub mod filter;
pub mod model;
pub mod service;
pub mod storage;
