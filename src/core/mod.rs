//! Core translation chat engine

pub mod config;
pub mod controller;
pub mod engine;
pub mod errors;
pub mod languages;
pub mod loader;
pub mod models;
pub mod nllb;
pub mod session;
