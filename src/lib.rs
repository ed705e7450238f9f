pub mod config;
pub mod error;
pub mod pose;
pub mod render;
pub mod tracker;
