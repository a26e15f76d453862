pub mod app;
pub mod config;
mod effects;
mod input;
mod render;
