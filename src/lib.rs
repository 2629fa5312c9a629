pub mod app;
pub mod calendar;
pub mod cli;
pub mod config;
pub mod diary;
pub mod selection;
pub mod stats;
pub mod storage;
pub mod ui;

pub use config::{AppConfig, ConfigLoader, ConfigPaths};
