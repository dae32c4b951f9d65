pub mod catalog;
pub mod config;
pub mod controller;
pub mod error;
pub mod http_client;
pub mod render;
pub mod stats_fetch;
pub mod tables;
pub mod telegram;
