pub mod api;
pub mod app;
pub mod config;
pub mod extractor;
pub mod flow;
pub mod metadata;
pub mod models;
pub mod redirect;
pub mod resolver;
pub mod tracking;
