pub mod api;
pub mod app;
pub mod config;
pub mod events;
pub mod geocode;
pub mod location;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod route;
pub mod ui;
