pub mod config;
pub mod controller;
pub mod feed;
pub mod http_client;
pub mod loader;
pub mod logging;
pub mod replay;
pub mod simulation;
pub mod state;
