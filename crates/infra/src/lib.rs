pub mod config;
pub mod inference_client;
pub mod logging;
