pub mod config;
pub mod dataset;
pub mod export;
pub mod http_cache;
pub mod http_client;
pub mod logging;
pub mod ocr;
pub mod predict;
pub mod squad;
pub mod state;
pub mod summary;
pub mod teams;
pub mod worker;
