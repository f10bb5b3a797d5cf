pub mod board;
pub mod config;
pub mod feed_fetch;
pub mod feed_worker;
pub mod http_client;
pub mod state;
pub mod time_convert;
