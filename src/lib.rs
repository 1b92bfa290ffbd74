pub mod config;
pub mod featured;
pub mod filters;
pub mod http_client;
pub mod lenient;
pub mod load_state;
pub mod provider;
pub mod records;
pub mod report_fetch;
pub mod schedule_fetch;
pub mod source;
pub mod state;
pub mod views;
pub mod voting;
