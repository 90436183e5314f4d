pub mod age;
pub mod aggregate;
pub mod config;
pub mod event;
pub mod export;
pub mod http_cache;
pub mod http_client;
pub mod ingest;
pub mod minutes;
pub mod pipeline;
pub mod position;
pub mod rates;
pub mod source;
pub mod statsbomb;
