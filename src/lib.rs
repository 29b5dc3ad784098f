pub mod codec;
pub mod mapper;
pub mod metrics;
pub mod models;
pub mod storage;
pub mod utils;
