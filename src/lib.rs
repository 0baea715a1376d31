pub mod config;
pub mod edikt;
pub mod fetcher;
pub mod geo;
pub mod notify;
pub mod pipeline;
pub mod store;
pub mod text;
