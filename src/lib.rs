pub mod aggregator;
pub mod cache;
pub mod config;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod filter;
pub mod http;
pub mod news;
pub mod service;
pub mod sites;

pub use error::{Error, Result};
pub use news::NewsItem;
pub use service::{NewsRequest, NewsResponse, NewsService};
