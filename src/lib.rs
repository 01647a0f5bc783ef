pub mod config;
pub mod error;
pub mod listing;
pub mod models;
pub mod router;
pub mod tags;
pub mod transport;
pub mod upload;
pub mod version;

pub use error::ClientError;

#[cfg(test)]
mod test_support;
