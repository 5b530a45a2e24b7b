//! # Mestermind client
//!
//! REST client for the marketplace backend endpoints the quote-request engine
//! uses: question sets and customer requests.
//!
//! ```rust,no_run
//! use mestermind_client::{HttpMarketplaceClient, MarketplaceApi};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HttpMarketplaceClient::new("http://localhost:8000/api/v1")?;
//!     for set in client.list_question_sets(12).await? {
//!         println!("{} v{} ({:?})", set.name, set.version, set.status);
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod http;

pub use client::MarketplaceApi;
pub use error::ApiError;
pub use http::HttpMarketplaceClient;
