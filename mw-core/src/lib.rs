//! # MediaWiki Core Library
//!
//! `mw-core` is a thin client for the MediaWiki action API (`api.php`). It
//! takes care of the plumbing every bot needs and leaves the actual API
//! modules to the caller.
//!
//! ## Features
//!
//! - **Raw API calls**: any parameter set in, decoded JSON out, `format=json` enforced
//! - **Session handling**: cookie jar shared across requests, optionally persisted to disk
//! - **Login handshake**: the legacy `NeedToken` retry is handled transparently
//! - **Transport details**: gzip, response charsets and HTTP basic auth
//! - **Session helpers**: cached `apihighlimits` check and namespace table
//! - **Blocking facade**: [`blocking::MediaWiki`] for callers without a runtime
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mw_core::{build_user_agent, MediaWiki};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut wiki = MediaWiki::builder("https://test.wikipedia.org/w/api.php")
//!         .user_agent(build_user_agent("ExampleBot", "0.1", "https://example.org/bot"))
//!         .cookie_file("cookies.json")
//!         .build()?;
//!
//!     if wiki.login("ExampleBot", "secret", None).await? {
//!         let batch = wiki.limits("50", "500").await?;
//!         let result = wiki
//!             .call([("action", "query"), ("list", "allpages"), ("aplimit", batch)])
//!             .await?;
//!         println!("{}", result["query"]["allpages"]);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`client`]: the [`MediaWiki`] client and its builder
//! - [`transport`]: transport abstraction, reqwest implementation and configuration
//! - [`cookies`]: in-memory and file-backed cookie jars
//! - [`fetch`]: request parameters
//! - [`date`]: API timestamp parsing
//! - [`error`]: error types for every failure mode

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::uninlined_format_args)]

pub mod blocking;
pub mod client;
pub mod cookies;
pub mod date;
pub mod error;
pub mod fetch;
pub mod transport;
pub mod user_agent;

// Re-export commonly used types for convenience
pub use client::{MediaWiki, MediaWikiBuilder, NamespaceTable};
pub use cookies::CookieJar;
pub use date::{format_date, parse_date};
pub use error::{MwError, MwResult};
pub use fetch::{to_params, Params};
pub use transport::{ClientConfig, HttpAuth, Transport, TransportInfo};
pub use user_agent::{build_user_agent, DEFAULT_USER_AGENT};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
