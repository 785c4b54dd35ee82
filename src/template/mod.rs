//! Template acquisition.
//!
//! - [`reference`] resolves user references into canonical locators
//! - [`fetch`] retrieves a locator into a directory
//! - [`extract`] narrows a download to one subdirectory
//! - [`provider`] ties those together behind the on-disk cache
//! - [`source`] and [`builtin`] cover templates that never touch the network

pub mod builtin;
pub mod extract;
pub mod fetch;
pub mod provider;
pub mod reference;
pub mod source;

pub use extract::extract_subdirectory;
pub use fetch::{FetchStrategy, Fetcher, RemoteFetcher, DEFAULT_FETCH_TIMEOUT};
pub use provider::TemplateProvider;
pub use reference::{resolve, CanonicalLocator, DEFAULT_BRANCH, DIRECT_PREFIX};
pub use source::TemplateSource;
