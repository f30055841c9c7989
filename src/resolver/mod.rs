pub mod client;
pub mod error;

pub use client::{validate_short_code, LookupClient, Resolver};
pub use error::ResolveError;
