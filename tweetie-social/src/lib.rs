//! Social network clients and the fetch-and-enrich pipeline built on them.
//!
//! Only the Twitter/X v1.1 REST surface is implemented. See [`twitter`] for the
//! session, the paginated timeline fetcher, and the followed-account resolver.
pub mod twitter;
