//! Feed discovery and normalization service.
//!
//! Two pipelines make up the core:
//!
//! - **Discovery** ([`discovery`]): given any website URL, find its RSS/Atom
//!   feeds via HTML autodiscovery, conventional-path probing, and a
//!   known-domain table, in strict priority order with caching.
//! - **Normalization** ([`feed`]): given a feed URL, fetch the document and
//!   flatten RSS/Atom differences into one canonical article schema.
//!
//! Everything else — the [`server`] routes, [`fetch`] I/O boundary,
//! [`cache`] TTL store, [`config`] — is support around those two.

pub mod cache;
pub mod config;
pub mod discovery;
pub mod feed;
pub mod fetch;
pub mod server;
pub mod util;
