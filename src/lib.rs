//! storefront - catalog listing and admin API for a small online shop
//!
//! The catalog filter compiler turns client query parameters into a
//! parameterized plan shared by a count and a page query; the session store
//! gates every mutating admin endpoint.

pub mod auth;
pub mod catalog;
pub mod cli;
pub mod http_server;
pub mod media;
pub mod observability;
