//! Client library for the Pomelo shop backend.
//!
//! Covers the full front-of-house flow: the OAuth2 authorization-code login
//! against the auth server, bearer-authenticated calls to the user, product,
//! and order services, the in-memory cart, and the session lifecycle tying
//! them together.
//!
//! Start from [`config::ClientConfig::from_env`], then build a
//! [`session::SessionManager`]; everything stateful goes through it.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod auth;
pub mod cart;
pub mod config;
pub mod error;
pub mod session;
pub mod store;

pub use error::{ClientError, Result};
