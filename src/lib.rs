//! hena_auth: bearer-token authentication backend for HenaGame
//!
//! Accounts live in a sled-backed credential store, passwords are bcrypt
//! hashed, and sessions are stateless HMAC-signed JWTs.
//!
//! The crate also carries the game-side client: a blocking HTTP client for
//! the auth endpoints and a headless screen stack whose login screen talks
//! to it.

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod storage;
// REST API module: Axum HTTP handlers for /auth and /health
pub mod rest;

pub mod client;
pub mod game;
