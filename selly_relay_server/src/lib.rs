//! # Selly relay server
//! This crate hosts the server code for the Selly → Telegram relay. It is responsible for:
//! Listening for incoming webhook requests from Selly.
//! Checking the shared secret and keeping callers with a wrong secret out.
//! Formatting the order and posting it to a Telegram chat.
//! Finding out which chat to post to (see [discovery](discovery/index.html)).
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/webhook?secret=<secret>`: The webhook route for receiving order notifications from Selly.

pub mod cli;
pub mod config;
pub mod denylist;
pub mod discovery;
pub mod errors;
pub mod helpers;
pub mod notifier;
pub mod routes;
pub mod server;
