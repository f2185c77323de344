//! The transport client: one socket, one outstanding request at a time.
//!
//! [`Client`] owns the daemon connection and exposes the single operation
//! the layers above consume — send one request frame, receive one
//! response frame. The [`SendRaw`] trait is the seam device code is
//! written against; tests substitute an in-memory fake.

pub mod client;
pub mod error;

pub use client::{Client, ClientConfig, SendRaw, DEFAULT_MAX_EXTENSION_REPLY};
pub use error::{ClientError, Result};
