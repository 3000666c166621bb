//! A DNS protocol engine.
//!
//! This crate provides the building blocks for talking DNS as a client: the
//! exact wire format of DNS messages including name compression, a registry
//! of resource record types with their wire and presentation formats, a
//! synchronous stub resolver with retries, TCP fallback, background queries
//! and zone transfers, and an iterative resolver that walks the delegation
//! chain from the root hints down to an authoritative answer.
//!
//! # Layout
//!
//! * [base] contains the fundamental types: domain names, character
//!   strings, the message header, questions, records, and complete
//!   messages together with the machinery to parse and compose them.
//! * [rdata] contains the record data of all supported record types and
//!   the [`AllRecordData`][rdata::AllRecordData] enum tying them together.
//! * [resolv] contains the stub resolver, its configuration, the socket
//!   transport, zone transfers, and the iterative resolver.
//! * [server] turns queries into responses via a user supplied handler
//!   and serves them over UDP and TCP.
//! * [tsig] contains the signing of messages with TSIG records.
//! * [utils] contains helpers for Base 16 and Base 64 encoding.
//!
//! # Feature flags
//!
//! * `serde`: Enables serde support for the resolver configuration.
//! * `tsig`: Adds a HMAC signer based on [ring] for TSIG records. Without
//!   the feature, signing functions have to be provided by the user.
//!
//! [ring]: https://github.com/briansmith/ring

#![allow(renamed_and_removed_lints)]
#![allow(clippy::unknown_clippy_lints)]
#![allow(clippy::uninlined_format_args)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod base;
pub mod error;
pub mod rdata;
pub mod resolv;
pub mod server;
pub mod tsig;
pub mod utils;

pub use self::error::{Error, Result};
