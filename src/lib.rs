//! Geolocator - IP geolocation gateway
//!
//! Looks up geolocation metadata for an IP address (explicit or the
//! caller's own) through ipstack and caches successful answers.
//!
//! # Architecture
//! - `api`: HTTP handlers and middleware
//! - `cli`: command-line definitions (clap)
//! - `services`: lookup orchestration (cache-aside) and the ipstack client
//! - `cache`: cache backends (Redis, in-process moka)
//! - `config`: static configuration (TOML + environment)
//! - `runtime`: startup and server mode
//! - `system`: logging
//! - `utils`: IP validation and caller IP inference

pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod system;
pub mod utils;
