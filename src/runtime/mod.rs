//! Application lifecycle
//!
//! - `lifetime`: dependency construction before the server starts
//! - `modes`: execution modes (HTTP server)

pub mod lifetime;
pub mod modes;
