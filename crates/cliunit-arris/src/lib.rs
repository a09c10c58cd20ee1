//! Arris E6000 CMTS translation unit
//!
//! Covers DOCSIS cable-mac interfaces: their configuration and the
//! operational state printed by `show interface cable-mac N`.

pub mod cable_mac;
pub mod state;
mod unit;

pub use unit::ArrisUnit;
