//! Juniper Junos translation unit
//!
//! Junos prints its configuration as flat `set` statements
//! (`show configuration interfaces | display set`), so every reader here
//! filters lines by their statement prefix rather than by indentation.
//! Writers emit `set`/`delete` statements inside `configure` and finish
//! with `commit and-quit`.

pub mod interfaces;
pub mod ipv4;
mod unit;

pub use unit::{JunosUnit, SH_INTERFACES};
