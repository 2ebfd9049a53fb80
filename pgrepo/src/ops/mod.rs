//! Core operations.
//!
//! This module contains the business logic for pgrepo commands,
//! separated from CLI argument parsing and output rendering.

pub mod check;
pub mod gather;
pub mod generate;
pub mod inspect;

pub use check::check;
pub use gather::{cancel_on_ctrl_c, compile, connect, gather};
pub use generate::generate;
pub use inspect::inspect;
