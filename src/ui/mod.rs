//! Interactive search UI.
//!
//! [`selection`] and [`session`] hold all state; [`input`] maps keys onto
//! them; [`edit`] and [`clipboard`] perform the side effects; [`tui`] owns
//! the terminal.

pub mod clipboard;
pub mod components;
pub mod edit;
pub mod input;
pub mod selection;
pub mod session;
pub mod shortcuts;
pub mod tui;
