//! Rules engine for a grid light-reflection puzzle.
//!
//! A [`Level`] is loaded from text by [`format::parse`], played through a
//! [`Session`] that owns the [`Board`] and its [`History`], and after every
//! accepted action the beam is re-traced with [`trace`]. Renderers read
//! [`Snapshot`] values and never touch the session directly.

#![no_std]

extern crate alloc;

pub use board::*;
pub use catalog::*;
pub use cell::*;
pub use error::*;
pub use history::*;
pub use level::*;
pub use session::*;
pub use snapshot::*;
pub use trace::*;
pub use types::*;

mod board;
mod catalog;
mod cell;
mod error;
pub mod format;
mod history;
mod level;
mod session;
mod snapshot;
mod trace;
mod types;
