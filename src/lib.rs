//! Nested pie menus built from tab-indented text.
//!
//! The pipeline is [`input`] (lines to entries), [`menu`] (entries to a tree
//! of menus), [`layout`] (slice geometry and placement), [`hit`] (points to
//! slices) and [`nav`] (the interactive state machine). [`pie_menu`] is the
//! COSMIC front end driving it.

pub mod config;
pub mod error;
pub mod exec;
pub mod generate;
pub mod grab;
pub mod hit;
pub mod icons;
pub mod input;
pub mod layout;
pub mod menu;
pub mod nav;
pub mod pie_menu;
pub mod trigger;

pub use error::{Error, Result};
