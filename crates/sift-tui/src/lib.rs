//! sift-tui: Terminal UI components
//!
//! A lightweight terminal surface for the conversation log, built on
//! ratatui and crossterm.

pub mod app;
pub mod input;
pub mod theme;
pub mod widgets;

pub use app::App;
pub use theme::Theme;
