//! Text helpers (ANSI scanning, display width).
//!
//! Pure string-in/string-out functions with no dependency on the sink or
//! renderer layers.

pub mod ansi;
pub mod width;
