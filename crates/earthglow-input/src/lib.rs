//! Pointer tracking for earthglow.
//!
//! The scene only consumes the raw cursor offset from the window centre, so
//! this crate is a single tracker rather than an action-mapping layer.

mod cursor;

pub use cursor::CursorTracker;
