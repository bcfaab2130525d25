//! earthglow application: window, event handling and the per-refresh frame
//! loop.

pub mod frame_loop;
pub mod window;

pub use frame_loop::{Clock, FrameLoop, FrameRenderer, ManualClock, RefreshTrigger, SystemClock};
pub use window::{AppError, AppState, run_with_config};
