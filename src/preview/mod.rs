//! Live preview: a fitted canvas, drag interaction and throttled redraws.

pub mod session;
pub mod throttle;

pub use session::PreviewSession;
pub use throttle::{RedrawThrottle, RefreshState, DEFAULT_FRAME_INTERVAL};
