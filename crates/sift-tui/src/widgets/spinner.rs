//! Spinner animation frames

use std::time::Duration;

/// Spinner animation frames
const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Current spinner frame for an elapsed duration, advancing every 80 ms
pub fn spinner_frame(elapsed: Duration) -> &'static str {
    let frame_index = (elapsed.as_millis() / 80) as usize;
    SPINNER_FRAMES[frame_index % SPINNER_FRAMES.len()]
}
