//! UI widgets

pub mod input_box;
pub mod message_log;
pub mod spinner;

pub use input_box::InputBox;
pub use message_log::MessageLog;
pub use spinner::spinner_frame;
