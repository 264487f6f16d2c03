//! sift-chat: the conversation workflow
//!
//! Drives one conversational query cycle against the assistant backend:
//! accept a message through the input gate, start or continue the
//! conversation, poll for the asynchronous reply, interpret the resolved
//! payload, and append the results to a renderer. The workflow depends on
//! the `Backend` and `Renderer` traits only, so it runs headless in tests.

pub mod entry;
pub mod interpret;
pub mod poll;
pub mod renderer;
pub mod session;
pub mod table;
pub mod workflow;

pub use entry::{EntryBody, EntryId, MessageEntry, Role};
pub use poll::{PollOutcome, PollPolicy, poll_until_terminal};
pub use renderer::{Renderer, Transcript};
pub use session::Session;
pub use table::{Cell, TableView, build_table};
pub use workflow::{Backend, ChatWorkflow, SubmitOutcome};
