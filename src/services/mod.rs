//! Services
//!
//! Business logic services for the application.
//! Services handle the core functionality and are called by commands.

pub mod clipboard;
pub mod history;
pub mod session;
pub mod sidebar;

pub use clipboard::{ClipboardSink, MemoryClipboard, SystemClipboard};
pub use history::{Clock, HistoryStore, ManualClock, SystemClock};
pub use session::{SessionView, SubmissionState, SubmitOutcome, ToolSession};
pub use sidebar::{DateGroup, EditKey, EditOutcome, HistorySidebar, RowState};
