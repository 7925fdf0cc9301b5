//! Reusable widgets of the chat window
//!
//! Every interactive element carries an accessibility label so it can be
//! found by automation.

mod control_bar;
mod input_bar;
mod instruction_picker;
mod message_list;
mod voice_picker;

pub use control_bar::ControlBar;
pub use input_bar::InputBar;
pub use instruction_picker::InstructionPicker;
pub use message_list::MessageList;
pub use voice_picker::VoicePicker;
