pub mod dispatcher;
pub mod handler;
pub mod registry;

use crate::conversation::Conversation;
use crate::home::SharedHome;
pub use dispatcher::create_command_registry;

pub struct ChatState {
    pub conversation: Conversation,
    pub home: SharedHome,
    pub should_continue: bool,
}

impl ChatState {
    pub fn new(conversation: Conversation, home: SharedHome) -> Self {
        Self {
            conversation,
            home,
            should_continue: true,
        }
    }
}
