// Conversation logging
//
// Appends successful exchanges to a JSONL file so a session can be reviewed
// after the process exits.

pub mod conversation_logger;

pub use conversation_logger::{read_log, ConversationLogger, LogEntry};
