use crate::error::ServiceError;
use crate::service::CHAT_FALLBACK_REPLY;

pub const GREETING: &str =
    "Hello! I am your NeuroUI assistant. How can I help you design or understand your circuit today?";
pub const THINKING: &str = "Thinking...";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Conversation with the circuit assistant. Starts with a greeting.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
}

impl Default for ChatLog {
    fn default() -> Self {
        Self {
            messages: vec![ChatMessage {
                role: Role::Assistant,
                content: GREETING.to_owned(),
            }],
        }
    }
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Record a user message. Blank input, or input while a reply is still pending,
    /// is refused and yields `None`.
    pub fn submit(&mut self, input: &str, busy: bool) -> Option<String> {
        let message = input.trim();
        if message.is_empty() || busy {
            return None;
        }
        self.messages.push(ChatMessage {
            role: Role::User,
            content: message.to_owned(),
        });
        Some(message.to_owned())
    }

    /// Append the assistant's answer, or the fallback text if the request failed.
    pub fn receive(&mut self, reply: Result<String, ServiceError>) {
        let content = match reply {
            Ok(text) => text,
            Err(err) => {
                log::warn!("assistant request failed: {err}");
                CHAT_FALLBACK_REPLY.to_owned()
            }
        };
        self.messages.push(ChatMessage {
            role: Role::Assistant,
            content,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_greeting() {
        let log = ChatLog::new();
        assert_eq!(log.messages().len(), 1);
        assert_eq!(log.messages()[0].role, Role::Assistant);
        assert_eq!(log.messages()[0].content, GREETING);
    }

    #[test]
    fn blank_and_busy_input_is_ignored() {
        let mut log = ChatLog::new();
        assert_eq!(log.submit("   ", false), None);
        assert_eq!(log.submit("hello", true), None);
        assert_eq!(log.submit("  hello ", false), Some("hello".to_owned()));
        assert_eq!(log.messages().len(), 2);
        assert_eq!(log.messages()[1].role, Role::User);
    }

    #[test]
    fn failures_become_fallback_text() {
        let mut log = ChatLog::new();
        log.receive(Err(ServiceError::Status {
            endpoint: "http://127.0.0.1:5000/chat".to_owned(),
            status: 500,
        }));
        log.receive(Ok("Add an inhibitory loop.".to_owned()));
        let replies: Vec<_> = log.messages()[1..].iter().map(|m| m.content.as_str()).collect();
        assert_eq!(replies, [CHAT_FALLBACK_REPLY, "Add an inhibitory loop."]);
    }
}
