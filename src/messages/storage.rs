use super::types::{Message, Role};
use parking_lot::RwLock;
use std::sync::Arc;

/// Append-only conversation log. Insertion order is display order.
#[derive(Debug, Clone)]
pub struct Transcript {
    messages: Arc<RwLock<Vec<Message>>>,
}

impl Transcript {
    pub fn new() -> Self {
        Self {
            messages: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn push(&self, message: Message) {
        self.messages.write().push(message);
    }

    pub fn get_all(&self) -> Vec<Message> {
        self.messages.read().clone()
    }

    pub fn last(&self) -> Option<Message> {
        self.messages.read().last().cloned()
    }

    /// Most recent assistant reply, if any
    pub fn last_assistant(&self) -> Option<Message> {
        self.messages
            .read()
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.messages.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.read().is_empty()
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_is_kept() {
        let transcript = Transcript::new();
        transcript.push(Message::user("one"));
        transcript.push(Message::assistant("two"));
        transcript.push(Message::user("three"));

        let contents: Vec<_> = transcript
            .get_all()
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(contents, vec!["one", "two", "three"]);
        assert_eq!(transcript.last().unwrap().content, "three");
    }

    #[test]
    fn test_last_assistant_skips_user_messages() {
        let transcript = Transcript::new();
        assert!(transcript.last_assistant().is_none());

        transcript.push(Message::user("hello"));
        assert!(transcript.last_assistant().is_none());

        transcript.push(Message::assistant("hi there"));
        transcript.push(Message::user("and then?"));
        assert_eq!(transcript.last_assistant().unwrap().content, "hi there");
    }

    #[test]
    fn test_clones_share_storage() {
        let transcript = Transcript::new();
        let view = transcript.clone();
        transcript.push(Message::user("shared"));
        assert_eq!(view.len(), 1);
        assert!(!view.is_empty());
    }
}
