use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of an entry within one conversation client.
///
/// Ids are never reused, not even after the list is cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(u64);

impl EntryId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entry#{}", self.0)
    }
}

/// One rendered unit of conversation history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageEntry {
    UserText { text: String },
    BotText { text: String },
    BotImage { url: String },
}

impl MessageEntry {
    pub fn user(text: impl Into<String>) -> Self {
        MessageEntry::UserText { text: text.into() }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        MessageEntry::BotText { text: text.into() }
    }

    pub fn image(url: impl Into<String>) -> Self {
        MessageEntry::BotImage { url: url.into() }
    }

    /// Text of a user or bot text entry
    pub fn text(&self) -> Option<&str> {
        match self {
            MessageEntry::UserText { text } | MessageEntry::BotText { text } => Some(text),
            MessageEntry::BotImage { .. } => None,
        }
    }

    pub fn is_bot_text(&self) -> bool {
        matches!(self, MessageEntry::BotText { .. })
    }
}

/// An entry together with its identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    #[serde(flatten)]
    pub message: MessageEntry,
}

/// Append-only ordered conversation history.
///
/// Entries can be appended and bot text can be rewritten in place; the only way to remove
/// anything is [`EntryList::clear`], which drops everything.
#[derive(Debug, Default)]
pub struct EntryList {
    entries: Vec<Entry>,
    next_id: u64,
}

impl EntryList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry and return its id
    pub fn push(&mut self, message: MessageEntry) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry { id, message });
        id
    }

    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.position(id).map(|i| &self.entries[i])
    }

    // Ids are handed out in increasing order, so the list is always sorted by id.
    fn position(&self, id: EntryId) -> Option<usize> {
        self.entries.binary_search_by_key(&id, |e| e.id).ok()
    }

    fn bot_text_mut(&mut self, id: EntryId) -> Option<&mut String> {
        let index = self.position(id)?;
        match &mut self.entries[index].message {
            MessageEntry::BotText { text } => Some(text),
            _ => None,
        }
    }

    pub fn last(&self) -> Option<&Entry> {
        self.entries.last()
    }

    /// Replace the text of bot entry `id`.
    ///
    /// When `id` is gone or no longer names bot text, a new bot entry holding `text` is
    /// appended instead, so a user entry is never overwritten. Returns the id that now
    /// holds the text.
    pub fn write_bot_text(&mut self, id: EntryId, text: &str) -> EntryId {
        if let Some(current) = self.bot_text_mut(id) {
            current.clear();
            current.push_str(text);
            return id;
        }

        self.push(MessageEntry::bot(text))
    }

    /// Append one character to bot entry `id`.
    ///
    /// Returns `false`, leaving the list untouched, when `id` is gone or is not bot text.
    pub fn push_bot_char(&mut self, id: EntryId, ch: char) -> bool {
        match self.bot_text_mut(id) {
            Some(current) => {
                current.push(ch);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn as_slice(&self) -> &[Entry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_assigns_increasing_ids() {
        let mut list = EntryList::new();
        let a = list.push(MessageEntry::user("hi"));
        let b = list.push(MessageEntry::bot("hello"));

        assert!(a < b);
        assert_eq!(list.len(), 2);
        assert_eq!(list.last().map(|e| e.id), Some(b));
    }

    #[test]
    fn test_ids_not_reused_after_clear() {
        let mut list = EntryList::new();
        let first = list.push(MessageEntry::user("one"));
        list.clear();
        let second = list.push(MessageEntry::user("two"));

        assert!(list.get(first).is_none());
        assert_ne!(first, second);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_write_bot_text_in_place() {
        let mut list = EntryList::new();
        list.push(MessageEntry::user("hi"));
        let bot = list.push(MessageEntry::bot(""));
        list.push(MessageEntry::image("http://x/y.png"));

        let target = list.write_bot_text(bot, "hel");

        assert_eq!(target, bot);
        assert_eq!(list.len(), 3);
        assert_eq!(list.get(bot).and_then(|e| e.message.text()), Some("hel"));
    }

    #[test]
    fn test_write_bot_text_never_touches_user_entry() {
        let mut list = EntryList::new();
        let user = list.push(MessageEntry::user("my question"));

        let target = list.write_bot_text(user, "a");

        assert_ne!(target, user);
        assert_eq!(list.get(user).unwrap().message, MessageEntry::user("my question"));
        assert_eq!(list.last().unwrap().message, MessageEntry::bot("a"));
    }

    #[test]
    fn test_write_bot_text_for_missing_entry_appends() {
        let mut list = EntryList::new();
        let target = list.write_bot_text(EntryId::new(42), "ab");

        assert_eq!(list.len(), 1);
        assert_eq!(list.get(target).unwrap().message, MessageEntry::bot("ab"));
    }

    #[test]
    fn test_push_bot_char_only_extends_bot_text() {
        let mut list = EntryList::new();
        let user = list.push(MessageEntry::user("hi"));
        let bot = list.push(MessageEntry::bot("he"));
        let image = list.push(MessageEntry::image("http://x/y.png"));

        assert!(list.push_bot_char(bot, 'y'));
        assert!(!list.push_bot_char(user, 'x'));
        assert!(!list.push_bot_char(image, 'x'));
        assert!(!list.push_bot_char(EntryId::new(99), 'x'));

        assert_eq!(list.get(bot).unwrap().message, MessageEntry::bot("hey"));
        assert_eq!(list.get(user).unwrap().message, MessageEntry::user("hi"));
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_entry_serialization() {
        let entry = Entry {
            id: EntryId::new(3),
            message: MessageEntry::image("http://x/y.png"),
        };
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json, serde_json::json!({"id": 3, "kind": "bot_image", "url": "http://x/y.png"}));
    }
}
