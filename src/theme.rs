use serde::{Deserialize, Serialize};

/// 默认表情牌面。
pub const DEFAULT_EMOJIS: [&str; 14] = [
    "✈️", "🎯", "🚕", "🏸", "🎾", "🏊🏼", "🧘🏻‍♂️", "🏊🏾‍♀️", "🥑", "🍖", "🎱", "🔯", "💰", "💡",
];

/// A named set of distinct card faces. Pair `i` of a game shows `contents[i]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Theme {
    pub name: String,
    pub contents: Vec<String>,
}

impl Theme {
    /// Duplicate faces are dropped, keeping first occurrences in order.
    pub fn new(name: impl Into<String>, contents: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let mut distinct: Vec<String> = Vec::new();
        for content in contents {
            let content = content.into();
            if !distinct.contains(&content) {
                distinct.push(content);
            }
        }
        Self {
            name: name.into(),
            contents: distinct,
        }
    }

    pub fn emoji() -> Self {
        Self::new("emoji", DEFAULT_EMOJIS)
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::emoji()
    }
}
