use std::fmt;

/// A result entry an extension can put in front of the user.
pub trait Item: Send + Sync {
    /// Stable identifier used for usage tracking and deduplication.
    fn id(&self) -> &str;

    /// Primary display text.
    fn text(&self) -> &str;

    /// Secondary display text.
    fn subtext(&self) -> &str {
        ""
    }

    /// Identifier of the extension that owns this item.
    fn extension_id(&self) -> &str;
}

/// An [`Item`] that can be stored in an [`OfflineIndex`](crate::OfflineIndex).
///
/// The keyword list is read once when the item is added. Items are treated as
/// immutable while indexed; to change keywords, add a replacement item with
/// the same id.
pub trait Indexable: Item {
    /// Keywords the item should be found by, most significant first.
    fn index_keywords(&self) -> &[String];
}

impl fmt::Debug for dyn Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Item")
            .field("id", &self.id())
            .field("text", &self.text())
            .field("extension_id", &self.extension_id())
            .finish()
    }
}

/// General purpose item used by extensions that need nothing fancier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardItem {
    id: String,
    text: String,
    subtext: String,
    extension_id: String,
    keywords: Vec<String>,
}

impl StandardItem {
    /// Create an item whose only keyword is its display text.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        extension_id: impl Into<String>,
    ) -> Self {
        let text = text.into();
        Self {
            id: id.into(),
            keywords: vec![text.clone()],
            text,
            subtext: String::new(),
            extension_id: extension_id.into(),
        }
    }

    #[must_use]
    pub fn with_subtext(mut self, subtext: impl Into<String>) -> Self {
        self.subtext = subtext.into();
        self
    }

    /// Replace the keyword list.
    #[must_use]
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }
}

impl Item for StandardItem {
    fn id(&self) -> &str {
        &self.id
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn subtext(&self) -> &str {
        &self.subtext
    }

    fn extension_id(&self) -> &str {
        &self.extension_id
    }
}

impl Indexable for StandardItem {
    fn index_keywords(&self) -> &[String] {
        &self.keywords
    }
}
