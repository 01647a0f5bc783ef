/// Separator used for tag lists on the wire.
pub const TAG_DELIMITER: char = '|';

/// A tag is one or more ASCII letters, digits, underscores or hyphens.
/// No trimming happens here: surrounding whitespace makes a tag invalid.
pub fn is_valid_tag(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Splits a pipe-delimited tag field, skipping empty segments.
pub fn split_tags(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(TAG_DELIMITER).filter(|t| !t.is_empty())
}

/// Unique tags in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    tags: Vec<String>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pipe_delimited(raw: &str) -> Self {
        split_tags(raw).collect()
    }

    /// Returns false when the tag was already present.
    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if self.contains(&tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    pub fn remove(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        self.tags.len() != before
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn clear(&mut self) {
        self.tags.clear();
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    /// Ascending copy, the order tags are displayed in.
    pub fn sorted(&self) -> TagSet {
        let mut tags = self.tags.clone();
        tags.sort();
        TagSet { tags }
    }

    /// Joins in insertion order, not display order.
    pub fn to_pipe_string(&self) -> String {
        self.tags.join("|")
    }
}

impl<S: Into<String>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = TagSet::new();
        for tag in iter {
            set.insert(tag);
        }
        set
    }
}
