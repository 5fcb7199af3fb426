//! Tags of the current media item and the score convention.

use crate::config::{SCORE_TAG_PREFIX, TAG_SUMMARY_MAX_CHARS};

/// Ordered tags of one media item. Holds at most one score tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    tags: Vec<String>,
}

fn is_score_tag(tag: &str) -> bool {
    tag.starts_with(SCORE_TAG_PREFIX)
}

impl TagSet {
    /// Wraps tags read from storage. Extra score tags from older files are
    /// collapsed to the last one.
    pub fn from_stored(tags: Vec<String>) -> Self {
        let mut set = Self { tags };
        if let Some(last) = set.tags.iter().rposition(|t| is_score_tag(t)) {
            let keep = set.tags[last].clone();
            let position = set.tags[..last].iter().filter(|t| !is_score_tag(t)).count();
            set.tags.retain(|t| !is_score_tag(t));
            set.tags.insert(position, keep);
        }
        set
    }

    pub fn as_slice(&self) -> &[String] {
        &self.tags
    }

    /// Value of the score tag, e.g. `"7"` for `score__7`.
    pub fn score(&self) -> Option<&str> {
        self.tags
            .iter()
            .find_map(|t| t.strip_prefix(SCORE_TAG_PREFIX))
    }

    pub fn has_score(&self) -> bool {
        self.score().is_some()
    }

    /// Replaces any score tag with `score__<value>` appended at the end.
    pub fn assign_score(&mut self, value: &str) {
        self.tags.retain(|t| !is_score_tag(t));
        self.tags.push(format!("{}{}", SCORE_TAG_PREFIX, value));
    }

    /// `Tags: "a", "b"` line shown under the status line.
    pub fn summary(&self) -> String {
        let body = if self.tags.is_empty() {
            "None".to_string()
        } else {
            let quoted: Vec<String> = self.tags.iter().map(|t| format!("\"{}\"", t)).collect();
            quoted.join(", ")
        };
        format!("Tags: {}", shorten_middle(&body, TAG_SUMMARY_MAX_CHARS))
    }
}

/// Keeps the first and last `max / 2` characters around `<...>`.
fn shorten_middle(text: &str, max: usize) -> String {
    let len = text.chars().count();
    if len <= max {
        return text.to_string();
    }
    let half = max / 2;
    let head: String = text.chars().take(half).collect();
    let tail: String = text.chars().skip(len - half).collect();
    format!("{}<...>{}", head, tail)
}
