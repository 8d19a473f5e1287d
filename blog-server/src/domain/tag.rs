use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

impl Tag {
    pub fn new(name: String) -> Self {
        let slug = slugify(&name);
        Self {
            id: Uuid::new_v4(),
            name,
            slug,
        }
    }
}

/// Lower-case ASCII slug: separators collapse into a single `-`, everything
/// else that is not alphanumeric is dropped.
pub fn slugify(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    let mut pending_dash = false;

    for ch in label.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else if ch.is_whitespace() || ch == '-' || ch == '_' {
            pending_dash = true;
        }
    }

    slug
}

/// Splits a raw tag field into labels. Commas win over whitespace when both
/// appear. Labels sharing a slug collapse into the first one seen.
pub fn parse_tag_input(raw: &str) -> Result<BTreeSet<String>, Vec<String>> {
    let pieces: Vec<&str> = if raw.contains(',') {
        raw.split(',').collect()
    } else {
        raw.split_whitespace().collect()
    };

    let mut seen = BTreeSet::new();
    let mut labels = BTreeSet::new();
    let mut rejected = Vec::new();

    for piece in pieces.into_iter().map(str::trim).filter(|p| !p.is_empty()) {
        let slug = slugify(piece);
        if slug.is_empty() {
            rejected.push(piece.to_string());
            continue;
        }
        if seen.insert(slug) {
            labels.insert(piece.to_string());
        }
    }

    if rejected.is_empty() {
        Ok(labels)
    } else {
        Err(rejected)
    }
}

/// Renders labels back into the tag field so that resubmitting the text
/// parses to the same set. A single multi-word label keeps a trailing comma,
/// otherwise it would be split on whitespace.
pub fn edit_string(labels: &BTreeSet<String>) -> String {
    let mut text = labels
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if labels.len() == 1 && text.contains(char::is_whitespace) {
        text.push(',');
    }
    text
}
