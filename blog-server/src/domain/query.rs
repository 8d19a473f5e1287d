use crate::domain::post::Post;
use crate::domain::tag::Tag;

/// Read-side selection over posts. Every variant yields posts newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostQuery {
    All,
    Tagged(Tag),
    Search(String),
}

impl PostQuery {
    /// `None` when the search text is missing or empty: such a search
    /// selects nothing rather than everything.
    pub fn search(q: Option<&str>) -> Option<Self> {
        match q {
            Some(q) if !q.is_empty() => Some(PostQuery::Search(q.to_string())),
            _ => None,
        }
    }

    pub fn matches(&self, post: &Post) -> bool {
        match self {
            PostQuery::All => true,
            PostQuery::Tagged(tag) => post.tags.iter().any(|label| label_matches(label, tag)),
            PostQuery::Search(q) => {
                let needle = q.to_lowercase();
                post.title.to_lowercase().contains(&needle)
                    || post.content.to_lowercase().contains(&needle)
            }
        }
    }
}

fn label_matches(label: &str, tag: &Tag) -> bool {
    label == tag.name || crate::domain::tag::slugify(label) == tag.slug
}

/// Escapes `LIKE` metacharacters and wraps the text for a substring match.
pub fn like_pattern(q: &str) -> String {
    let mut pattern = String::with_capacity(q.len() + 2);
    pattern.push('%');
    for ch in q.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
