//! Post data structure.

/// Text of one top-level post, in page order.
///
/// Lives only as long as the fetch attempt that read it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    /// Full rendered text, read once per attempt
    pub text: String,

    /// Position among the page's top-level posts
    pub index: usize,
}

impl Post {
    pub fn new(text: impl Into<String>, index: usize) -> Self {
        Self {
            text: text.into(),
            index,
        }
    }

    /// First `max_chars` characters, used for logging.
    pub fn preview(&self, max_chars: usize) -> &str {
        match self.text.char_indices().nth(max_chars) {
            Some((end, _)) => &self.text[..end],
            None => &self.text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_respects_char_boundaries() {
        let post = Post::new("Crème brûlée today", 0);
        assert_eq!(post.preview(5), "Crème");
        assert_eq!(post.preview(100), "Crème brûlée today");
    }
}
