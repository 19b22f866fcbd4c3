//! Opaque tokens standing in for content that must bypass comrak.

/// Side table of fragments extracted from the source before conversion.
///
/// Tokens have the form `<prefix><n><prefix>`. The prefix consists of
/// ASCII letters and is extended until it does not occur in the source,
/// so tokens never collide with author text. Letters and digits carry no
/// markdown meaning, so tokens pass through conversion unchanged. The
/// counter starts at zero for every store, i.e. for every render call.
#[derive(Debug, Clone)]
pub struct PlaceholderStore<T> {
    prefix: String,
    entries: Vec<(String, T)>,
}

impl<T> PlaceholderStore<T> {
    /// Creates an empty store whose tokens cannot appear in `source`.
    ///
    /// # Arguments
    ///
    /// * `tag`: Uppercase ASCII letters naming the fragment kind
    /// * `source`: Text the tokens will be inserted into
    pub fn new(tag: &str, source: &str) -> Self {
        let mut prefix = format!("X{tag}");
        while source.contains(&prefix) {
            prefix.push('Q');
        }

        Self {
            prefix,
            entries: Vec::new(),
        }
    }

    /// Stores a fragment and returns its token.
    pub fn insert(&mut self, value: T) -> String {
        let token = format!("{}{}{}", self.prefix, self.entries.len(), self.prefix);
        self.entries.push((token.clone(), value));
        token
    }

    /// Iterates stored (token, fragment) pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(token, value)| (token.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every token of this store from `text`.
    pub fn strip_tokens(&self, text: &str) -> String {
        self.entries
            .iter()
            .fold(text.to_string(), |text, (token, _)| text.replace(token, ""))
    }
}

/// Substitutes a block-level token in rendered HTML.
///
/// Comrak wraps a token that stands alone between blank lines in a
/// paragraph. That paragraph is replaced as a whole so block content is
/// not nested inside `<p>`; any remaining occurrences are replaced as is.
pub fn replace_block(html: &str, token: &str, replacement: &str) -> String {
    html.replace(&format!("<p>{token}</p>"), replacement)
        .replace(token, replacement)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_unique_and_ordered() {
        // Arrange
        let mut store = PlaceholderStore::new("MTH", "plain text");

        // Act
        let first = store.insert("a");
        let second = store.insert("b");

        // Assert
        assert_eq!(first, "XMTH0XMTH");
        assert_eq!(second, "XMTH1XMTH");
        assert_eq!(store.len(), 2);
        let values: Vec<&str> = store.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec!["a", "b"]);
    }

    #[test]
    fn test_prefix_avoids_source_collision() {
        // Arrange
        let source = "the author wrote XMTH0XMTH literally";

        // Act
        let mut store = PlaceholderStore::new("MTH", source);
        let token = store.insert(());

        // Assert
        assert!(!source.contains(&token), "Token must not occur in source");
        assert!(token.starts_with("XMTHQ"));
    }

    #[test]
    fn test_token_is_not_prefix_of_later_token() {
        // Arrange
        let mut store = PlaceholderStore::new("T", "");
        let tokens: Vec<String> = (0..11).map(|i| store.insert(i)).collect();

        // Act & Assert
        assert!(!tokens[10].contains(&tokens[1]));
    }

    #[test]
    fn test_new_store_is_empty() {
        let store: PlaceholderStore<()> = PlaceholderStore::new("T", "");
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_strip_tokens() {
        // Arrange
        let mut store = PlaceholderStore::new("MTH", "");
        let first = store.insert(());
        let second = store.insert(());

        // Act
        let stripped = store.strip_tokens(&format!("Euler {first} and {second}!"));

        // Assert
        assert_eq!(stripped, "Euler  and !");
    }

    #[test]
    fn test_replace_block_unwraps_paragraph() {
        // Arrange
        let html = "<p>XT0XT</p>\n<p>inline XT0XT</p>";

        // Act
        let result = replace_block(html, "XT0XT", "<div>d</div>");

        // Assert
        assert_eq!(result, "<div>d</div>\n<p>inline <div>d</div></p>");
    }
}
