use std::sync::OnceLock;

use regex::Regex;

fn hashtag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\B#\w+").unwrap())
}

fn mention_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\B@\w+").unwrap())
}

fn find_all(pattern: &Regex, text: &str) -> Vec<String> {
    pattern
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Gets the `#hashtags` of a text in order of appearance.
///
/// # Examples
///
/// ```
/// use posgram_preprocess::extract_hashtags;
///
/// assert_eq!(vec!["#rust", "#nlp"], extract_hashtags("#rust for #nlp, not C#"));
/// ```
pub fn extract_hashtags(text: &str) -> Vec<String> {
    find_all(hashtag_pattern(), text)
}

/// Gets the `@mentions` of a text in order of appearance. E-mail addresses are not mentions.
pub fn extract_mentions(text: &str) -> Vec<String> {
    find_all(mention_pattern(), text)
}

/// Removes hashtags, including their words.
pub fn remove_hashtags(text: &str) -> String {
    hashtag_pattern().replace_all(text, "").into_owned()
}

/// Removes mentioned users.
pub fn remove_mentions(text: &str) -> String {
    mention_pattern().replace_all(text, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mentions() {
        assert_eq!(
            vec!["@alice", "@bob_2"],
            extract_mentions("@alice thanks @bob_2, mail me at me@example.com")
        );
        assert_eq!(
            " thanks , mail me at me@example.com",
            remove_mentions("@alice thanks @bob_2, mail me at me@example.com")
        );
    }

    #[test]
    fn test_hashtags() {
        assert_eq!("love  today", remove_hashtags("love #rust today"));
        assert!(extract_hashtags("no tags here").is_empty());
    }
}
