/// Lowercases text and strips punctuation.
///
/// Apostrophes are dropped so contractions stay one word; any other character that is neither
/// alphanumeric nor whitespace separates words. Words are joined by single spaces.
///
/// # Examples
///
/// ```
/// use posgram_preprocess::clean_text;
///
/// assert_eq!("dont stop its great", clean_text("Don't STOP...it's-great!"));
/// ```
pub fn clean_text(text: &str) -> String {
    let mut buf = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '\'' || c == '\u{2019}' {
            continue;
        }
        if c.is_alphanumeric() {
            buf.extend(c.to_lowercase());
        } else {
            buf.push(' ');
        }
    }
    buf.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cleans a single token. The result may be empty.
pub fn clean_token(token: &str) -> String {
    clean_text(token).replace(' ', "")
}
