use hashbrown::HashSet;
use stop_words::{get, LANGUAGE};

/// Built-in stopwords of a language, or `None` if no list exists.
pub fn builtin_stopwords(language: &str) -> Option<HashSet<String>> {
    let lang = match language.to_lowercase().as_str() {
        "ar" | "arabic" => LANGUAGE::Arabic,
        "da" | "danish" => LANGUAGE::Danish,
        "nl" | "dutch" => LANGUAGE::Dutch,
        "en" | "english" => LANGUAGE::English,
        "fi" | "finnish" => LANGUAGE::Finnish,
        "fr" | "french" => LANGUAGE::French,
        "de" | "german" => LANGUAGE::German,
        "hu" | "hungarian" => LANGUAGE::Hungarian,
        "it" | "italian" => LANGUAGE::Italian,
        "no" | "norwegian" => LANGUAGE::Norwegian,
        "pl" | "polish" => LANGUAGE::Polish,
        "pt" | "portuguese" => LANGUAGE::Portuguese,
        "ru" | "russian" => LANGUAGE::Russian,
        "es" | "spanish" => LANGUAGE::Spanish,
        "sv" | "swedish" => LANGUAGE::Swedish,
        "tr" | "turkish" => LANGUAGE::Turkish,
        _ => return None,
    };
    Some(get(lang).iter().map(|w| w.to_string()).collect())
}

/// Removes stopwords from a cleaned text.
pub fn remove_stopwords(text: &str, stopwords: &HashSet<String>) -> String {
    posgram::tokenizer::tokenize_words(text)
        .into_iter()
        .filter(|w| !stopwords.contains(w))
        .collect::<Vec<_>>()
        .join(" ")
}
