//! Linking n-grams back to the records they occur in.

use log::debug;

use crate::ngram::{NgramRecord, WordFrequencyMatrix};

/// Attaches record identifiers to the first `take_top_x` n-grams.
///
/// The identifiers of an n-gram are the ascending indices of the matrix rows with a non-zero cell
/// in its column. Records after the first `take_top_x` are left untouched.
///
/// # Examples
///
/// ```
/// use posgram::enrich::enrich_with_ids;
/// use posgram::NgramVectorizer;
///
/// let docs = vec![
///     vec!["a".to_string(), "b".to_string()],
///     vec!["a".to_string(), "c".to_string()],
/// ];
/// let mut vectorizer = NgramVectorizer::new(1, 1, 1000, false).unwrap();
/// let (mut ngrams, matrix) = vectorizer.fit_transform(&docs);
/// enrich_with_ids(&mut ngrams, &matrix, 3);
///
/// assert_eq!(Some(vec![0, 1]), ngrams[0].ids);
/// assert_eq!(Some(vec![0]), ngrams[1].ids);
/// ```
pub fn enrich_with_ids(ngrams: &mut [NgramRecord], matrix: &WordFrequencyMatrix, take_top_x: usize) {
    for ngram in ngrams.iter_mut().take(take_top_x) {
        let ids = matrix
            .term_index(&ngram.text)
            .map(|col| matrix.column(col).map(|(row, _)| row).collect())
            .unwrap_or_default();
        ngram.ids = Some(ids);
    }
    debug!("Enriched {} n-grams", ngrams.len().min(take_top_x));
}

/// Keeps the n-grams whose text contains `word`.
pub fn filter_containing(ngrams: &[NgramRecord], word: &str) -> Vec<NgramRecord> {
    ngrams
        .iter()
        .filter(|r| r.text.contains(word))
        .cloned()
        .collect()
}

/// Mean of the present values at `ids`. `None` if no value is present.
pub fn mean_over(values: &[Option<f64>], ids: &[usize]) -> Option<f64> {
    let (sum, n) = ids
        .iter()
        .filter_map(|&i| values.get(i).copied().flatten())
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (n != 0).then(|| sum / n as f64)
}

/// Stores the mean of `values` over each enriched n-gram's identifiers under `new_column`.
///
/// N-grams without identifiers get `None`.
pub fn aggregate_mean(ngrams: &mut [NgramRecord], values: &[Option<f64>], new_column: &str) {
    for ngram in ngrams {
        let agg = ngram.ids.as_deref().and_then(|ids| mean_over(values, ids));
        ngram.aggregates.insert(new_column.to_string(), agg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::ngram::NgramVectorizer;
    use crate::tokenizer::tokenize_words;

    fn fitted(texts: &[&str]) -> (Vec<NgramRecord>, WordFrequencyMatrix) {
        let docs: Vec<_> = texts.iter().map(|t| tokenize_words(t)).collect();
        NgramVectorizer::new(1, 1, 1000, false)
            .unwrap()
            .fit_transform(&docs)
    }

    #[test]
    fn test_enrich_all() {
        let (mut ngrams, matrix) = fitted(&["a b", "a c"]);
        enrich_with_ids(&mut ngrams, &matrix, 3);
        let ids: Vec<_> = ngrams.iter().map(|r| r.ids.clone()).collect();
        assert_eq!(vec![Some(vec![0, 1]), Some(vec![0]), Some(vec![1])], ids);
    }

    #[test]
    fn test_enrich_top_only() {
        let (mut ngrams, matrix) = fitted(&["a b", "a c"]);
        enrich_with_ids(&mut ngrams, &matrix, 1);
        assert_eq!(Some(vec![0, 1]), ngrams[0].ids);
        assert_eq!(None, ngrams[1].ids);
        assert_eq!(None, ngrams[2].ids);
    }

    #[test]
    fn test_filter_containing() {
        let (ngrams, _) = fitted(&["apple banana", "grape"]);
        let found = filter_containing(&ngrams, "ap");
        let texts: Vec<_> = found.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(vec!["apple", "grape"], texts);
        assert!(filter_containing(&ngrams, "zzz").is_empty());
    }

    #[test]
    fn test_mean_over_skips_missing() {
        let values = [Some(1.0), None, Some(3.0)];
        assert_eq!(Some(2.0), mean_over(&values, &[0, 1, 2]));
        assert_eq!(None, mean_over(&values, &[1]));
        assert_eq!(None, mean_over(&values, &[]));
    }

    #[test]
    fn test_aggregate_mean() {
        let (mut ngrams, matrix) = fitted(&["a b", "a c"]);
        enrich_with_ids(&mut ngrams, &matrix, 2);
        aggregate_mean(&mut ngrams, &[Some(10.0), Some(20.0)], "Mean Likes");
        assert_eq!(Some(&Some(15.0)), ngrams[0].aggregates.get("Mean Likes"));
        assert_eq!(Some(&Some(10.0)), ngrams[1].aggregates.get("Mean Likes"));
        assert_eq!(Some(&None), ngrams[2].aggregates.get("Mean Likes"));
    }
}
