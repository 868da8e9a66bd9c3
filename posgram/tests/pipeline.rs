#![cfg(feature = "train")]

use posgram::tokenizer::{parse_tagged_line, rejoin_tagged, split_tagged};
use posgram::{
    is_canonical, tag_snippet, ArtifactStore, Column, NgramSession, PosgramError, Predictor,
    RecordSet, RunConfig, TaggedSentence, TrainConfig,
};

fn corpus() -> Vec<TaggedSentence> {
    [
        "The/AT dog/NN barked/VBD ./.",
        "The/AT cat/NN jumped/VBD over/IN the/AT dog/NN ./.",
        "I/PPSS like/VB the/AT dog/NN ./.",
        "She/PPS walked/VBD the/AT dog/NN home/NR ./.",
        "The/AT dogs/NNS were/BED barking/VBG ./.",
    ]
    .iter()
    .map(|l| parse_tagged_line(l).unwrap())
    .collect()
}

#[test]
fn test_train_save_load_tag() {
    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(dir.path());
    let config = TrainConfig {
        train_ratio: 1.0,
        seed: Some(0),
        ..TrainConfig::default()
    };
    let artifact = posgram::train_and_save(corpus(), config, &store).unwrap();
    assert!(store.exists("simplified_en").unwrap());
    assert_eq!(None, artifact.accuracy());

    let tagged = tag_snippet("The dog barked. The cat slept!", "simplified_en", &store).unwrap();
    let words: Vec<_> = tagged.iter().map(|(w, _)| w.as_str()).collect();
    assert_eq!(
        vec!["The", "dog", "barked", ".", "The", "cat", "slept", "!"],
        words
    );
    assert!(tagged.iter().all(|(_, t)| is_canonical(t)));
    assert_eq!("NN", tagged[1].1);
    assert_eq!("VB", tagged[2].1);

    let predictor = Predictor::load(&store, "simplified_en").unwrap();
    assert_eq!(tagged, predictor.tag_snippet("The dog barked. The cat slept!"));
}

#[test]
fn test_missing_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(dir.path());
    assert!(matches!(
        tag_snippet("text", "nothing", &store),
        Err(PosgramError::ArtifactNotFound { .. })
    ));
}

#[test]
fn test_split_rejoin_tagged() {
    for sentence in corpus() {
        let (tokens, tags) = split_tagged(&sentence);
        assert_eq!(sentence, rejoin_tagged(&tokens, &tags, &tokens));
    }
}

#[test]
fn test_tagged_records_to_ngrams() {
    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(dir.path());
    let config = TrainConfig {
        train_ratio: 1.0,
        ..TrainConfig::default()
    };
    posgram::train_and_save(corpus(), config, &store).unwrap();
    let predictor = Predictor::load(&store, "simplified_en").unwrap();

    let snippets = ["The dog barked", "The dog slept", "A cat"];
    let tagged: Vec<_> = snippets.iter().map(|s| predictor.tag_snippet(s)).collect();
    let records = RecordSet::from_tagged("Tagged", tagged);
    let mut session = NgramSession::new(records, "Tagged").unwrap();
    session
        .run(RunConfig {
            pos_tuples: true,
            ..RunConfig::default()
        })
        .unwrap();
    session.enrich(false, 10).unwrap();
    let first = &session.ngrams()[0];
    assert_eq!("The dog", first.text);
    assert_eq!(2, first.frequency);
    assert_eq!(Some(vec!["OT".to_string(), "NN".to_string()]), first.tags);
    assert_eq!(Some(vec![0, 1]), first.ids);
}

fn records() -> RecordSet {
    let texts = vec!["a b".to_string(), "a c".to_string()];
    let mut records = RecordSet::from_texts("Snippet", texts);
    records
        .push_column("Likes", Column::Numeric(vec![Some(4.0), Some(8.0)]))
        .unwrap();
    records
}

fn unigrams() -> RunConfig {
    RunConfig {
        min_gram: 1,
        max_gram: 1,
        tfidf: false,
        ..RunConfig::default()
    }
}

#[test]
fn test_ngram_pipeline() {
    let mut session = NgramSession::new(records(), "Snippet").unwrap();
    session.run(unigrams()).unwrap();

    let freqs: Vec<_> = session
        .ngrams()
        .iter()
        .map(|r| (r.text.as_str(), r.frequency))
        .collect();
    assert_eq!(vec![("a", 2), ("b", 1), ("c", 1)], freqs);
    let matrix = session.matrix();
    assert_eq!(vec![(0, 1.0), (1, 1.0)], matrix.row(0).collect::<Vec<_>>());
    assert_eq!(vec![(0, 1.0), (2, 1.0)], matrix.row(1).collect::<Vec<_>>());

    assert!(matches!(
        session.aggregate_other_data_column("Likes", "Mean Likes", false),
        Err(PosgramError::NotEnriched)
    ));

    session.enrich(false, 3).unwrap();
    assert_eq!(Some(vec![0, 1]), session.ngrams()[0].ids);
    assert_eq!(Some(vec![0]), session.ngrams()[1].ids);

    assert_eq!(1, session.search_on_word("b", false));
    assert_eq!("b", session.filtered().unwrap()[0].text);

    session
        .aggregate_other_data_column("Likes", "Mean Likes", false)
        .unwrap();
    assert_eq!(
        Some(&Some(6.0)),
        session.ngrams()[0].aggregates.get("Mean Likes")
    );
}

#[test]
fn test_run_is_idempotent() {
    let config = RunConfig {
        min_gram: 1,
        max_gram: 2,
        ..RunConfig::default()
    };
    let mut session = NgramSession::new(records(), "Snippet").unwrap();
    session.run(config.clone()).unwrap();
    let table = session.table(false);
    let matrix = session.matrix().clone();

    session.run(config).unwrap();
    assert_eq!(table, session.table(false));
    assert_eq!(&matrix, session.matrix());
}
