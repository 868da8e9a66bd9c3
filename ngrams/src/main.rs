use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use clap::Parser;
use posgram::{ArtifactStore, Column, NgramSession, Predictor, RecordSet, RunConfig};
use posgram_preprocess::BasicPreprocessor;
use serde::Serialize;

const TAGGED_COLUMN: &str = "POS Tagged";

#[derive(Parser, Debug)]
#[command(about = "A program to extract ranked n-grams from a CSV record set.")]
struct Args {
    /// Input CSV file with a header row
    #[arg(long)]
    input: PathBuf,

    /// The column holding the text
    #[arg(long, default_value = "Snippet")]
    text_column: String,

    #[arg(long, default_value = "2")]
    min_gram: usize,

    #[arg(long, default_value = "4")]
    max_gram: usize,

    /// Clean, stem and remove stopwords before extraction
    #[arg(long)]
    preprocess: bool,

    /// Language of the stemmer and the stopwords
    #[arg(long, default_value = "english")]
    language: String,

    /// Additional stopwords
    #[arg(long)]
    stopword: Vec<String>,

    /// Remove hashtag words while preprocessing
    #[arg(long)]
    remove_hashtag_words: bool,

    /// Keep @mentions while preprocessing
    #[arg(long)]
    keep_mentions: bool,

    /// Remove stopwords from the cleaned text instead of the stemmed text
    #[arg(long)]
    stopped_not_stemmed: bool,

    /// The maximum number of n-grams to keep
    #[arg(long, default_value = "1000")]
    max_features: usize,

    /// Use raw counts instead of TF-IDF weights in the frequency matrix
    #[arg(long)]
    no_tfidf: bool,

    /// POS tag the text column with this tagger and extract n-grams over the tagged words
    #[arg(long, requires = "model_dir")]
    tag_with: Option<String>,

    /// The directory holding saved taggers
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Keep only the n-grams containing this word
    #[arg(long)]
    search: Option<String>,

    /// Stem the search word
    #[arg(long, requires = "search")]
    stemmed: bool,

    /// The number of top n-grams to link to their records
    #[arg(long, default_value = "300")]
    take_top: usize,

    /// Numeric columns to average over the records of each n-gram
    #[arg(long)]
    aggregate: Vec<String>,

    /// Output CSV file of the n-gram table (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Output CSV file of the non-zero frequency matrix cells
    #[arg(long)]
    matrix: Option<PathBuf>,

    /// Output CSV file of the records with the tagged and preprocessed columns
    #[arg(long)]
    records_out: Option<PathBuf>,

    /// Output file of the fitted vectorizer
    #[arg(long)]
    vectorizer_out: Option<PathBuf>,
}

#[derive(Serialize)]
struct MatrixCell<'a> {
    record: usize,
    ngram: &'a str,
    weight: f64,
}

/// Reads a CSV record set. Columns whose non-empty cells all parse as numbers become numeric.
fn read_records<R>(rdr: R, text_column: &str) -> Result<RecordSet, Box<dyn std::error::Error>>
where
    R: Read,
{
    let mut rdr = csv::Reader::from_reader(rdr);
    let headers = rdr.headers()?.clone();
    let mut cells: Vec<Vec<String>> = vec![vec![]; headers.len()];
    for result in rdr.records() {
        let record = result?;
        for (i, column) in cells.iter_mut().enumerate() {
            column.push(record.get(i).unwrap_or_default().to_string());
        }
    }

    let n_rows = cells.first().map_or(0, Vec::len);
    let mut records = RecordSet::new(n_rows);
    for (name, column) in headers.iter().zip(cells) {
        let numeric: Option<Vec<Option<f64>>> = if name == text_column {
            None
        } else {
            column
                .iter()
                .map(|cell| {
                    let cell = cell.trim();
                    if cell.is_empty() {
                        Some(None)
                    } else {
                        cell.parse().ok().map(Some)
                    }
                })
                .collect()
        };
        let column = match numeric {
            Some(values) => Column::Numeric(values),
            None => Column::Text(column),
        };
        records.push_column(name, column)?;
    }
    Ok(records)
}

fn write_table<W>(wtr: W, session: &NgramSession<BasicPreprocessor>, filtered: bool) -> csv::Result<()>
where
    W: Write,
{
    let table = session.table(filtered);
    let mut wtr = csv::Writer::from_writer(wtr);
    wtr.write_record(&table.header)?;
    for row in &table.rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_records<W>(wtr: W, records: &RecordSet) -> Result<(), Box<dyn std::error::Error>>
where
    W: Write,
{
    let names: Vec<&str> = records.column_names().collect();
    let columns = names
        .iter()
        .map(|name| records.column(name))
        .collect::<posgram::Result<Vec<_>>>()?;
    let mut wtr = csv::Writer::from_writer(wtr);
    wtr.write_record(&names)?;
    for row in 0..records.n_rows() {
        wtr.write_record(columns.iter().map(|c| c.cell_string(row)))?;
    }
    wtr.flush()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    eprintln!("Loading records...");
    let mut records = read_records(File::open(&args.input)?, &args.text_column)?;
    eprintln!("# of records: {}", records.n_rows());

    let mut text_column = args.text_column.clone();
    if let (Some(name), Some(model_dir)) = (&args.tag_with, &args.model_dir) {
        eprintln!("Tagging {text_column:?}...");
        let predictor = Predictor::load(&ArtifactStore::new(model_dir), name)?;
        let tagged = records
            .text(&text_column)?
            .iter()
            .map(|t| predictor.tag_snippet(t))
            .collect();
        records.push_column(TAGGED_COLUMN, Column::Tagged(tagged))?;
        text_column = TAGGED_COLUMN.to_string();
    }

    let preprocessor = BasicPreprocessor::new()
        .remove_hashtag_words(args.remove_hashtag_words)
        .remove_mentioned_authors(!args.keep_mentions)
        .stopped_not_stemmed(args.stopped_not_stemmed);
    let mut session = NgramSession::with_preprocessor(records, text_column, preprocessor)?;
    let outcome = session.run(RunConfig {
        min_gram: args.min_gram,
        max_gram: args.max_gram,
        preprocess: args.preprocess,
        language: args.language,
        adhoc_stopwords: args.stopword,
        max_features: args.max_features,
        tfidf: !args.no_tfidf,
        pos_tuples: args.tag_with.is_some(),
    })?;
    for reason in outcome.reasons() {
        eprintln!("Degraded: {reason}");
    }
    eprintln!("# of n-grams: {}", session.ngrams().len());

    let filtered = match &args.search {
        Some(word) => {
            let n = session.search_on_word(word, args.stemmed);
            eprintln!("# of n-grams containing {word:?}: {n}");
            true
        }
        None => false,
    };

    session.enrich(filtered, args.take_top)?;
    for column in &args.aggregate {
        session.aggregate_other_data_column(column, &format!("Mean {column}"), filtered)?;
    }

    match &args.output {
        Some(path) => write_table(File::create(path)?, &session, filtered)?,
        None => write_table(io::stdout().lock(), &session, filtered)?,
    }

    if let Some(path) = &args.matrix {
        eprintln!("Saving matrix...");
        let matrix = session.matrix();
        let mut wtr = csv::Writer::from_writer(File::create(path)?);
        for record in 0..matrix.n_rows() {
            for (col, weight) in matrix.row(record) {
                wtr.serialize(MatrixCell {
                    record,
                    ngram: &matrix.terms()[col],
                    weight,
                })?;
            }
        }
        wtr.flush()?;
    }

    if let Some(path) = &args.records_out {
        eprintln!("Saving records...");
        write_records(File::create(path)?, session.records())?;
    }

    if let (Some(path), Some(vectorizer)) = (&args.vectorizer_out, session.vectorizer()) {
        eprintln!("Saving vectorizer...");
        let mut f = zstd::Encoder::new(File::create(path)?, 19)?;
        vectorizer.write(&mut f)?;
        f.finish()?;
    }

    Ok(())
}
