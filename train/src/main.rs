use std::fs::File;
use std::io::{prelude::*, stderr, BufReader};
use std::path::PathBuf;

use clap::Parser;
use posgram::tokenizer::parse_tagged_line;
use posgram::{train_and_save, ArtifactStore, Fallback, Tagset, TrainConfig};

#[derive(Parser, Debug)]
#[command(about = "A program to train backoff POS taggers.")]
struct Args {
    /// A tagged training corpus: one sentence per line, `word/TAG` tokens separated by spaces
    #[arg(long, required = true)]
    corpus: Vec<PathBuf>,

    /// The name to save the tagger under
    #[arg(long, default_value = "simplified_en")]
    name: String,

    /// The directory holding saved taggers
    #[arg(long)]
    model_dir: PathBuf,

    /// The tagset of the corpus: {brown, parole}
    #[arg(long, default_value = "brown")]
    tagset: String,

    /// Keep the corpus tags instead of mapping them to the canonical tagset
    #[arg(long)]
    no_simplify: bool,

    /// Fall back to the default tag of the tagset instead of regex patterns
    #[arg(long)]
    default_tag: bool,

    /// The language of the regex fallback patterns
    #[arg(long, default_value = "en")]
    regex_language: String,

    /// The probability of a sentence being used for training rather than evaluation
    #[arg(long, default_value = "0.8")]
    split: f64,

    /// Seed of the train/test split. Unseeded splits differ between runs.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let tagset: Tagset = args.tagset.parse()?;

    eprintln!("Loading corpus...");
    let mut corpus = vec![];
    for path in args.corpus {
        eprintln!("Loading {path:?} ...");
        let f = BufReader::new(File::open(path)?);
        for (i, line) in f.lines().enumerate() {
            if i % 10000 == 0 {
                eprint!("# of sentences: {i}\r");
                stderr().flush()?;
            }
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            corpus.push(parse_tagged_line(&line)?);
        }
        eprintln!("# of sentences: {}", corpus.len());
    }

    let config = TrainConfig {
        name: args.name,
        tagset,
        simplify: !args.no_simplify,
        fallback: if args.default_tag {
            Fallback::Default
        } else {
            Fallback::Regex
        },
        regex_language: args.regex_language,
        train_ratio: args.split,
        seed: args.seed,
    };

    eprintln!("Start training...");
    let store = ArtifactStore::new(args.model_dir);
    let artifact = train_and_save(corpus, config, &store)?;
    eprintln!("Finish training.");
    match artifact.accuracy() {
        Some(accuracy) => println!("Accuracy: {accuracy}"),
        None => println!("Accuracy: not measured (empty test split)"),
    }

    Ok(())
}
