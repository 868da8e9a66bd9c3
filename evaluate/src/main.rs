use std::io::{prelude::*, stdin};
use std::path::PathBuf;

use clap::Parser;
use posgram::tokenizer::parse_tagged_line;
use posgram::{evaluate, ArtifactStore};

#[derive(Parser, Debug)]
#[command(about = "A program to evaluate the accuracy of a trained POS tagger.")]
struct Args {
    /// The name of the tagger
    #[arg(long, default_value = "simplified_en")]
    name: String,

    /// The directory holding saved taggers
    #[arg(long)]
    model_dir: PathBuf,

    /// Compare against the gold tags as they are, even if the tagger was trained on simplified
    /// tags
    #[arg(long)]
    no_simplify: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    eprintln!("Loading tagger...");
    let store = ArtifactStore::new(args.model_dir);
    let artifact = store.load(&args.name)?;
    let table = (artifact.simplified() && !args.no_simplify)
        .then(|| artifact.tagset().simplification_table());

    eprintln!("Start tagging");
    let mut gold = vec![];
    for line in stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let mut sentence = parse_tagged_line(&line)?;
        if let Some(table) = &table {
            for (_, tag) in &mut sentence {
                *tag = table.simplify(tag);
            }
        }
        gold.push(sentence);
    }

    let n_tokens: usize = gold.iter().map(Vec::len).sum();
    match evaluate(artifact.tagger(), &gold) {
        Some(accuracy) => {
            println!("Accuracy: {accuracy}");
            println!("# of tokens: {n_tokens}");
        }
        None => println!("No tokens to evaluate"),
    }

    Ok(())
}
