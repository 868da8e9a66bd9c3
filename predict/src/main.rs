use std::io::{prelude::*, stdin};
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use posgram::tokenizer::format_tagged;
use posgram::{ArtifactStore, Predictor};

#[derive(Parser, Debug)]
#[command(about = "A program to tag text with a trained POS tagger.")]
struct Args {
    /// The name of the tagger
    #[arg(long, default_value = "simplified_en")]
    name: String,

    /// The directory holding saved taggers
    #[arg(long)]
    model_dir: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    eprintln!("Loading tagger...");
    let store = ArtifactStore::new(args.model_dir);
    let predictor = Predictor::load(&store, &args.name)?;

    eprintln!("Start tagging");
    let mut n_tokens = 0;
    let start = Instant::now();
    for line in stdin().lock().lines() {
        let tagged = predictor.tag_snippet(&line?);
        n_tokens += tagged.len();
        println!("{}", format_tagged(&tagged));
    }
    let duration = start.elapsed();
    eprintln!("Elapsed: {} [sec]", duration.as_secs_f64());
    eprintln!(
        "Speed: {} [tokens/sec]",
        n_tokens as f64 / duration.as_secs_f64()
    );

    Ok(())
}
