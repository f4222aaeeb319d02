//! Reel CLI - Command-line interface
//!
//! Usage:
//!   reel candidates --transcript <file> [--corpus <tsv>] [--output <file>]
//!   reel match --transcript <file> --tokens <conllu> [--corpus <tsv>]
//!   reel evaluate --predicted <file> --gold <file>
//!
//! Tagging is done outside: run `candidates`, tag the rewritten transcript
//! it writes (CoNLL-U), then run `match` on the result.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;

use reel_core::{AppConfig, CandidateTitle, LoggingConfig, TitleCorpus};
use reel_extractor::conllu::parse_conllu;
use reel_extractor::metrics::{EvaluationReport, Evaluator};
use reel_extractor::{match_corpus, TitleRecognizer};

#[derive(Parser)]
#[command(name = "reel")]
#[command(about = "Film title recognition in podcast transcripts")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find corpus titles in a transcript and join multi-word ones
    Candidates {
        /// Transcript text file
        #[arg(long)]
        transcript: PathBuf,
        /// Title corpus TSV (overrides the configured path)
        #[arg(long)]
        corpus: Option<PathBuf>,
        /// Where to write the rewritten transcript for tagging
        #[arg(long)]
        output: Option<PathBuf>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Confirm candidates with the grammar rules over tagged tokens
    Match {
        /// Transcript text file
        #[arg(long)]
        transcript: PathBuf,
        /// CoNLL-U tokens tagged from the rewritten transcript
        #[arg(long)]
        tokens: PathBuf,
        /// Title corpus TSV (overrides the configured path)
        #[arg(long)]
        corpus: Option<PathBuf>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Score recognized titles against a gold list
    Evaluate {
        /// Recognized titles, one per line
        #[arg(long)]
        predicted: PathBuf,
        /// Expected titles, one per line
        #[arg(long)]
        gold: PathBuf,
        /// Compare titles with exact case
        #[arg(long)]
        case_sensitive: bool,
    },
}

#[derive(Serialize)]
struct CandidatesOutput<'a> {
    candidates: &'a [CandidateTitle],
    rewritten_transcript: &'a str,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };
    init_tracing(&config.logging);

    match cli.command {
        Commands::Candidates {
            transcript,
            corpus,
            output,
            json,
        } => {
            let text = read_transcript(&transcript)?;
            let corpus = load_corpus(&config, corpus)?;
            let lexical = match_corpus(&text, &corpus)?;

            if let Some(path) = &output {
                std::fs::write(path, &lexical.rewritten_transcript)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                tracing::info!("Rewritten transcript written to {}", path.display());
            }

            if json {
                let out = CandidatesOutput {
                    candidates: &lexical.candidates,
                    rewritten_transcript: &lexical.rewritten_transcript,
                };
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                for candidate in &lexical.candidates {
                    println!("{}\t{}", candidate.id, candidate.text);
                }
                if output.is_none() {
                    println!();
                    println!("{}", lexical.rewritten_transcript);
                }
            }
        }
        Commands::Match {
            transcript,
            tokens,
            corpus,
            json,
        } => {
            let text = read_transcript(&transcript)?;
            let corpus = load_corpus(&config, corpus)?;
            let lexical = match_corpus(&text, &corpus)?;

            let conllu = std::fs::read_to_string(&tokens)
                .with_context(|| format!("failed to read {}", tokens.display()))?;
            let tokens = parse_conllu(&conllu)?;

            let recognition = TitleRecognizer::new().recognize_tagged(lexical, &tokens);

            if json {
                println!("{}", serde_json::to_string_pretty(&recognition)?);
            } else {
                for m in &recognition.matches {
                    tracing::debug!(rule = %m.rule_id, "Matched text: {}", m.matched_text);
                }
                for title in &recognition.titles {
                    println!("{title}");
                }
            }
        }
        Commands::Evaluate {
            predicted,
            gold,
            case_sensitive,
        } => {
            let predicted = read_lines(&predicted)?;
            let gold = read_lines(&gold)?;

            let evaluator = if case_sensitive {
                Evaluator::new().case_sensitive()
            } else {
                Evaluator::new()
            };

            let mut report = EvaluationReport::default();
            report.add(&evaluator.evaluate(&predicted, &gold));
            print!("{}", report.report());
        }
    }

    Ok(())
}

fn init_tracing(config: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Transcripts hold one recognized chunk per line
fn read_transcript(path: &Path) -> anyhow::Result<String> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read transcript {}", path.display()))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" "))
}

fn read_lines(path: &Path) -> anyhow::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}

fn load_corpus(config: &AppConfig, path: Option<PathBuf>) -> anyhow::Result<TitleCorpus> {
    let path = match path {
        Some(path) => path,
        None => config.corpus_path()?.clone(),
    };

    let corpus = TitleCorpus::from_tsv_file(&path, &config.corpus)
        .with_context(|| format!("failed to load title corpus {}", path.display()))?;
    tracing::info!(titles = corpus.len(), "Title corpus loaded");
    Ok(corpus)
}
