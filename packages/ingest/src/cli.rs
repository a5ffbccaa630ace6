//! Command-line interface for statute ingestion.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use crate::chunking::{TiktokenCounter, TokenCounter};
use crate::config::{PipelineConfig, DEFAULT_MAX_TOKENS};
use crate::error::{IngestError, Result};
use crate::normalize::{Normalizer, RepairRules};
use crate::pipeline::{
    layout_output_path, process_layout_file, process_statute_file, statute_output_path,
    write_output, OutputDocument,
};

/// Widest line `inspect` wraps to.
const MAX_WRAP_WIDTH: usize = 100;

/// lawchunk - Parse Korean statutes into retrieval chunks.
#[derive(Parser)]
#[command(name = "lawchunk")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Process PDF layout documents (JSON from the layout engine).
    Pdf(BatchArgs),

    /// Chunk statute JSON from the national law information API.
    Json(BatchArgs),

    /// Print the chunks of a layout document.
    Inspect {
        /// Layout document (JSON)
        input: PathBuf,

        /// Only show this article (e.g., 제24조)
        #[arg(short, long)]
        article: Option<String>,

        /// Token budget per chunk
        #[arg(long, default_value_t = DEFAULT_MAX_TOKENS)]
        max_tokens: usize,

        /// Word-break repair rule table (JSON)
        #[arg(long)]
        rules: Option<PathBuf>,
    },
}

/// Arguments shared by the batch commands.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    pub output: PathBuf,

    /// Token budget per chunk
    #[arg(long, default_value_t = DEFAULT_MAX_TOKENS)]
    pub max_tokens: usize,

    /// Word-break repair rule table (JSON)
    #[arg(long)]
    pub rules: Option<PathBuf>,

    /// Number of worker threads (default: one per CPU)
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

/// Input format of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputKind {
    Layout,
    Statute,
}

impl InputKind {
    fn process(
        self,
        path: &Path,
        config: &PipelineConfig,
        counter: &TiktokenCounter,
    ) -> Result<OutputDocument> {
        match self {
            Self::Layout => process_layout_file(path, config, counter),
            Self::Statute => process_statute_file(path, config, counter),
        }
    }

    fn output_path(self, dir: &Path, input: &Path) -> PathBuf {
        match self {
            Self::Layout => layout_output_path(dir, input),
            Self::Statute => statute_output_path(dir, input),
        }
    }
}

/// What one successful document produced.
struct Written {
    path: PathBuf,
    articles: usize,
    annexes: usize,
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Pdf(args) => batch_command(InputKind::Layout, &args),
        Commands::Json(args) => batch_command(InputKind::Statute, &args),
        Commands::Inspect {
            input,
            article,
            max_tokens,
            rules,
        } => inspect_command(&input, article.as_deref(), max_tokens, rules.as_deref()),
    }
}

/// Build pipeline settings from command-line flags.
fn build_config(max_tokens: usize, rules: Option<&Path>) -> Result<PipelineConfig> {
    let config = PipelineConfig::new().with_max_tokens(max_tokens)?;
    match rules {
        Some(path) => {
            let rules = RepairRules::from_json_file(path)?;
            Ok(config.with_normalizer(Normalizer::default().with_rules(rules)))
        }
        None => Ok(config),
    }
}

/// Execute a batch command. One failed document never stops the others.
fn batch_command(kind: InputKind, args: &BatchArgs) -> Result<()> {
    let config = build_config(args.max_tokens, args.rules.as_deref())?;
    let counter = TiktokenCounter::cl100k()?;
    std::fs::create_dir_all(&args.output)?;

    println!(
        "{} {} document(s) into {} (budget {} tokens, rules {})",
        style("Processing").bold(),
        style(args.inputs.len()).cyan(),
        style(args.output.display()).green(),
        config.max_tokens,
        config.normalizer.rules().version()
    );

    let pb = ProgressBar::new(args.inputs.len() as u64);
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.green/dim} {pos}/{len} {msg}")
            .expect("valid template"),
    );

    let process_one = |input: &PathBuf| {
        let result = kind
            .process(input, &config, &counter)
            .and_then(|document| {
                let path = kind.output_path(&args.output, input);
                write_output(&document, &path)?;
                Ok(Written {
                    path,
                    articles: document.articles.len(),
                    annexes: document.annexes.len(),
                })
            })
            .map_err(|e| e.in_document(input.display().to_string()));
        pb.inc(1);
        result
    };

    let results: Vec<Result<Written>> = match args.jobs {
        Some(jobs) => rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()?
            .install(|| args.inputs.par_iter().map(process_one).collect()),
        None => args.inputs.par_iter().map(process_one).collect(),
    };
    pb.finish_and_clear();

    let mut failed = 0;
    for result in &results {
        match result {
            Ok(written) => println!(
                "  {} {} ({} articles, {} annexes)",
                style("✓").green(),
                written.path.display(),
                written.articles,
                written.annexes
            ),
            Err(e) => {
                failed += 1;
                tracing::error!(error = %e, "Document failed");
                eprintln!("  {} {e}", style("✗").red().bold());
            }
        }
    }

    if failed > 0 {
        return Err(IngestError::BatchFailed {
            failed,
            total: results.len(),
        });
    }

    println!();
    println!("{}", style("Done.").green().bold());
    Ok(())
}

/// Execute the inspect command.
fn inspect_command(
    input: &Path,
    article: Option<&str>,
    max_tokens: usize,
    rules: Option<&Path>,
) -> Result<()> {
    let config = build_config(max_tokens, rules)?;
    let counter = TiktokenCounter::cl100k()?;
    let document = process_layout_file(input, &config, &counter)
        .map_err(|e| e.in_document(input.display().to_string()))?;

    let selected: Vec<_> = document
        .articles
        .iter()
        .filter(|a| article.map_or(true, |number| a.article.number == number))
        .collect();
    if let (Some(number), true) = (article, selected.is_empty()) {
        return Err(IngestError::ArticleNotFound(number.to_string()));
    }

    println!(
        "{} {} ({} articles, {} annexes)",
        style("Law:").bold(),
        style(document.law_name.as_deref().unwrap_or("?")).green(),
        document.articles.len(),
        document.annexes.len()
    );

    let width = usize::from(Term::stdout().size().1).clamp(20, MAX_WRAP_WIDTH);
    for chunked in selected {
        let a = &chunked.article;
        println!();
        println!(
            "{} {}  {}",
            style(&a.number).cyan().bold(),
            a.title,
            style(format!(
                "p.{}",
                a.page_number.map_or_else(|| "?".to_string(), |p| p.to_string())
            ))
            .dim()
        );
        let total = chunked.embedding_chunks.len();
        for (i, chunk) in chunked.embedding_chunks.iter().enumerate() {
            let tokens = counter.count_tokens(chunk)?;
            println!(
                "{}",
                style(format!("-- chunk {}/{total}, {tokens} tokens --", i + 1)).dim()
            );
            for line in chunk.lines() {
                println!("{}", wrap_line(line, width));
            }
        }
        if !chunked.all_change_dates.is_empty() {
            println!(
                "{} {}",
                style("changes:").yellow(),
                chunked.all_change_dates.join(", ")
            );
        }
    }

    Ok(())
}

/// Wrap a chunk line, keeping its indentation on continuation lines.
fn wrap_line(line: &str, width: usize) -> String {
    let indent = &line[..line.len() - line.trim_start().len()];
    let continuation = format!("{indent}  ");
    textwrap::fill(
        line,
        textwrap::Options::new(width).subsequent_indent(&continuation),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_parse_pdf() {
        let cli = Cli::parse_from(["lawchunk", "pdf", "a.json", "b.json", "-o", "out"]);

        let Commands::Pdf(args) = cli.command else {
            panic!("expected pdf command");
        };
        assert_eq!(args.inputs, vec![PathBuf::from("a.json"), PathBuf::from("b.json")]);
        assert_eq!(args.output, PathBuf::from("out"));
        assert_eq!(args.max_tokens, DEFAULT_MAX_TOKENS);
        assert!(args.rules.is_none());
        assert!(args.jobs.is_none());
    }

    #[test]
    fn test_cli_parse_json_with_options() {
        let cli = Cli::parse_from([
            "lawchunk",
            "json",
            "law_clean.json",
            "--output",
            "out",
            "--max-tokens",
            "256",
            "--rules",
            "rules.json",
            "-j",
            "2",
        ]);

        let Commands::Json(args) = cli.command else {
            panic!("expected json command");
        };
        assert_eq!(args.max_tokens, 256);
        assert_eq!(args.rules, Some(PathBuf::from("rules.json")));
        assert_eq!(args.jobs, Some(2));
    }

    #[test]
    fn test_cli_parse_inspect() {
        let cli = Cli::parse_from(["lawchunk", "inspect", "doc.json", "--article", "제24조"]);

        let Commands::Inspect {
            input, article, ..
        } = cli.command
        else {
            panic!("expected inspect command");
        };
        assert_eq!(input, PathBuf::from("doc.json"));
        assert_eq!(article.as_deref(), Some("제24조"));
    }

    #[test]
    fn test_cli_requires_inputs() {
        assert!(Cli::try_parse_from(["lawchunk", "pdf", "-o", "out"]).is_err());
    }

    #[test]
    fn test_build_config_rejects_zero_budget() {
        assert!(matches!(
            build_config(0, None),
            Err(IngestError::InvalidMaxTokens(0))
        ));
        assert_eq!(build_config(64, None).unwrap().max_tokens, 64);
    }

    #[test]
    fn test_wrap_line_keeps_indent() {
        let wrapped = wrap_line("  제1호 추락 위험이 있는 장소에서 작업하는 경우", 16);
        let lines: Vec<&str> = wrapped.lines().collect();
        assert!(lines.len() > 1);
        assert!(lines[0].starts_with("  제1호"));
        assert!(lines[1..].iter().all(|l| l.starts_with("    ")));
    }
}
