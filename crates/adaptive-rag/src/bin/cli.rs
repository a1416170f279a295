//! Adaptive RAG command line
//!
//! Run with: cargo run -p adaptive-rag --features cli --bin adaptive-rag -- --mode example

use std::io::{self, BufRead};
use std::path::PathBuf;

use adaptive_rag::config::{RagConfig, RouterMode};
use adaptive_rag::{graph, Outcome, Pipeline, RunFailure};
use clap::{Parser, ValueEnum};
use console::{style, Term};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const EXAMPLE_QUESTIONS: &[&str] = &[
    "What are the types of agent memory?",
    "What is prompt engineering?",
    "What player at the Bears expected to draft first in the 2024 NFL draft?",
    "What's the latest news about OpenAI?",
];

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Read questions from the terminal
    Interactive,
    /// Run the built-in example questions
    Example,
    /// Answer one question given with --question
    Single,
    /// Print the decision graph and exit
    Graph,
}

#[derive(Debug, Parser)]
#[command(name = "adaptive-rag", version, about = "Adaptive RAG question answering")]
struct Cli {
    #[arg(long, value_enum, default_value_t = Mode::Interactive)]
    mode: Mode,
    /// Question for single mode
    #[arg(long, short)]
    question: Option<String>,
    /// JSON corpus for the document store
    #[arg(long)]
    corpus: Option<PathBuf>,
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Route with the keyword router instead of the LLM
    #[arg(long)]
    keyword_router: bool,
    /// Print the node trace after every run
    #[arg(long, short)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "adaptive_rag=debug" } else { "adaptive_rag=warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Mode::Graph = cli.mode {
        print_graph();
        return Ok(());
    }

    let mut config = RagConfig::load(cli.config.as_deref())?;
    if let Some(corpus) = &cli.corpus {
        config.retrieval.corpus_path = Some(corpus.display().to_string());
    }
    if cli.keyword_router {
        config.router.mode = RouterMode::Keyword;
    }

    let pipeline = Pipeline::from_config(&config)?;
    if !pipeline.llm.health_check().await.unwrap_or(false) {
        eprintln!(
            "{} Ollama is not reachable at {} (try: ollama serve && ollama pull {})",
            style("warning:").yellow().bold(),
            config.llm.base_url,
            config.llm.model
        );
    }

    match cli.mode {
        Mode::Single => {
            let question = cli
                .question
                .ok_or_else(|| anyhow::anyhow!("--mode single requires --question"))?;
            ask(&pipeline, &question, cli.verbose).await;
        }
        Mode::Example => {
            for (i, question) in EXAMPLE_QUESTIONS.iter().enumerate() {
                println!(
                    "\n{} {}",
                    style(format!("Example {}/{}", i + 1, EXAMPLE_QUESTIONS.len())).cyan().bold(),
                    question
                );
                ask(&pipeline, question, cli.verbose).await;
            }
        }
        Mode::Interactive => interactive(&pipeline, cli.verbose).await?,
        Mode::Graph => print_graph(),
    }

    Ok(())
}

async fn interactive(pipeline: &Pipeline, verbose: bool) -> anyhow::Result<()> {
    let term = Term::stdout();
    let stdin = io::stdin();
    let mut input = stdin.lock();
    println!("{}", style("Adaptive RAG").green().bold());
    print_help();

    loop {
        term.write_str(&format!("\n{} ", style("question>").cyan().bold()))?;
        let Some(line) = next_line(&mut input)? else {
            break;
        };

        match line.to_ascii_lowercase().as_str() {
            "" => continue,
            "quit" | "exit" | "q" => break,
            "help" => print_help(),
            "graph" => print_graph(),
            _ => ask(pipeline, &line, verbose).await,
        }
    }

    println!("Bye.");
    Ok(())
}

/// Next trimmed input line, `None` at end of input
fn next_line<R: BufRead>(reader: &mut R) -> io::Result<Option<String>> {
    let mut buf = String::new();
    if reader.read_line(&mut buf)? == 0 {
        return Ok(None);
    }
    Ok(Some(buf.trim().to_string()))
}

async fn ask(pipeline: &Pipeline, question: &str, verbose: bool) {
    match pipeline.orchestrator.run(question).await {
        Ok(outcome) => print_outcome(&outcome, verbose),
        Err(failure) => print_failure(&failure, verbose),
    }
}

fn print_outcome(outcome: &Outcome, verbose: bool) {
    match outcome {
        Outcome::Answered(answer) => {
            println!("{} {}", style("Answer:").green().bold(), answer.answer());
            if answer.question() != answer.original_question() {
                println!("{} {}", style("Rewritten as:").dim(), answer.question());
            }
        }
        Outcome::NoAnswer(no_answer) => {
            println!("{} {}", style("No answer:").yellow().bold(), no_answer.reason());
        }
    }
    println!(
        "{}",
        style(format!(
            "{} steps, {} rewrites",
            outcome.trace().len(),
            outcome.loop_count()
        ))
        .dim()
    );
    if verbose {
        print!("{}", outcome.trace());
    }
}

fn print_failure(failure: &RunFailure, verbose: bool) {
    println!("{} {}", style("Error:").red().bold(), failure.error);
    if verbose && !failure.trace.is_empty() {
        print!("{}", failure.trace);
    }
}

fn print_help() {
    println!("Type a question, or one of:");
    println!("  help   show this message");
    println!("  graph  show the decision graph");
    println!("  quit   exit (also: exit, q)");
}

fn print_graph() {
    println!("{}", graph::describe());
}
