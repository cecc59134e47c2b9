use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use docqa_answer::{AnswerComposer, ComposerConfig, InferenceClient, Retriever, Session};
use docqa_core::config::{resolve_with_base, AppConfig, Config};
use docqa_core::extract::{ChunkExtractor, ExtractorConfig};
use docqa_embed::get_default_embedder;
use docqa_vector::{ingest, CorpusStore};

#[derive(Parser)]
#[command(name = "docqa", about = "Ask questions against a folder of PDF and text documents")]
struct Cli {
    /// Store directory (overrides data.store_dir)
    #[arg(long, global = true)]
    store: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract, embed and index every document in DIR, replacing the store
    Ingest {
        /// Documents folder (defaults to data.docs_dir)
        dir: Option<String>,
    },
    /// Answer a single question
    Ask {
        #[arg(default_value = "what is AI")]
        question: String,
        /// Print the retrieved context chunks
        #[arg(long)]
        show_context: bool,
    },
    /// Read questions from stdin, one per line
    Chat,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("docqa=info,warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).with_writer(io::stderr).init();
}

fn store_for(settings: &AppConfig, override_dir: Option<&str>) -> anyhow::Result<CorpusStore> {
    let cwd = std::env::current_dir()?;
    let root: PathBuf = match override_dir {
        Some(dir) => resolve_with_base(&cwd, dir),
        None => resolve_with_base(&cwd, &settings.data.store_dir),
    };
    Ok(CorpusStore::new(root))
}

fn run_ingest(settings: &AppConfig, store: &CorpusStore, dir: Option<String>) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let docs_dir = match dir {
        Some(dir) => resolve_with_base(&cwd, dir),
        None => resolve_with_base(&cwd, &settings.data.docs_dir),
    };
    let extractor = ChunkExtractor::new(ExtractorConfig::from_settings(&settings.chunking, &settings.data));
    let embedder = get_default_embedder(&settings.embedding)?;
    let report = ingest(&extractor, embedder.as_ref(), &docs_dir, store, settings.embedding.batch_size)
        .with_context(|| format!("ingesting {}", docs_dir.display()))?;

    println!("Ingested {} chunks from {} documents into {}", report.chunks, report.documents, store.root().display());
    for skipped in &report.skipped {
        println!("  skipped {}: {}", skipped.path.display(), skipped.reason);
    }
    Ok(())
}

fn open_pipeline(settings: &AppConfig, store: &CorpusStore) -> anyhow::Result<(Retriever, AnswerComposer)> {
    let embedder = get_default_embedder(&settings.embedding)?;
    let retriever = Retriever::open(store, Arc::from(embedder), settings.retrieval.top_k)
        .with_context(|| format!("opening store at {} (run `docqa ingest` first)", store.root().display()))?;
    info!(chunks = retriever.corpus().len(), "corpus loaded");
    let client = InferenceClient::new(&settings.generation)?;
    let composer = AnswerComposer::new(Arc::new(client), ComposerConfig::from_settings(&settings.generation));
    Ok((retriever, composer))
}

fn print_turn(turn: &docqa_answer::ConversationTurn, show_context: bool) {
    if show_context {
        for hit in turn.context() {
            println!("[{:.4}] {} p.{}: {}", hit.distance, hit.chunk.source, hit.chunk.page, hit.chunk.text);
        }
    }
    println!("Question: {}", turn.question());
    println!("Answer: {}", turn.answer().unwrap_or_default());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = Config::load()?;
    let settings = config.settings()?;
    let store = store_for(&settings, cli.store.as_deref())?;

    match cli.command {
        Command::Ingest { dir } => run_ingest(&settings, &store, dir)?,
        Command::Ask { question, show_context } => {
            let (retriever, composer) = open_pipeline(&settings, &store)?;
            let mut session = Session::new();
            let turn = session.ask(&question, &retriever, &composer).await?;
            print_turn(turn, show_context);
        }
        Command::Chat => {
            let (retriever, composer) = open_pipeline(&settings, &store)?;
            let mut session = Session::new();
            let stdin = io::stdin();
            print!("> ");
            io::stdout().flush()?;
            for line in stdin.lock().lines() {
                let line = line?;
                let question = line.trim();
                if question.is_empty() {
                    print!("> ");
                    io::stdout().flush()?;
                    continue;
                }
                if question == "exit" || question == "quit" {
                    break;
                }
                let turn = session.ask(question, &retriever, &composer).await?;
                print_turn(turn, false);
                print!("> ");
                io::stdout().flush()?;
            }
        }
    }
    Ok(())
}
