//! CupChat CLI - ask the World Cup assistant from a terminal
//!
//! # Commands
//!
//! ```bash
//! # Build (or validate) the embedding cache for the snippet table
//! cupchat index --csv chunked_worldcup_data.csv
//!
//! # Show which snippets a question retrieves
//! cupchat search "Who won the 2022 world cup?" -k 5
//!
//! # Ask one question
//! cupchat ask "Who won the 2022 world cup?"
//!
//! # Interactive conversation with follow-up questions
//! cupchat chat
//! ```

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use cupchat_lib::{
    answer::History,
    chat::{ChatEngine, Turn},
    config::{EngineConfig, GenerationConfig},
    document::load_csv,
    embed::{Embedder, EmbeddingCache, FastEmbedder, LocalModel},
    llm::ChatCompletionsClient,
    store::{Corpus, SearchResult},
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cupchat")]
#[command(about = "Ask anything about the FIFA World Cup and get document-grounded answers")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    corpus: CorpusArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CorpusArgs {
    /// Snippet table with a `text` column and optional `year`, `page`
    #[arg(long, env = "CUPCHAT_CSV", default_value = "chunked_worldcup_data.csv", global = true)]
    csv: String,

    /// Embedding cache file, rebuilt when its size does not match the table
    #[arg(long, env = "CUPCHAT_CACHE", default_value = "worldcup_embeddings.json", global = true)]
    cache: String,

    /// Local embedding model: "minilm" or "bge"
    #[arg(long, default_value = "minilm", global = true)]
    model: LocalModel,
}

#[derive(Args)]
struct GenerationArgs {
    /// API key for the chat completions service
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// OpenAI-compatible base URL
    #[arg(long, env = "CUPCHAT_BASE_URL", default_value = "https://api.groq.com/openai/v1")]
    base_url: String,

    /// Chat model used for reformulation and answers
    #[arg(long, env = "CUPCHAT_MODEL", default_value = "llama3-70b-8192")]
    llm: String,

    /// Request timeout in seconds
    #[arg(long, default_value = "60")]
    timeout: u64,

    /// Number of snippets given to the model
    #[arg(short, long, default_value = "10")]
    k: usize,

    /// Number of paraphrases used for retrieval
    #[arg(short, long, default_value = "3")]
    n: usize,

    /// Sampling temperature for paraphrases (answers always use 0.7)
    #[arg(long, default_value = "0.7")]
    temperature: f32,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the snippet table and build or validate the embedding cache
    Index,

    /// Show the snippets retrieved for a question
    Search {
        /// Question to retrieve for
        query: String,

        #[command(flatten)]
        generation: GenerationArgs,
    },

    /// Answer a single question
    Ask {
        /// Question to answer
        question: String,

        /// Print the retrieved snippets after the answer
        #[arg(short, long)]
        sources: bool,

        #[command(flatten)]
        generation: GenerationArgs,
    },

    /// Interactive conversation (/history, /reset, /quit)
    Chat {
        /// Print the retrieved snippets after each answer
        #[arg(short, long)]
        sources: bool,

        #[command(flatten)]
        generation: GenerationArgs,
    },
}

type Engine = ChatEngine<FastEmbedder, ChatCompletionsClient>;

fn load_corpus(args: &CorpusArgs) -> Result<(FastEmbedder, Corpus)> {
    let documents = load_csv(&args.csv).with_context(|| format!("failed to load '{}'", args.csv))?;

    eprintln!("Loading {} embedding model...", args.model);
    let mut embedder = FastEmbedder::new(args.model).context("failed to load embedding model")?;

    let embeddings = EmbeddingCache::new(&args.cache)
        .get_or_build(&mut embedder, &documents)
        .context("failed to build document embeddings")?;
    let corpus = Corpus::new(documents, embeddings)?;
    if let Some(dimension) = corpus.dimension() {
        anyhow::ensure!(
            dimension == embedder.dimension(),
            "cached embeddings have dimension {dimension}, {} produces {}",
            embedder.model_name(),
            embedder.dimension()
        );
    }
    tracing::info!(documents = corpus.len(), model = embedder.model_name(), "corpus ready");
    Ok((embedder, corpus))
}

fn build_engine(corpus_args: &CorpusArgs, args: &GenerationArgs) -> Result<Engine> {
    let generation = GenerationConfig {
        base_url: args.base_url.clone(),
        model: args.llm.clone(),
        api_key: args.api_key.clone(),
        timeout_secs: args.timeout,
    };
    let generator = ChatCompletionsClient::new(&generation)
        .context("GROQ_API_KEY (or --api-key) must be set to talk to the model")?;

    let (embedder, corpus) = load_corpus(corpus_args)?;
    let config = EngineConfig {
        top_k: args.k,
        reformulations: args.n,
        reformulation_temperature: args.temperature,
    };
    Ok(ChatEngine::new(embedder, generator, Arc::new(corpus), config))
}

fn print_sources(results: &[SearchResult]) {
    for (i, result) in results.iter().enumerate() {
        let doc = &result.document;
        let year = doc.year.as_deref().unwrap_or("-");
        let page = doc.page.as_deref().unwrap_or("-");
        println!("#{} (score: {:.4}, year: {year}, page: {page}, id: {})", i + 1, result.score, doc.fingerprint());
        let flat = doc.content.trim().replace('\n', " ");
        let preview: String = flat.chars().take(200).collect();
        let ellipsis = if flat.chars().count() > 200 { "..." } else { "" };
        println!("{preview}{ellipsis}\n");
    }
}

fn print_turn(turn: &Turn, sources: bool) {
    println!("\nIdris: {}\n", turn.answer);
    if sources {
        println!("--- Retrieved snippets ---\n");
        print_sources(&turn.sources);
    }
}

fn run_chat(engine: &mut Engine, sources: bool) -> Result<()> {
    println!("FIFA World Cup Chatbot. Ask a question, or /quit to leave.\n");
    let mut history = History::new();
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("You: ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let query = line.trim();
        match query {
            "" => continue,
            "/quit" | "/exit" => break,
            "/reset" => {
                history.clear();
                println!("Conversation cleared.\n");
            }
            "/history" => {
                for (i, exchange) in history.exchanges().iter().enumerate() {
                    println!("{}. You: {}\n   Idris: {}", i + 1, exchange.question, exchange.answer);
                }
                println!();
            }
            _ => {
                let turn = engine.handle_turn(query, &history);
                print_turn(&turn, sources);
                history.push(query, turn.answer);
            }
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Logs go to stderr so answers on stdout stay clean
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Index => {
            let (embedder, corpus) = load_corpus(&cli.corpus)?;
            println!(
                "Indexed {} snippets from '{}' into '{}' ({} dimensions, {})",
                corpus.len(),
                cli.corpus.csv,
                cli.corpus.cache,
                corpus.dimension().unwrap_or(0),
                embedder.model_name(),
            );
        }

        Commands::Search { query, generation } => {
            let mut engine = build_engine(&cli.corpus, &generation)?;
            println!("Searching: '{query}' (k={}, n={})\n", generation.k, generation.n);
            let results = engine.search(&query)?;
            print_sources(&results);
        }

        Commands::Ask {
            question,
            sources,
            generation,
        } => {
            let mut engine = build_engine(&cli.corpus, &generation)?;
            let turn = engine.handle_turn(&question, &History::new());
            print_turn(&turn, sources);
        }

        Commands::Chat { sources, generation } => {
            let mut engine = build_engine(&cli.corpus, &generation)?;
            run_chat(&mut engine, sources)?;
        }
    }

    Ok(())
}
