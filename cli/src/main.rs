use anyhow::Result;
use clap::{Parser, Subcommand};
use search_core::batch::process_queries_joined;
use search_core::corpus::{index_documents, load_documents};
use search_core::dedup::remove_duplicates;
use search_core::paginate::paginate;
use search_core::{DocId, DocumentStatus, ExecutionPolicy, SearchIndex, DEFAULT_BUCKET_COUNT};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "search-cli")]
#[command(about = "Query an in-memory TF-IDF index built from JSON/JSONL documents", long_about = None)]
struct Cli {
    /// Input path (file or directory of .json/.jsonl documents)
    #[arg(long)]
    input: String,
    /// Space-separated stop-words
    #[arg(long, default_value = "")]
    stop_words: String,
    /// Shards in the relevance accumulator used by parallel ranking
    #[arg(long, default_value_t = DEFAULT_BUCKET_COUNT)]
    bucket_count: usize,
    /// Fan index scans and removals out across threads
    #[arg(long, default_value_t = false)]
    parallel: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the top documents for a query, page by page
    Search {
        #[arg(long)]
        query: String,
        #[arg(long, default_value = "actual")]
        status: DocumentStatus,
        #[arg(long, default_value_t = 2)]
        page_size: usize,
    },
    /// Show which query words a document matches
    Match {
        #[arg(long)]
        query: String,
        #[arg(long)]
        id: DocId,
    },
    /// Remove one document
    Remove {
        #[arg(long)]
        id: DocId,
    },
    /// Remove documents whose term set repeats a lower id
    Dedup,
    /// Run several queries in parallel and print the joined results
    Batch {
        #[arg(long = "query", required = true)]
        queries: Vec<String>,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();
    let policy = ExecutionPolicy::from_parallel(cli.parallel);

    let mut index = SearchIndex::new(&cli.stop_words)?.with_bucket_count(cli.bucket_count);
    let docs = load_documents(&cli.input)?;
    index_documents(&mut index, &docs)?;
    tracing::info!(docs = index.document_count(), ?policy, "index ready");

    match cli.command {
        Commands::Search { query, status, page_size } => {
            let found = index.find_top_documents_with(policy, &query, status)?;
            for (n, page) in paginate(&found, page_size).enumerate() {
                println!("page {}", n + 1);
                for doc in page {
                    println!("{doc}");
                }
            }
        }
        Commands::Match { query, id } => {
            let (words, status) = index.match_document_with(policy, &query, id)?;
            println!("{{ document_id = {id}, status = {status:?}, words = {} }}", words.join(" "));
        }
        Commands::Remove { id } => {
            index.remove_document_with(policy, id);
            println!("{} documents left", index.document_count());
        }
        Commands::Dedup => {
            for id in remove_duplicates(&mut index) {
                println!("Found duplicate document id {id}");
            }
            println!("{} documents left", index.document_count());
        }
        Commands::Batch { queries } => {
            for doc in process_queries_joined(&index, &queries)? {
                println!("{doc}");
            }
        }
    }
    Ok(())
}
