use anyhow::Result;
use axum::Router;
use clap::Parser;
use search_core::corpus::{index_documents, load_documents};
use search_core::{SearchIndex, DEFAULT_BUCKET_COUNT};
use search_server::{build_app, AppConfig};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Documents (file or directory of .json/.jsonl) to load at startup
    #[arg(long)]
    input: Option<String>,
    /// Space-separated stop-words
    #[arg(long, default_value = "")]
    stop_words: String,
    /// Shards in the relevance accumulator used by parallel ranking
    #[arg(long, default_value_t = DEFAULT_BUCKET_COUNT)]
    bucket_count: usize,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let mut index = SearchIndex::new(&args.stop_words)?.with_bucket_count(args.bucket_count);
    if let Some(input) = &args.input {
        let docs = load_documents(input)?;
        index_documents(&mut index, &docs)?;
    }
    tracing::info!(docs = index.document_count(), "index ready");
    let app: Router = build_app(index, AppConfig::from_env());

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
