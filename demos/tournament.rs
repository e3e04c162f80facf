//! Tournament reranking example
//!
//! Ranks a set of passages with a window-limited oracle and reports how many
//! oracle calls the tournament needed.
//!
//! Run with: cargo run --example tournament
//! No API key required - the oracle is the local term-overlap reranker

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use rerank_tournament::{
    apply_order, RerankerOracle, ReorderPolicy, ResortOracle, Result, TermOverlapReranker,
    TournamentConfig, TournamentSortPolicy,
};

/// Counts the windows passed through to the wrapped oracle.
struct Counting<O> {
    inner: O,
    calls: AtomicUsize,
}

#[async_trait]
impl<O: ResortOracle> ResortOracle for Counting<O> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn resort(&self, window: &[usize]) -> Result<Vec<usize>> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.inner.resort(window).await
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let passages: Vec<String> = [
        "Rust is a systems programming language focused on safety and performance.",
        "The Python programming language is popular for machine learning.",
        "Memory safety in Rust is achieved without a garbage collector.",
        "JavaScript is the language of the web browser.",
        "Rust's ownership system prevents data races at compile time.",
        "Go is a statically typed language designed at Google.",
        "Rust async/await provides efficient concurrency without threads.",
        "C++ is a general-purpose programming language.",
        "Rust compiles to native code with zero-cost abstractions.",
        "Java runs on the JVM with automatic garbage collection.",
        "Haskell is a purely functional programming language.",
        "Borrow checking in Rust enforces memory safety rules.",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    let query = "Rust memory safety without garbage collection";
    println!("Query: \"{}\"", query);
    println!("{}", "─".repeat(60));

    let oracle = Counting {
        inner: RerankerOracle::new(TermOverlapReranker::new(), query, passages.clone()),
        calls: AtomicUsize::new(0),
    };
    let policy = TournamentSortPolicy::new(TournamentConfig::new(4, 2))?.with_top_n(3);

    let order = policy.reorder(passages.len(), 0, passages.len(), &oracle).await?;
    let ranked = apply_order(passages, &order);

    println!("\nTop {} via {}:\n", policy.top_n(), policy.name());
    for (rank, passage) in ranked.iter().take(policy.top_n()).enumerate() {
        println!("  {}. {}", rank + 1, passage);
    }
    println!(
        "\nOracle calls: {} (window {})",
        oracle.calls.load(Ordering::Relaxed),
        policy.max_selected_indices()
    );

    Ok(())
}
