//! lawchunk - Parse Korean statutes into retrieval chunks.
//!
//! This crate turns statute text (PDF layout output or law.go.kr statute
//! JSON) into a 조 → 항 → 호 → 목 tree, extracts 별표 annexes with their
//! tables, and splits every article into token-bounded chunks that each
//! carry their ancestor headers.
//!
//! # Example
//!
//! ```
//! use lawchunk_ingest::chunking::Chunker;
//! use lawchunk_ingest::types::{Article, Item, Paragraph};
//!
//! let article = Article::new("제24조", "안전모").with_paragraphs(vec![
//!     Paragraph::new("1", "근로자는 안전모를 착용하여야 한다.")
//!         .with_items(vec![Item::new("1", "추락 위험이 있는 장소")]),
//! ]);
//!
//! let words = |text: &str| text.split_whitespace().count();
//! let chunks = Chunker::new(&words, 800)?.chunk_article(&article)?;
//! assert_eq!(
//!     chunks[0].render(),
//!     "제24조 안전모\n제1항 근로자는 안전모를 착용하여야 한다.\n  제1호 추락 위험이 있는 장소"
//! );
//! # Ok::<(), lawchunk_ingest::IngestError>(())
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Configuration constants and validation
//! - [`types`]: Core data types (Article, Paragraph, Annex, etc.)
//! - [`error`]: Error types and Result alias
//! - [`normalize`]: Page text cleanup and word-break repair
//! - [`amendment`]: `<개정 ...>` tags and bracketed notes
//! - [`splitting`]: Article/paragraph/item/subitem splitting
//! - [`annex`]: Annex blocks, page mapping and tables
//! - [`chunking`]: Token-bounded chunking
//! - [`layout`]: PDF layout documents
//! - [`lawjson`]: Statute JSON import
//! - [`pipeline`]: Per-document processing and output
//! - [`cli`]: Command-line interface

pub mod amendment;
pub mod annex;
pub mod chunking;
pub mod cli;
pub mod config;
pub mod error;
pub mod lawjson;
pub mod layout;
pub mod normalize;
pub mod pipeline;
pub mod splitting;
pub mod types;

// Re-export main functions
pub use pipeline::{process_layout, process_statute_json, OutputDocument};

// Re-export commonly used items
pub use chunking::{ChunkedArticle, Chunker, TiktokenCounter, TokenCounter};
pub use config::{validate_max_tokens, PipelineConfig};
pub use error::{IngestError, Result};
pub use types::{Annex, Article, Item, Paragraph, Subitem};
