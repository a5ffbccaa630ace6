//! Adaptive chunking of parsed articles.
//!
//! An article that fits the token budget becomes one chunk. Otherwise each
//! paragraph becomes its own chunk, and a paragraph that does not fit is cut
//! into one chunk per item (then per subitem). Every chunk repeats the header
//! lines of its ancestors as context, so it reads on its own; content lines
//! are never dropped or repeated.

mod counter;

use serde::Serialize;

use crate::amendment::{distinct_change_dates, extract_amendments};
use crate::config::{circled_to_decimal, validate_max_tokens};
use crate::error::Result;
use crate::types::{AmendmentTag, Article, Item, Paragraph, Subitem};

pub use counter::{TiktokenCounter, TokenCounter};

/// Spaces per nesting level when rendering.
const INDENT: usize = 2;

/// One rendered line of a chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkLine {
    /// Nesting depth: 0 for article and paragraph lines, 1 for items, 2 for
    /// subitems.
    pub depth: usize,

    /// Labelled text, e.g. "제1호 추락 위험이 있는 장소".
    pub text: String,
}

impl ChunkLine {
    /// Create a new line.
    #[must_use]
    pub fn new(depth: usize, text: impl Into<String>) -> Self {
        Self {
            depth,
            text: text.into(),
        }
    }

    /// The line with its indentation.
    #[must_use]
    pub fn render(&self) -> String {
        format!("{}{}", " ".repeat(self.depth * INDENT), self.text)
    }
}

/// A token-bounded piece of an article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Ancestor header lines repeated for context.
    pub context: Vec<ChunkLine>,

    /// The chunk's own content lines.
    pub lines: Vec<ChunkLine>,
}

impl Chunk {
    /// Create a new chunk.
    #[must_use]
    pub fn new(context: Vec<ChunkLine>, lines: Vec<ChunkLine>) -> Self {
        Self { context, lines }
    }

    /// Context lines followed by content lines, one per line.
    #[must_use]
    pub fn render(&self) -> String {
        self.context
            .iter()
            .chain(&self.lines)
            .filter(|line| !line.text.is_empty())
            .map(ChunkLine::render)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Whether `context` is covered by this chunk, either as its own context
    /// or as content lines it already holds.
    fn covers(&self, context: &[ChunkLine]) -> bool {
        context.starts_with(&self.context)
            && context[self.context.len()..]
                .iter()
                .all(|line| self.lines.contains(line))
    }
}

/// A node of the article tree as chunk lines.
#[derive(Debug, Clone)]
struct Block {
    line: ChunkLine,
    children: Vec<Block>,
}

impl Block {
    fn leaf(line: ChunkLine) -> Self {
        Self {
            line,
            children: Vec::new(),
        }
    }

    /// Depth-first lines of the subtree, blank lines skipped.
    fn flatten(&self) -> Vec<ChunkLine> {
        let mut lines = Vec::new();
        self.collect_lines(&mut lines);
        lines
    }

    fn collect_lines(&self, lines: &mut Vec<ChunkLine>) {
        if !self.line.text.is_empty() {
            lines.push(self.line.clone());
        }
        for child in &self.children {
            child.collect_lines(lines);
        }
    }
}

/// Drop a raw marker that repeats the node's own number
/// ("① ...", "1. ...", "1 ...", "가. ...").
fn strip_marker<'a>(text: &'a str, number: &str) -> &'a str {
    let text = text.trim_start();

    let mut chars = text.chars();
    if let Some(first) = chars.next() {
        if circled_to_decimal(first).as_deref() == Some(number) {
            return chars.as_str().trim_start();
        }
    }

    match text.strip_prefix(number) {
        Some(rest) if rest.starts_with('.') => rest[1..].trim_start(),
        Some(rest) if rest.starts_with(char::is_whitespace) => rest.trim_start(),
        _ => text,
    }
}

fn labelled(label: String, text: &str) -> String {
    if text.is_empty() {
        label
    } else {
        format!("{label} {text}")
    }
}

/// "제{n}항 text"; the lead paragraph is unlabelled.
#[must_use]
pub fn label_paragraph(paragraph: &Paragraph) -> String {
    if paragraph.is_lead() {
        return paragraph.text.trim().to_string();
    }
    labelled(
        format!("제{}항", paragraph.number),
        strip_marker(&paragraph.text, &paragraph.number),
    )
}

/// "제{n}호 text".
#[must_use]
pub fn label_item(item: &Item) -> String {
    labelled(
        format!("제{}호", item.number),
        strip_marker(&item.text, &item.number),
    )
}

/// "{letter}목 text".
#[must_use]
pub fn label_subitem(subitem: &Subitem) -> String {
    labelled(
        format!("{}목", subitem.letter),
        strip_marker(&subitem.text, &subitem.letter),
    )
}

fn article_blocks(article: &Article) -> Vec<Block> {
    let lead = (!article.text.trim().is_empty())
        .then(|| Block::leaf(ChunkLine::new(0, article.text.trim())));

    let paragraphs = article.paragraphs.iter().map(|paragraph| Block {
        line: ChunkLine::new(0, label_paragraph(paragraph)),
        children: paragraph
            .items
            .iter()
            .map(|item| Block {
                line: ChunkLine::new(1, label_item(item)),
                children: item
                    .subitems
                    .iter()
                    .map(|subitem| Block::leaf(ChunkLine::new(2, label_subitem(subitem))))
                    .collect(),
            })
            .collect(),
    });

    lead.into_iter().chain(paragraphs).collect()
}

/// Lead text of an article: its own text, else the "본문" paragraph.
fn lead_text(article: &Article) -> &str {
    if !article.text.is_empty() {
        return &article.text;
    }
    article
        .paragraphs
        .first()
        .filter(|p| p.is_lead())
        .map_or("", |p| p.text.as_str())
}

/// Splits articles into token-bounded chunks.
pub struct Chunker<'a, C: TokenCounter + ?Sized> {
    counter: &'a C,
    max_tokens: usize,
}

impl<'a, C: TokenCounter + ?Sized> Chunker<'a, C> {
    /// Create a chunker with a token budget.
    pub fn new(counter: &'a C, max_tokens: usize) -> Result<Self> {
        validate_max_tokens(max_tokens)?;
        Ok(Self {
            counter,
            max_tokens,
        })
    }

    /// The token budget.
    #[must_use]
    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    /// Split an article into chunks.
    ///
    /// Every chunk fits the budget except one made of a single line that
    /// does not fit on its own; such lines are emitted whole.
    pub fn chunk_article(&self, article: &Article) -> Result<Vec<Chunk>> {
        let header = ChunkLine::new(0, article.header());
        let blocks = article_blocks(article);

        // The header is left out when the lead text already names the title
        let title_in_lead =
            !article.title.is_empty() && lead_text(article).contains(article.title.as_str());
        let context = if title_in_lead {
            Vec::new()
        } else {
            vec![header.clone()]
        };
        let whole = Chunk::new(context, blocks.iter().flat_map(Block::flatten).collect());
        if self.fits(&whole)? {
            return Ok(vec![whole]);
        }

        let mut emitter = Emitter {
            chunker: self,
            pending: None,
            chunks: Vec::new(),
        };
        let root = [header];
        for block in &blocks {
            emitter.flush();
            emitter.emit(block, &root)?;
        }
        let chunks = emitter.finish();

        tracing::debug!(
            article = %article.number,
            chunks = chunks.len(),
            "Split article over token budget"
        );
        Ok(if chunks.is_empty() { vec![whole] } else { chunks })
    }

    fn fits(&self, chunk: &Chunk) -> Result<bool> {
        Ok(self.counter.count_tokens(&chunk.render())? <= self.max_tokens)
    }
}

/// Walks the article tree and emits one chunk per subtree that fits.
///
/// `pending` holds parent lines still waiting for their first child; it is
/// empty again whenever `emit` returns.
struct Emitter<'c, 'a, C: TokenCounter + ?Sized> {
    chunker: &'c Chunker<'a, C>,
    pending: Option<Chunk>,
    chunks: Vec<Chunk>,
}

impl<C: TokenCounter + ?Sized> Emitter<'_, '_, C> {
    /// The pending chunk extended by `lines`, if it can take lines under
    /// `context`. Without a pending chunk, a fresh one.
    fn extended(&self, context: &[ChunkLine], lines: &[ChunkLine]) -> Option<Chunk> {
        match &self.pending {
            Some(pending) if pending.covers(context) => {
                let mut chunk = pending.clone();
                chunk.lines.extend_from_slice(lines);
                Some(chunk)
            }
            Some(_) => None,
            None => Some(Chunk::new(context.to_vec(), lines.to_vec())),
        }
    }

    fn flush(&mut self) {
        if let Some(chunk) = self.pending.take() {
            if !chunk.lines.is_empty() {
                self.chunks.push(chunk);
            }
        }
    }

    fn emit(&mut self, block: &Block, context: &[ChunkLine]) -> Result<()> {
        let lines = block.flatten();
        if lines.is_empty() {
            return Ok(());
        }

        if let Some(candidate) = self.extended(context, &lines) {
            if self.chunker.fits(&candidate)? {
                self.pending = None;
                self.chunks.push(candidate);
                return Ok(());
            }
        }

        let alone = Chunk::new(context.to_vec(), lines);
        if block.children.is_empty() || self.chunker.fits(&alone)? {
            // A leaf over budget is the hard floor and goes out whole
            self.flush();
            self.chunks.push(alone);
            return Ok(());
        }

        let mut child_context = context.to_vec();
        if !block.line.text.is_empty() {
            let own = std::slice::from_ref(&block.line);
            match self.extended(context, own) {
                Some(candidate) if self.chunker.fits(&candidate)? => {
                    self.pending = Some(candidate);
                }
                _ => {
                    self.flush();
                    self.pending = Some(Chunk::new(context.to_vec(), own.to_vec()));
                }
            }
            child_context.push(block.line.clone());
        }

        for child in &block.children {
            self.emit(child, &child_context)?;
        }
        self.flush();
        Ok(())
    }

    fn finish(mut self) -> Vec<Chunk> {
        self.flush();
        self.chunks
    }
}

/// An article with its chunks and amendment summary, as written to JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChunkedArticle {
    /// The parsed article.
    #[serde(flatten)]
    pub article: Article,

    /// Rendered chunk texts.
    pub embedding_chunks: Vec<String>,

    /// One record per date of every amendment tag: tags recovered while
    /// building the tree first, then tags still present in chunk content.
    pub amendments: Vec<AmendmentTag>,

    /// Distinct change dates, oldest first.
    pub all_change_dates: Vec<String>,
}

impl ChunkedArticle {
    /// Combine an article with its chunks.
    #[must_use]
    pub fn new(article: Article, chunks: &[Chunk]) -> Self {
        let embedding_chunks: Vec<String> = chunks.iter().map(Chunk::render).collect();

        // Content lines appear in exactly one chunk; context lines repeat
        let mut amendments: Vec<AmendmentTag> = article
            .paragraphs
            .iter()
            .flat_map(|p| p.amendments.iter().cloned())
            .collect();
        amendments.extend(
            chunks
                .iter()
                .flat_map(|chunk| &chunk.lines)
                .flat_map(|line| extract_amendments(&line.text)),
        );
        let all_change_dates = distinct_change_dates(&amendments);

        Self {
            article,
            embedding_chunks,
            amendments,
            all_change_dates,
        }
    }
}
