//! Structural splitting of Korean statute text.
//!
//! Recovers the 조 → 항 → 호 → 목 hierarchy from normalized text with one
//! generic marker splitter applied per level, and threads 편/장/절/관
//! headings through the article sequence.

mod config;
mod engine;
mod headings;
mod marker;
mod registry;
mod types;

pub use config::create_statute_hierarchy;
pub use engine::{extract_law_name, StructureParser};
pub use headings::{take_headings, Heading, HeadingContext, HeadingLevel};
pub use marker::split_on_marker;
pub use registry::HierarchyRegistry;
pub use types::{ArticleHeading, LabelFn, Level, LevelSpec, LocatedArticle, Segment, Split};
