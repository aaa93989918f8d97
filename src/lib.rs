//! # folio – page reflow for template-rendered resumes
//!
//! A resume is rendered as one continuous column and shown as a stack of
//! A4 pages. This crate decides where that column breaks: every atomic
//! unit (section heading, entry header, description line, skill chip) that
//! would straddle a page boundary is pushed to the top of the next page by
//! an injected offset. The stages are:
//!
//! 1. **Parse** – HTML string → DOM tree ([`dom`])
//! 2. **Style** – inline styles and Tailwind-like classes ([`style`])
//! 3. **Scan** – find the atomic units ([`scanner`])
//! 4. **Layout** – flexbox/grid layout with Taffy, behind [`oracle::LayoutOracle`] ([`layout`])
//! 5. **Reflow** – measure, push, re-measure ([`pagination`])
//! 6. **Present** – page mask ([`mask`]) and viewport scale ([`scale`])
//! 7. **Export** – print pages ([`print_layout`]), PDF ([`render`]) and plain text ([`export`])
//!
//! [`engine::Paginator`] wraps the pipeline for an interactive host with
//! debounced passes ([`scheduler`]) and manual gap adjustments ([`gaps`]).
//! A C-compatible FFI surface is exposed via the [`ffi`] module.

pub mod config;
pub mod dom;
pub mod engine;
pub mod error;
pub mod export;
pub mod ffi;
pub mod fonts;
pub mod gaps;
pub mod geometry;
pub mod layout;
pub mod mask;
pub mod oracle;
pub mod pagination;
pub mod pipeline;
pub mod print_layout;
pub mod render;
pub mod scale;
pub mod scanner;
pub mod scheduler;
pub mod style;
pub mod templates;

// Re-exports for convenience
pub use config::ReflowConfig;
pub use engine::Paginator;
pub use error::{FolioError, Result};
pub use geometry::PageGeometry;
pub use oracle::{FlowOracle, LayoutOracle, UnitBox};
pub use pagination::{reflow_pass, ReflowOutcome};
pub use pipeline::{export_pdf, export_text, paginate, DocumentState, PaginationReport};
