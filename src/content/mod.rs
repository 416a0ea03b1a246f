//! Site content.
//!
//! # Data Flow
//! ```text
//! sections.rs  GET  /api/content/{section}/{pageType} → { content }
//!              POST /api/content { section, pageType, content }
//! editor.rs    load → edit draft → (upload media) → save wholesale
//! catalog.rs   /api/products, /api/blogs, /api/clients, /api/projects CRUD
//! ```
//!
//! # Design Decisions
//! - Every editor page shares one generic `SectionEditor<T>`
//! - `upsert_section_next` uses its own fixed 429 schedule

pub mod catalog;
pub mod editor;
pub mod sections;

pub use catalog::{BlogPost, CatalogItem, ClientLogo, Collection, Product, Project};
pub use editor::SectionEditor;
pub use sections::{ContentApi, SectionEnvelope, SectionKey};
