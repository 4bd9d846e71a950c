//! Output generation for the JSON document and the RSS feed.
//!
//! # Submodules
//!
//! - [`json`]: writes (and reads back) the `{"entries": [...]}` document
//! - [`feed`]: renders the newest entries as an RSS 2.0 feed
//!
//! # Output Structure
//!
//! ```text
//! site/
//! ├── diary_entries.json   # written by `export`, read by `feed`
//! ├── feed.xml             # written by `feed`
//! └── feed.xsl             # stylesheet referenced by feed.xml (not generated)
//! ```
//!
//! Both files are rewritten in full on every run.

pub mod feed;
pub mod json;
