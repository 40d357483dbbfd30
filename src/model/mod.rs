//! Data model shared by the extraction and analysis stages.

mod document;
mod page;
mod record;

pub use document::Document;
pub use page::{join_pages, PageImage, PageOutcome, PageReport, PageStatus, PageText};
pub use record::{Importance, ImportanceRecord, TierCounts};
