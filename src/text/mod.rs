//! Text cleanup and paragraph segmentation.

mod normalize;
mod segment;

pub use normalize::{normalize, NormalizeOptions, Normalizer};
pub use segment::{split_into_paragraphs, SegmentOptions, Segmenter, DEFAULT_MIN_PARAGRAPH_CHARS};
