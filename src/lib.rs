//! Split SRT subtitle files into overlapping time-bounded chunks.
//!
//! The pipeline has three stages: [`parser`] turns SRT text into
//! [`srt::Subtitle`] entries, [`chunker`] partitions them into
//! overlapping time windows, and [`serialiser`] writes each window
//! back out as an SRT file, a plain-text transcript, or both.

pub mod chunker;
pub mod error;
pub mod parser;
pub mod serialiser;
pub mod srt;

pub use chunker::{split_by_time, Chunk, SplitOptions};
pub use error::{Result, SplitError};
pub use parser::{Parser, SkipReason, Strictness};
pub use serialiser::{serialise_chunks, OutputFormat};
pub use srt::Subtitle;
