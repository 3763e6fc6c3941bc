use crate::error::{Result, SplitError};
use crate::srt::Subtitle;

use std::time::Duration;

use tracing::debug;

/// Parameters for the time-based partitioning.
///
/// The fields are private: [`SplitOptions::new`] and
/// [`SplitOptions::from_minutes`] are the only constructors, and both
/// reject combinations that would stop the window from advancing.
#[derive(Debug, Clone, Copy)]
pub struct SplitOptions {
    chunk_duration: Duration,
    overlap: Duration,
}

impl SplitOptions {
    pub fn new(chunk_duration: Duration, overlap: Duration) -> Result<Self> {
        if chunk_duration <= overlap {
            return Err(SplitError::Config(format!(
                "chunk duration ({:?}) must be greater than the overlap ({:?})",
                chunk_duration, overlap
            )));
        }
        Ok(Self {
            chunk_duration,
            overlap,
        })
    }

    /// Convenience constructor for the CLI's whole-minute units.
    pub fn from_minutes(chunk_minutes: u64, overlap_minutes: u64) -> Result<Self> {
        let to_duration = |minutes: u64| {
            minutes
                .checked_mul(60)
                .map(Duration::from_secs)
                .ok_or_else(|| SplitError::Config(format!("{} minutes is out of range", minutes)))
        };
        Self::new(to_duration(chunk_minutes)?, to_duration(overlap_minutes)?)
    }

    pub fn chunk_duration(&self) -> Duration {
        self.chunk_duration
    }

    pub fn overlap(&self) -> Duration {
        self.overlap
    }
}

/// A time-bounded group of subtitles cut from the source timeline.
///
/// The `planned` range is the ideal window used to decide membership.
/// The `actual` range is the tightest span covering the selected entries,
/// which may start before `planned_start` when an entry straddles the
/// window boundary.
#[derive(Debug)]
pub struct Chunk<'a> {
    pub number: usize,
    pub planned_start: Duration,
    pub planned_end: Duration,
    pub actual_start: Duration,
    pub actual_end: Duration,
    pub subtitles: Vec<&'a Subtitle>,
}

impl Chunk<'_> {
    pub fn duration(&self) -> Duration {
        self.actual_end.saturating_sub(self.actual_start)
    }
}

/// Partition `subtitles` into overlapping windows of `opts.chunk_duration`.
///
/// Each window selects the entries whose interval overlaps its planned
/// range, so entries in the overlap region appear in consecutive chunks.
/// Windows that select nothing produce no chunk and consume no chunk
/// number. The input order is preserved within each chunk.
pub fn split_by_time<'a>(subtitles: &'a [Subtitle], opts: &SplitOptions) -> Vec<Chunk<'a>> {
    if subtitles.is_empty() {
        return Vec::new();
    }

    let total_duration = subtitles.iter().map(|s| s.end).max().unwrap_or_default();

    let mut chunks = Vec::new();
    let mut planned_start = Duration::ZERO;

    while planned_start < total_duration {
        let planned_end = planned_start + opts.chunk_duration;
        let next_planned_start = planned_end - opts.overlap;

        let selected: Vec<&Subtitle> = subtitles
            .iter()
            .filter(|sub| {
                (sub.start >= planned_start && sub.start < planned_end)
                    || (sub.end > planned_start && sub.start < planned_end)
            })
            .collect();

        if !selected.is_empty() {
            let actual_start = selected.iter().map(|s| s.start).min().unwrap_or_default();
            let actual_end = selected.iter().map(|s| s.end).max().unwrap_or_default();
            let number = chunks.len() + 1;
            debug!(
                "Chunk {}: planned {:?} to {:?}, {} entries",
                number,
                planned_start,
                planned_end,
                selected.len()
            );
            chunks.push(Chunk {
                number,
                planned_start,
                planned_end,
                actual_start,
                actual_end,
                subtitles: selected,
            });
        }

        planned_start = next_planned_start;
        if next_planned_start >= total_duration {
            break;
        }
    }

    chunks
}
