use std::time::Duration;

/// One timestamped text unit from the source file.
///
/// `index` is whatever integer the source block carried; it is neither
/// validated nor required to be contiguous, and the serialisers discard it
/// in favour of per-chunk renumbering.
#[derive(Debug, Clone, PartialEq)]
pub struct Subtitle {
    pub index: i64,
    pub start: Duration,
    pub end: Duration,
    pub text: Vec<String>,
}
