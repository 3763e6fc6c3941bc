use crate::error::{Result, SplitError};
use crate::srt::Subtitle;

use std::fmt;
use std::time::Duration;

use nom::bytes::complete::{tag, take_while_m_n};
use nom::character::complete::{digit1, space0, space1};
use nom::combinator::map_res;
use nom::error::{convert_error, ErrorKind, VerboseError};
use nom::{error_position, Err, IResult};
use tracing::warn;

/// How defective blocks are treated during parsing.
///
/// Malformed timestamps are fatal in either mode; strictness only decides
/// what happens to blocks with a bad index line, a missing separator, or
/// too few lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    /// Drop the block and log a warning.
    #[default]
    Lenient,
    /// Fail the parse on the first defective block.
    Strict,
}

/// Why a block was rejected without producing a subtitle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    TooShort,
    BadIndex,
    NoSeparator,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::TooShort => write!(f, "fewer than 3 lines"),
            SkipReason::BadIndex => write!(f, "first line is not an integer index"),
            SkipReason::NoSeparator => write!(f, "no ' --> ' separator on the second line"),
        }
    }
}

/// Per-block parse result. A malformed timestamp is deliberately not an
/// outcome: it aborts the whole parse instead of being skipped.
#[derive(Debug)]
pub enum BlockOutcome {
    Parsed(Subtitle),
    Skipped(SkipReason),
}

pub struct Parser {
    strictness: Strictness,
}

impl Parser {
    pub fn new(strictness: Strictness) -> Self {
        Self { strictness }
    }

    /// Parse SRT text into subtitles, in source order.
    ///
    /// Blocks are separated by blank lines; both LF and CRLF input is
    /// accepted, as is a leading BOM. The result may be empty; deciding
    /// whether an empty file is an error is left to the caller.
    pub fn parse(&self, input: &str) -> Result<Vec<Subtitle>> {
        let input = input.strip_prefix('\u{FEFF}').unwrap_or(input);

        let mut subtitles = Vec::new();
        for block in blocks(input) {
            match parse_block(&block)? {
                BlockOutcome::Parsed(subtitle) => subtitles.push(subtitle),
                BlockOutcome::Skipped(reason) => match self.strictness {
                    Strictness::Lenient => {
                        warn!("Skipping block at line {}: {}", block.line, reason)
                    }
                    Strictness::Strict => {
                        return Err(SplitError::Block {
                            line: block.line,
                            reason,
                        })
                    }
                },
            }
        }
        Ok(subtitles)
    }
}

struct Block<'a> {
    /// 1-based source line on which the block starts.
    line: usize,
    lines: Vec<&'a str>,
}

/// Group the input into blocks separated by blank lines. Runs of blank
/// lines collapse; a whitespace-only line is content, not a separator.
fn blocks(input: &str) -> Vec<Block<'_>> {
    let mut blocks = Vec::new();
    let mut current: Option<Block> = None;
    for (idx, line) in input.lines().enumerate() {
        if line.is_empty() {
            if let Some(block) = current.take() {
                blocks.push(block);
            }
        } else {
            current
                .get_or_insert_with(|| Block {
                    line: idx + 1,
                    lines: Vec::new(),
                })
                .lines
                .push(line);
        }
    }
    if let Some(block) = current {
        blocks.push(block);
    }
    blocks
}

fn parse_block(block: &Block) -> Result<BlockOutcome> {
    if block.lines.len() < 3 {
        return Ok(BlockOutcome::Skipped(SkipReason::TooShort));
    }

    let index: i64 = match block.lines[0].trim().parse() {
        Ok(index) => index,
        Err(_) => return Ok(BlockOutcome::Skipped(SkipReason::BadIndex)),
    };

    let times = block.lines[1];
    if !times.contains(" --> ") {
        return Ok(BlockOutcome::Skipped(SkipReason::NoSeparator));
    }
    // From here on the block is committed: a timestamp that does not parse
    // takes the whole file down with it.
    let (start, end) = time_span(times).map_err(|detail| SplitError::Timestamp {
        line: block.line + 1,
        detail,
    })?;

    Ok(BlockOutcome::Parsed(Subtitle {
        index,
        start,
        end,
        text: block.lines[2..].iter().map(|s| s.to_string()).collect(),
    }))
}

/// Parse a full `start --> end` line, requiring it to be consumed entirely.
fn time_span(input: &str) -> std::result::Result<(Duration, Duration), String> {
    match span(input) {
        Ok((_, range)) => Ok(range),
        Err(Err::Error(err)) | Err(Err::Failure(err)) => Err(convert_error(input, err)),
        Err(Err::Incomplete(_)) => {
            unreachable!("Incomplete data received by non-streaming parser.")
        }
    }
}

fn span(input: &str) -> IResult<&str, (Duration, Duration), VerboseError<&str>> {
    let (input, _) = space0(input)?;
    let (input, start) = timestamp(input)?;
    let (input, _) = space1(input)?;
    let (input, _) = tag("-->")(input)?;
    let (input, _) = space1(input)?;
    let (input, end) = timestamp(input)?;
    let (input, _) = space0(input)?;
    let (input, _) = end_of_line(input)?;

    Ok((input, (start, end)))
}

fn end_of_line(input: &str) -> IResult<&str, &str, VerboseError<&str>> {
    if input.is_empty() {
        Ok((input, input))
    } else {
        std::result::Result::Err(Err::Error(error_position!(input, ErrorKind::Eof)))
    }
}

/// `HH:MM:SS,mmm`. Minutes and seconds are exactly two digits and
/// milliseconds exactly three; hours take one or more digits so that
/// serialised output past 99 hours can be read back.
fn timestamp(start: &str) -> IResult<&str, Duration, VerboseError<&str>> {
    let two_digits = || {
        map_res(take_while_m_n(2, 2, |c: char| c.is_digit(10)), |s: &str| {
            s.parse::<u64>()
        })
    };
    let three_digits = || {
        map_res(take_while_m_n(3, 3, |c: char| c.is_digit(10)), |s: &str| {
            s.parse::<u64>()
        })
    };

    let (input, hours) = map_res(digit1, |s: &str| s.parse::<u64>())(start)?;
    let (input, _) = tag(":")(input)?;
    let (input, minutes) = two_digits()(input)?;
    let (input, _) = tag(":")(input)?;
    let (input, seconds) = two_digits()(input)?;
    let (input, _) = tag(",")(input)?;
    let (input, millis) = three_digits()(input)?;

    // Minutes, seconds and milliseconds are bounded by their digit count;
    // only the open-ended hour field can overflow the millisecond total.
    let total = hours
        .checked_mul(60 * 60 * 1000)
        .and_then(|h| h.checked_add(minutes * 60 * 1000 + seconds * 1000 + millis));
    match total {
        Some(total) => Ok((input, Duration::from_millis(total))),
        None => std::result::Result::Err(Err::Error(error_position!(start, ErrorKind::MapRes))),
    }
}
