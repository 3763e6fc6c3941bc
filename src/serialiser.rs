use crate::chunker::Chunk;
use crate::error::Result;

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use tracing::{debug, info};

/// Which serialisers run for each chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    Srt,
    Txt,
    #[default]
    Both,
}

impl OutputFormat {
    fn includes_srt(self) -> bool {
        matches!(self, OutputFormat::Srt | OutputFormat::Both)
    }

    fn includes_txt(self) -> bool {
        matches!(self, OutputFormat::Txt | OutputFormat::Both)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Srt => write!(f, "srt"),
            OutputFormat::Txt => write!(f, "txt"),
            OutputFormat::Both => write!(f, "both"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "srt" => Ok(OutputFormat::Srt),
            "txt" => Ok(OutputFormat::Txt),
            "both" => Ok(OutputFormat::Both),
            _ => Err(format!("Unknown format: {}. Use 'srt', 'txt' or 'both'", s)),
        }
    }
}

/// Write every chunk into `dir`, creating it if needed.
///
/// Files are named `chunk_NN.srt` and `chunk_NN.txt` after the chunk
/// number. Returns the paths written, in order.
pub fn serialise_chunks(
    chunks: &[Chunk],
    dir: &Path,
    format: OutputFormat,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;

    let mut written = Vec::new();
    for chunk in chunks {
        info!(
            "Chunk {:02}: {:.1}-{:.1} min ({:.1} min duration)",
            chunk.number,
            chunk.actual_start.as_secs_f64() / 60.0,
            chunk.actual_end.as_secs_f64() / 60.0,
            chunk.duration().as_secs_f64() / 60.0,
        );
        if format.includes_srt() {
            let path = dir.join(format!("chunk_{:02}.srt", chunk.number));
            write_chunk_file(&path, chunk, write_srt)?;
            written.push(path);
        }
        if format.includes_txt() {
            let path = dir.join(format!("chunk_{:02}.txt", chunk.number));
            write_chunk_file(&path, chunk, write_transcript)?;
            written.push(path);
        }
    }
    Ok(written)
}

fn write_chunk_file<F>(path: &Path, chunk: &Chunk, write: F) -> Result<()>
where
    F: Fn(&mut BufWriter<File>, &Chunk) -> Result<()>,
{
    debug!("Writing {}", path.display());
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write(&mut writer, chunk)?;
    writer.flush()?;
    Ok(())
}

/// Write a chunk as an SRT document.
///
/// Entries are renumbered from 1 within the chunk; the indices from the
/// source file are discarded. Timestamps keep their original values.
pub fn write_srt<W: Write>(buf: &mut W, chunk: &Chunk) -> Result<()> {
    for (seq, sub) in chunk.subtitles.iter().enumerate() {
        writeln!(buf, "{}", seq + 1)?;
        write_ts(buf, sub.start)?;
        write!(buf, " --> ")?;
        write_ts(buf, sub.end)?;
        writeln!(buf)?;
        for line in &sub.text {
            writeln!(buf, "{}", line)?;
        }
        writeln!(buf)?;
    }
    Ok(())
}

/// Write a chunk as a plain-text transcript with a header naming the
/// chunk and its actual time range.
pub fn write_transcript<W: Write>(buf: &mut W, chunk: &Chunk) -> Result<()> {
    writeln!(buf, "Transcript - Chunk {}", chunk.number)?;
    write!(buf, "Time Range: ")?;
    write_ts(buf, chunk.actual_start)?;
    write!(buf, " to ")?;
    write_ts(buf, chunk.actual_end)?;
    writeln!(buf)?;
    writeln!(
        buf,
        "Duration: {:.1} minutes",
        chunk.duration().as_secs_f64() / 60.0
    )?;
    writeln!(buf, "{}", "=".repeat(50))?;
    writeln!(buf)?;
    for sub in &chunk.subtitles {
        write!(buf, "[")?;
        write_ts(buf, sub.start)?;
        writeln!(buf, "] {}", sub.text.join("\n"))?;
    }
    Ok(())
}

fn write_ts<W: Write>(buf: &mut W, timestamp: Duration) -> Result<()> {
    let total_secs = timestamp.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    let millis = timestamp.as_millis() % 1000;
    write!(
        buf,
        "{:02}:{:02}:{:02},{:03}",
        hours, minutes, seconds, millis
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::srt::Subtitle;
    use std::io::Cursor;
    use std::time::Duration;

    macro_rules! test_write_ts {
        ($($name:ident: $value:expr,)*) => {
        $(
            #[test]
            fn $name() {
                let (input, expected) = $value;

                let ts = Duration::from_millis(input);
                let mut buf = Cursor::new(vec![]);

                write_ts(&mut buf, ts).expect("Failed to write to buffer");

                assert_eq!(String::from_utf8(buf.into_inner()).unwrap(), expected);
            }
        )*
        }
    }

    test_write_ts! {
        test_write_ts_0: (0, "00:00:00,000"),
        test_write_ts_1: (1, "00:00:00,001"),
        test_write_ts_2: (999, "00:00:00,999"),
        test_write_ts_3: (1000, "00:00:01,000"),
        test_write_ts_4: (1001, "00:00:01,001"),
        test_write_ts_5: (59_999, "00:00:59,999"),
        test_write_ts_6: (60_000, "00:01:00,000"),
        test_write_ts_7: (3_600_000, "01:00:00,000"),
        test_write_ts_8: (7_326_159, "02:02:06,159"),
        test_write_ts_9: (34_380_001, "09:33:00,001"),
        test_write_ts_10: (360_000_001, "100:00:00,001"),
    }

    fn sub(index: i64, start_millis: u64, end_millis: u64, text: &[&str]) -> Subtitle {
        Subtitle {
            index,
            start: Duration::from_millis(start_millis),
            end: Duration::from_millis(end_millis),
            text: text.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn chunk<'a>(number: usize, subs: &'a [Subtitle]) -> Chunk<'a> {
        Chunk {
            number,
            planned_start: Duration::ZERO,
            planned_end: Duration::from_secs(1800),
            actual_start: subs.iter().map(|s| s.start).min().unwrap_or_default(),
            actual_end: subs.iter().map(|s| s.end).max().unwrap_or_default(),
            subtitles: subs.iter().collect(),
        }
    }

    #[test]
    fn test_write_srt_renumbers_entries() {
        let subs = vec![
            sub(7, 1_500, 4_000, &["Hello, world!"]),
            sub(9, 3_661_123, 3_662_000, &["Second line one", "Second line two"]),
        ];
        let mut buf = Cursor::new(vec![]);

        write_srt(&mut buf, &chunk(1, &subs)).expect("Failed to write to buffer");

        let expected = "1\n\
                        00:00:01,500 --> 00:00:04,000\n\
                        Hello, world!\n\
                        \n\
                        2\n\
                        01:01:01,123 --> 01:01:02,000\n\
                        Second line one\n\
                        Second line two\n\
                        \n";
        assert_eq!(String::from_utf8(buf.into_inner()).unwrap(), expected);
    }

    #[test]
    fn test_write_transcript_header_and_entries() {
        let subs = vec![
            sub(1, 0, 60_000, &["First text"]),
            sub(2, 290_000, 300_000, &["Multi line", "flows on"]),
        ];
        let mut buf = Cursor::new(vec![]);

        write_transcript(&mut buf, &chunk(3, &subs)).expect("Failed to write to buffer");

        let expected = "Transcript - Chunk 3\n\
                        Time Range: 00:00:00,000 to 00:05:00,000\n\
                        Duration: 5.0 minutes\n\
                        ==================================================\n\
                        \n\
                        [00:00:00,000] First text\n\
                        [00:04:50,000] Multi line\nflows on\n";
        assert_eq!(String::from_utf8(buf.into_inner()).unwrap(), expected);
    }

    #[test]
    fn test_format_parses_known_names() {
        assert_eq!("srt".parse::<OutputFormat>().unwrap(), OutputFormat::Srt);
        assert_eq!("TXT".parse::<OutputFormat>().unwrap(), OutputFormat::Txt);
        assert_eq!("both".parse::<OutputFormat>().unwrap(), OutputFormat::Both);
        assert!("json".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_serialise_chunks_writes_requested_formats() {
        let subs = vec![sub(1, 0, 2_000, &["Only entry"])];
        let chunks = vec![chunk(1, &subs)];
        let dir = tempfile::tempdir().expect("Failed to create temp dir");

        let written = serialise_chunks(&chunks, dir.path(), OutputFormat::Txt)
            .expect("Failed to serialise chunks");

        assert_eq!(written, vec![dir.path().join("chunk_01.txt")]);
        assert!(dir.path().join("chunk_01.txt").exists());
        assert!(!dir.path().join("chunk_01.srt").exists());
    }

    #[test]
    fn test_serialise_chunks_both_formats_and_padded_names() {
        let subs = vec![sub(1, 0, 2_000, &["Only entry"])];
        let chunks = vec![chunk(1, &subs), chunk(12, &subs)];
        let dir = tempfile::tempdir().expect("Failed to create temp dir");

        let written = serialise_chunks(&chunks, dir.path(), OutputFormat::Both)
            .expect("Failed to serialise chunks");

        assert_eq!(written.len(), 4);
        assert!(dir.path().join("chunk_01.srt").exists());
        assert!(dir.path().join("chunk_01.txt").exists());
        assert!(dir.path().join("chunk_12.srt").exists());
        assert!(dir.path().join("chunk_12.txt").exists());
    }
}
