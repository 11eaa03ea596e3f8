//! Offline numeric sort for dataset files.
//!
//! Records are `;`-separated; the first field is the sort key. Lines whose
//! first field is not an integer are dropped from the output.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Outcome of a sort run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortReport {
    /// Lines written to the output
    pub kept: usize,
    /// Non-empty lines dropped because their key did not parse
    pub skipped: usize,
}

/// Sort `lines` by their leading integer field, stable for equal keys
pub fn sort_records<'a, I>(lines: I) -> (Vec<&'a str>, usize)
where
    I: IntoIterator<Item = &'a str>,
{
    let mut skipped = 0;
    let mut keyed: Vec<(i64, &str)> = Vec::new();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let first = line.split(';').next().unwrap_or_default();
        match first.trim().parse::<i64>() {
            Ok(key) => keyed.push((key, line)),
            Err(_) => skipped += 1,
        }
    }

    keyed.sort_by_key(|(key, _)| *key);
    (keyed.into_iter().map(|(_, line)| line).collect(), skipped)
}

/// Sort the dataset at `input` numerically and write it to `output`
pub fn sort_numeric(input: &Path, output: &Path) -> Result<SortReport> {
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let (sorted, skipped) = sort_records(content.lines());

    let file = File::create(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    let mut writer = BufWriter::new(file);
    for line in &sorted {
        writeln!(writer, "{}", line)?;
    }
    writer.flush()?;

    Ok(SortReport {
        kept: sorted.len(),
        skipped,
    })
}
