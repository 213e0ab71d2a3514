// Result file output
//
// One line per selected engine, "<code> (score: <n>)", in the order given
// (callers pass results already sorted by descending score). The file is only
// ever appended to.

use log::{error, info};
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::FinderError;
use crate::selection::CandidateResult;

pub fn format_line(result: &CandidateResult) -> String {
    format!("{} (score: {})", result.code, result.score)
}

/// Writes results to any writer
pub fn write_results<W: Write>(mut writer: W, results: &[CandidateResult]) -> std::io::Result<()> {
    for result in results {
        writeln!(writer, "{}", format_line(result))?;
    }
    writer.flush()
}

/// Appends results to the file at `path`, creating it if needed
pub fn append_results<P: AsRef<Path>>(
    path: P,
    results: &[CandidateResult],
) -> Result<(), FinderError> {
    let path = path.as_ref();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            error!("Failed to open results file '{}': {}", path.display(), e);
            e
        })?;

    write_results(BufWriter::new(file), results).map_err(|e| {
        error!("Failed to write results to '{}': {}", path.display(), e);
        e
    })?;

    info!("Wrote {} engines to {}", results.len(), path.display());
    Ok(())
}
