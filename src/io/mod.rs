pub mod output;

pub use output::{create_writer, JsonWriter, OutputFormat, OutputWriter, TerminalWriter};

use crate::core::PulseEntry;
use crate::errors::{Error, Result, ResultExt};
use std::fs;
use std::path::Path;

pub fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| Error::file_system(format!("Cannot read {}", path.display()), path, e))
}

pub fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content)
        .map_err(|e| Error::file_system(format!("Cannot write {}", path.display()), path, e))
}

/// Decode a JSON array of entries.
pub fn parse_entries(contents: &str) -> Result<Vec<PulseEntry>> {
    serde_json::from_str(contents).map_err(|e| {
        Error::invalid_input(format!("expected a JSON array of pulse entries: {}", e))
    })
}

/// Read and decode an entry file. Decoding errors name the file.
pub fn read_entries(path: &Path) -> Result<Vec<PulseEntry>> {
    let entries = parse_entries(&read_file(path)?).context(path.display().to_string())?;
    log::debug!("Loaded {} entries from {}", entries.len(), path.display());
    Ok(entries)
}
