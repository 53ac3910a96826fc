//! Result output: JSON-lines per game plus a run summary.

use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use time::format_description;
use time::OffsetDateTime;

use crate::types::{GameResult, RunSummary};

pub struct OutputWriter {
    games: Option<BufWriter<File>>,
    path: Option<PathBuf>,
}

impl OutputWriter {
    /// Writing is optional; `None` keeps everything on stdout only.
    pub fn new(dir: Option<&str>) -> std::io::Result<Self> {
        let Some(dir) = dir else {
            return Ok(Self {
                games: None,
                path: None,
            });
        };
        create_dir_all(dir)?;
        let format = format_description::parse("[year][month][day]-[hour][minute][second]")
            .expect("static format string");
        let stamp = OffsetDateTime::now_utc()
            .format(&format)
            .unwrap_or_else(|_| "run".into());
        let path = PathBuf::from(dir).join(format!("games-{stamp}.jsonl"));
        let file = File::create(&path)?;
        Ok(Self {
            games: Some(BufWriter::new(file)),
            path: Some(path),
        })
    }

    pub fn write_game(&mut self, result: &GameResult) -> std::io::Result<()> {
        if let Some(writer) = self.games.as_mut() {
            serde_json::to_writer(&mut *writer, result)?;
            writeln!(writer)?;
        }
        Ok(())
    }

    pub fn finish(mut self, summary: &RunSummary) -> std::io::Result<Option<PathBuf>> {
        if let Some(writer) = self.games.as_mut() {
            writer.flush()?;
        }
        println!(
            "{}",
            serde_json::to_string_pretty(summary).unwrap_or_else(|_| "{}".into())
        );
        Ok(self.path)
    }
}
