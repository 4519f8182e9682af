use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::JobError;
use crate::ranker::GroupRanking;

/// Column/metric names announced by each group's header record
pub const HEADER_COLUMN: &str = "Feature_Index";
pub const HEADER_METRIC: &str = "Mean_Concentration";

/// JSON payload of one output line
///
/// Field declaration order fixes the serialized key order, which downstream
/// consumers compare byte-for-byte.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutputPayload {
    Header { column: String, metric: String },
    Entry { feature_index: usize, average_value: f64 },
}

impl OutputPayload {
    pub fn header() -> Self {
        Self::Header {
            column: HEADER_COLUMN.to_string(),
            metric: HEADER_METRIC.to_string(),
        }
    }
}

/// One output line: a group label plus its payload
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry {
    pub label: String,
    pub payload: OutputPayload,
}

/// The full ordered output of a run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobResult {
    pub entries: Vec<RankedEntry>,
}

impl JobResult {
    /// Appends one group's section: its header followed by its ranked entries
    pub fn push_group(&mut self, ranking: GroupRanking) {
        self.entries.push(RankedEntry {
            label: ranking.label.clone(),
            payload: OutputPayload::header(),
        });
        for feature in ranking.features {
            self.entries.push(RankedEntry {
                label: ranking.label.clone(),
                payload: OutputPayload::Entry {
                    feature_index: feature.dimension,
                    average_value: feature.mean,
                },
            });
        }
    }

    /// Renders the artifact: one `"<label>"<TAB><json>` line per entry,
    /// in sequence order
    pub fn render(&self) -> Result<String, JobError> {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&serde_json::to_string(&entry.label)?);
            out.push('\t');
            out.push_str(&serde_json::to_string(&entry.payload)?);
            out.push('\n');
        }
        Ok(out)
    }
}

/// Writes the artifact next to its final path and publishes it atomically,
/// so a failed run never leaves a partial or inconsistent file in place
pub fn write_job_result(path: &Path, result: &JobResult) -> Result<(), JobError> {
    let staging = staging_path(path);

    let file = File::create(&staging)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(result.render()?.as_bytes())?;
    writer.into_inner().map_err(|e| e.into_error())?.sync_all()?;

    fs::rename(&staging, path)?;
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
