//! JSON-lines export of tick reports

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use stride_motion::{BobCurves, PhaseMarkers, TickReport};

/// Writes one JSON object per line
pub struct JsonLines<W: Write> {
    writer: W,
    lines: u64,
}

impl JsonLines<BufWriter<File>> {
    /// Create (or truncate) a file
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonLines<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, lines: 0 }
    }

    pub fn write<T: Serialize>(&mut self, record: &T) -> Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.lines += 1;
        Ok(())
    }

    pub fn lines(&self) -> u64 {
        self.lines
    }

    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

#[derive(Serialize)]
struct CurvesLine {
    curves: BobCurves,
}

#[derive(Serialize)]
struct TickLine<'a> {
    #[serde(flatten)]
    report: &'a TickReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    markers: Option<PhaseMarkers>,
}

/// Tick reports plus the data a bob overlay plots
///
/// The reference curves go out once, ahead of the first tick that carries a
/// gait snapshot. Every such tick also gets its phase markers.
pub struct TelemetryExport<W: Write> {
    out: JsonLines<W>,
    curve_samples: usize,
    curves_written: bool,
}

impl TelemetryExport<BufWriter<File>> {
    pub fn create(path: &Path, curve_samples: usize) -> Result<Self> {
        Ok(Self::new(JsonLines::create(path)?, curve_samples))
    }
}

impl<W: Write> TelemetryExport<W> {
    pub fn new(out: JsonLines<W>, curve_samples: usize) -> Self {
        Self {
            out,
            curve_samples,
            curves_written: false,
        }
    }

    pub fn record(&mut self, report: &TickReport) -> Result<()> {
        let snapshot = report.snapshot.as_ref();
        if let Some(snapshot) = snapshot.filter(|_| !self.curves_written) {
            self.out.write(&CurvesLine {
                curves: snapshot.curves(self.curve_samples),
            })?;
            self.curves_written = true;
        }
        self.out.write(&TickLine {
            report,
            markers: snapshot.map(|s| s.markers()),
        })
    }

    pub fn lines(&self) -> u64 {
        self.out.lines()
    }

    pub fn finish(self) -> Result<W> {
        self.out.finish()
    }
}

/// Telemetry destination chosen on the command line
pub fn telemetry_path(arg: Option<PathBuf>) -> Option<PathBuf> {
    arg.filter(|p| !p.as_os_str().is_empty())
}
