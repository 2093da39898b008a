//! Shared fixtures for the workspace integration tests.

use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Once;

use tempfile::TempDir;

/// Text carried by the tenth line of every generated fixture.
pub const SENTINEL: &str = "That's ten!";

/// A generated line file that lives as long as this value.
pub struct LineFixture {
    _dir: TempDir,
    path: PathBuf,
    lines: usize,
}

impl LineFixture {
    /// Write `lines` lines (at least ten) into a fresh temporary directory.
    ///
    /// Line 10 contains [`SENTINEL`]; every other line is numbered filler.
    pub fn generate(lines: usize) -> io::Result<Self> {
        let lines = lines.max(10);
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("TestLines.txt");
        let mut out = BufWriter::new(std::fs::File::create(&path)?);
        for n in 1..=lines {
            if n == 10 {
                writeln!(out, "Line {n}: {SENTINEL}")?;
            } else {
                writeln!(out, "Line {n}: the quick brown fox jumps over the lazy dog")?;
            }
        }
        out.flush()?;
        tracing::debug!(path = %path.display(), lines, "generated line fixture");
        Ok(Self {
            _dir: dir,
            path,
            lines,
        })
    }

    /// Location of the generated file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of lines written.
    #[must_use]
    pub fn lines(&self) -> usize {
        self.lines
    }
}

/// Install a test-friendly tracing subscriber once per test binary.
///
/// Honors `RUST_LOG`; defaults to warnings only.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        // Another harness may have installed a global subscriber already.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
