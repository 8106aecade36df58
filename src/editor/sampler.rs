use anyhow::Result;

use super::EditorSurface;

const ENABLE_LOGS: bool = false;
const LOG_SCOPE: &str = "sampler";

use crate::log_warn;

const NBSP: char = '\u{a0}';

/// Read the currently-rendered lines, NBSP normalized to plain spaces.
///
/// Never fails: a broken read yields an empty sample.
pub fn sample_viewport(surface: &dyn EditorSurface) -> Vec<String> {
    match read_lines(surface) {
        Ok(lines) => lines,
        Err(err) => {
            log_warn!("viewport read failed: {err:?}");
            Vec::new()
        }
    }
}

/// Fallible variant used inside a sweep, where a failed read must abort the sweep.
pub(crate) fn read_lines(surface: &dyn EditorSurface) -> Result<Vec<String>> {
    let lines = surface.mounted_lines()?;
    Ok(lines.into_iter().map(normalize_line).collect())
}

fn normalize_line(line: String) -> String {
    if line.contains(NBSP) {
        line.replace(NBSP, " ")
    } else {
        line
    }
}
