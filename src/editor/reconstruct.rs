use std::collections::HashSet;
use std::time::Duration;

use anyhow::Result;
use tokio::time::Instant;

use super::sampler::{read_lines, sample_viewport};
use super::{EditorSurface, ScrollContainer};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;
const LOG_SCOPE: &str = "reconstruct";

use crate::{log_error, log_info, log_warn};

pub const DEFAULT_SETTLE_DELAY_MS: u64 = 80;
pub const DEFAULT_MAX_STEPS: usize = 40;
/// Used when the container reports neither a client nor an offset height.
const FALLBACK_VIEWPORT_HEIGHT: f64 = 200.0;

#[derive(Debug, Clone)]
pub struct ReconstructConfig {
    /// Wait after each scroll so the widget can mount the new rows.
    pub settle_delay: Duration,
    /// Upper bound on viewport-sized scroll steps per sweep.
    pub max_steps: usize,
}

impl Default for ReconstructConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_DELAY_MS),
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

/// Recovers the full text of a virtualized editor by sweeping its scroll
/// range and stitching the mounted rows together.
#[derive(Debug, Clone, Default)]
pub struct EditorReconstructor {
    config: ReconstructConfig,
}

impl EditorReconstructor {
    pub fn new(config: ReconstructConfig) -> Self {
        Self { config }
    }

    /// Best-effort full text of the editor. Never fails; a broken sweep
    /// degrades to whatever rows are mounted right now, or an empty string.
    pub async fn reconstruct(&self, surface: &dyn EditorSurface) -> String {
        match self.sweep(surface).await {
            Ok(text) => text,
            Err(err) => {
                log_error!("sweep failed, falling back to a single read: {err:?}");
                join_trimmed(&sample_viewport(surface))
            }
        }
    }

    async fn sweep(&self, surface: &dyn EditorSurface) -> Result<String> {
        let Some(container) = surface.scroll_container() else {
            return Ok(join_trimmed(&sample_viewport(surface)));
        };

        let original_offset = container.scroll_top()?;
        let geometry = ScrollGeometry::measure(container)?;
        let steps = geometry.steps(self.config.max_steps);

        let mut document = ReconstructedDocument::default();

        if steps <= 1 {
            document.push_sample(read_lines(surface)?);
            return Ok(document.into_text());
        }

        let sweep_start = Instant::now();
        let _restore = ScrollRestore::new(container, original_offset);

        for step in 0..steps {
            container.set_scroll_top(geometry.offset_for_step(step))?;
            tokio::time::sleep(self.config.settle_delay).await;
            document.push_sample(read_lines(surface)?);
        }

        log_info!(
            "swept {} steps in {}ms, captured {} distinct lines",
            steps,
            sweep_start.elapsed().as_millis(),
            document.len()
        );

        Ok(document.into_text())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ScrollGeometry {
    client_height: f64,
    scroll_height: f64,
}

impl ScrollGeometry {
    fn measure(container: &dyn ScrollContainer) -> Result<Self> {
        let mut client_height = container.client_height()?;
        if client_height <= 0.0 {
            client_height = container.offset_height()?;
        }
        if client_height <= 0.0 {
            client_height = FALLBACK_VIEWPORT_HEIGHT;
        }

        let mut scroll_height = container.scroll_height()?;
        if scroll_height <= 0.0 {
            scroll_height = client_height;
        }

        Ok(Self {
            client_height,
            scroll_height,
        })
    }

    /// Never more than `DEFAULT_MAX_STEPS`, whatever the config asks for.
    fn steps(&self, max_steps: usize) -> usize {
        let approx = (self.scroll_height / self.client_height).ceil() as usize;
        approx.min(max_steps.min(DEFAULT_MAX_STEPS))
    }

    /// Clamped so the last step lands exactly on the bottom of the range.
    fn offset_for_step(&self, step: usize) -> f64 {
        (step as f64 * self.client_height).min(self.scroll_height - self.client_height)
    }
}

/// Puts the container back where the user left it, on every exit path
/// including a dropped future.
struct ScrollRestore<'a> {
    container: &'a dyn ScrollContainer,
    offset: f64,
}

impl<'a> ScrollRestore<'a> {
    fn new(container: &'a dyn ScrollContainer, offset: f64) -> Self {
        Self { container, offset }
    }
}

impl Drop for ScrollRestore<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.container.set_scroll_top(self.offset) {
            log_warn!("failed to restore scroll offset {}: {err:?}", self.offset);
        }
    }
}

/// Distinct lines in first-seen order.
///
/// Identical rows (e.g. repeated closing braces) collapse into one entry.
#[derive(Debug, Default)]
struct ReconstructedDocument {
    seen: HashSet<String>,
    ordered: Vec<String>,
}

impl ReconstructedDocument {
    fn push_sample(&mut self, sample: Vec<String>) {
        for line in sample {
            if self.seen.insert(line.clone()) {
                self.ordered.push(line);
            }
        }
    }

    fn len(&self) -> usize {
        self.ordered.len()
    }

    fn into_text(self) -> String {
        join_trimmed(&self.ordered)
    }
}

fn join_trimmed(lines: &[String]) -> String {
    trim_blank_lines(&lines.join("\n"))
}

/// Drop whitespace-only lines from both ends, keeping the indentation of
/// the first real line.
fn trim_blank_lines(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let is_content = |line: &&str| !line.trim().is_empty();

    let (Some(first), Some(last)) = (
        lines.iter().position(is_content),
        lines.iter().rposition(is_content),
    ) else {
        return String::new();
    };

    lines[first..=last].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    /// Editor stand-in that hands out canned samples in call order.
    struct ScriptedEditor {
        client_height: f64,
        scroll_height: f64,
        samples: Vec<Vec<&'static str>>,
        with_container: bool,
        fail_scroll_to: Option<f64>,
        /// Read indices (0-based, in call order) that error instead of sampling.
        failing_reads: Vec<usize>,
        reads: Mutex<usize>,
        scroll_top: Mutex<f64>,
        writes: Mutex<Vec<f64>>,
    }

    impl ScriptedEditor {
        fn new(client_height: f64, scroll_height: f64, samples: Vec<Vec<&'static str>>) -> Self {
            Self {
                client_height,
                scroll_height,
                samples,
                with_container: true,
                fail_scroll_to: None,
                failing_reads: Vec::new(),
                reads: Mutex::new(0),
                scroll_top: Mutex::new(120.0),
                writes: Mutex::new(Vec::new()),
            }
        }

        fn reads(&self) -> usize {
            *self.reads.lock().unwrap()
        }

        fn writes(&self) -> Vec<f64> {
            self.writes.lock().unwrap().clone()
        }

        fn current_offset(&self) -> f64 {
            *self.scroll_top.lock().unwrap()
        }
    }

    impl EditorSurface for ScriptedEditor {
        fn mounted_lines(&self) -> Result<Vec<String>> {
            let mut reads = self.reads.lock().unwrap();
            let call = *reads;
            *reads += 1;
            if self.failing_reads.contains(&call) {
                return Err(anyhow!("line layer detached on read {call}"));
            }
            let idx = call.min(self.samples.len().saturating_sub(1));
            Ok(self
                .samples
                .get(idx)
                .map(|s| s.iter().map(|l| l.to_string()).collect())
                .unwrap_or_default())
        }

        fn scroll_container(&self) -> Option<&dyn ScrollContainer> {
            if self.with_container {
                Some(self)
            } else {
                None
            }
        }
    }

    impl ScrollContainer for ScriptedEditor {
        fn scroll_top(&self) -> Result<f64> {
            Ok(self.current_offset())
        }

        fn set_scroll_top(&self, offset: f64) -> Result<()> {
            if self.fail_scroll_to == Some(offset) {
                return Err(anyhow!("scroll to {offset} rejected"));
            }
            *self.scroll_top.lock().unwrap() = offset;
            self.writes.lock().unwrap().push(offset);
            Ok(())
        }

        fn client_height(&self) -> Result<f64> {
            Ok(self.client_height)
        }

        fn scroll_height(&self) -> Result<f64> {
            Ok(self.scroll_height)
        }
    }

    fn instant() -> EditorReconstructor {
        EditorReconstructor::new(ReconstructConfig {
            settle_delay: Duration::ZERO,
            ..ReconstructConfig::default()
        })
    }

    #[tokio::test]
    async fn four_step_sweep_stitches_overlapping_samples() {
        let editor = ScriptedEditor::new(
            300.0,
            1000.0,
            vec![vec!["a", "b"], vec!["b", "c"], vec!["c", "d"], vec!["d"]],
        );

        let text = EditorReconstructor::default().reconstruct(&editor).await;

        assert_eq!(text, "a\nb\nc\nd");
        assert_eq!(editor.reads(), 4);
        assert_eq!(editor.writes(), vec![0.0, 300.0, 600.0, 700.0, 120.0]);
        assert_eq!(editor.current_offset(), 120.0);
    }

    #[tokio::test]
    async fn single_page_reads_once_without_scrolling() {
        let editor = ScriptedEditor::new(300.0, 250.0, vec![vec!["x", "x", "y"]]);

        let text = instant().reconstruct(&editor).await;

        assert_eq!(text, "x\ny");
        assert_eq!(editor.reads(), 1);
        assert!(editor.writes().is_empty());
    }

    #[tokio::test]
    async fn repeated_fragments_keep_first_seen_order() {
        let editor = ScriptedEditor::new(
            100.0,
            300.0,
            vec![
                vec!["fn main() {", "    run();", "}"],
                vec!["}", "fn run() {", "    run();"],
                vec!["fn main() {", "}"],
            ],
        );

        let text = instant().reconstruct(&editor).await;

        assert_eq!(text, "fn main() {\n    run();\n}\nfn run() {");
    }

    #[tokio::test]
    async fn sweep_is_capped() {
        let editor = ScriptedEditor::new(100.0, 100_000.0, vec![vec!["line"]]);

        instant().reconstruct(&editor).await;

        assert_eq!(editor.reads(), DEFAULT_MAX_STEPS);
        assert_eq!(editor.current_offset(), 120.0);
    }

    #[tokio::test]
    async fn scroll_failure_restores_offset_and_falls_back() {
        let mut editor = ScriptedEditor::new(
            300.0,
            1000.0,
            vec![vec!["a"], vec!["b"], vec!["mounted", "now"]],
        );
        editor.fail_scroll_to = Some(600.0);

        let text = instant().reconstruct(&editor).await;

        assert_eq!(text, "mounted\nnow");
        assert_eq!(editor.writes(), vec![0.0, 300.0, 120.0]);
        assert_eq!(editor.current_offset(), 120.0);
    }

    #[tokio::test]
    async fn sweep_is_capped_even_when_configured_higher() {
        let editor = ScriptedEditor::new(10.0, 100_000.0, vec![vec!["line"]]);
        let greedy = EditorReconstructor::new(ReconstructConfig {
            settle_delay: Duration::ZERO,
            max_steps: 500,
        });

        greedy.reconstruct(&editor).await;

        assert_eq!(editor.reads(), DEFAULT_MAX_STEPS);
    }

    #[tokio::test]
    async fn read_failure_mid_sweep_restores_offset_and_falls_back() {
        let mut editor = ScriptedEditor::new(
            300.0,
            1000.0,
            vec![vec!["a"], vec!["b"], vec!["mounted", "now"]],
        );
        editor.failing_reads = vec![1];

        let text = instant().reconstruct(&editor).await;

        assert_eq!(text, "mounted\nnow");
        assert_eq!(editor.reads(), 3);
        assert_eq!(editor.writes(), vec![0.0, 300.0, 120.0]);
        assert_eq!(editor.current_offset(), 120.0);
    }

    #[tokio::test]
    async fn failed_sweep_and_failed_fallback_give_empty_text() {
        let mut editor = ScriptedEditor::new(300.0, 1000.0, vec![vec!["a"]]);
        editor.failing_reads = (0..10).collect();

        let text = instant().reconstruct(&editor).await;

        assert_eq!(text, "");
        assert_eq!(editor.reads(), 2);
        assert_eq!(editor.current_offset(), 120.0);
    }

    #[tokio::test]
    async fn missing_container_with_broken_layer_reads_once() {
        let mut editor = ScriptedEditor::new(300.0, 1000.0, vec![vec!["a"]]);
        editor.with_container = false;
        editor.failing_reads = vec![0];

        let text = instant().reconstruct(&editor).await;

        assert_eq!(text, "");
        assert_eq!(editor.reads(), 1);
    }

    #[tokio::test]
    async fn missing_container_reads_mounted_rows_once() {
        let mut editor = ScriptedEditor::new(300.0, 1000.0, vec![vec!["", "  a", "b", " "]]);
        editor.with_container = false;

        let text = instant().reconstruct(&editor).await;

        assert_eq!(text, "  a\nb");
        assert_eq!(editor.reads(), 1);
    }

    #[tokio::test]
    async fn abandoned_sweep_still_restores_offset() {
        let editor = ScriptedEditor::new(300.0, 3000.0, vec![vec!["a"]]);
        let slow = EditorReconstructor::new(ReconstructConfig {
            settle_delay: Duration::from_secs(5),
            ..ReconstructConfig::default()
        });

        let outcome =
            tokio::time::timeout(Duration::from_millis(20), slow.reconstruct(&editor)).await;

        assert!(outcome.is_err());
        assert_eq!(editor.current_offset(), 120.0);
    }

    #[test]
    fn zero_heights_use_fallbacks() {
        let editor = ScriptedEditor::new(0.0, 0.0, vec![]);
        let geometry = ScrollGeometry::measure(&editor).unwrap();
        assert_eq!(
            geometry,
            ScrollGeometry {
                client_height: FALLBACK_VIEWPORT_HEIGHT,
                scroll_height: FALLBACK_VIEWPORT_HEIGHT,
            }
        );
        assert_eq!(geometry.steps(DEFAULT_MAX_STEPS), 1);
    }

    #[test]
    fn blank_edges_are_trimmed() {
        assert_eq!(trim_blank_lines("\n \n    x\n\ny\n\t\n"), "    x\n\ny");
        assert_eq!(trim_blank_lines(" \n \n"), "");
    }
}
