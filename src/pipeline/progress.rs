// file: src/pipeline/progress.rs
// description: progress bars and counters for multi-document commands
// reference: https://docs.rs/indicatif

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchStats {
    pub processed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub bytes: u64,
    pub duration: Duration,
}

impl BatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempted(&self) -> usize {
        self.processed + self.failed
    }

    pub fn success_rate(&self) -> f64 {
        let total = self.attempted();
        if total == 0 {
            return 0.0;
        }
        (self.processed as f64 / total as f64) * 100.0
    }

    pub fn format(&self) -> String {
        format!(
            "{} processed, {} failed, {} skipped, {:.1} KB in {:.2}s",
            self.processed,
            self.failed,
            self.skipped,
            self.bytes as f64 / 1024.0,
            self.duration.as_secs_f64()
        )
    }
}

/// Counts documents through a batch and renders a bar with a detail line.
pub struct ProgressTracker {
    main_bar: ProgressBar,
    detail_bar: ProgressBar,
    processed: Arc<AtomicUsize>,
    failed: Arc<AtomicUsize>,
    skipped: Arc<AtomicUsize>,
    bytes: Arc<AtomicU64>,
    start_time: Instant,
}

impl ProgressTracker {
    pub fn new(total: usize) -> Self {
        Self::with_color(total, true)
    }

    pub fn with_color(total: usize, colored: bool) -> Self {
        let multi_progress = MultiProgress::new();

        Self {
            main_bar: create_progress_bar(&multi_progress, total as u64, colored),
            detail_bar: create_detail_bar(&multi_progress),
            processed: Arc::new(AtomicUsize::new(0)),
            failed: Arc::new(AtomicUsize::new(0)),
            skipped: Arc::new(AtomicUsize::new(0)),
            bytes: Arc::new(AtomicU64::new(0)),
            start_time: Instant::now(),
        }
    }

    /// A tracker that counts without drawing.
    pub fn hidden(total: usize) -> Self {
        let tracker = Self::with_color(total, false);
        tracker.main_bar.set_draw_target(indicatif::ProgressDrawTarget::hidden());
        tracker.detail_bar.set_draw_target(indicatif::ProgressDrawTarget::hidden());
        tracker
    }

    pub fn inc_processed(&self, bytes: u64) {
        self.processed.fetch_add(1, Ordering::SeqCst);
        self.bytes.fetch_add(bytes, Ordering::SeqCst);
        self.advance();
    }

    pub fn inc_failed(&self) {
        self.failed.fetch_add(1, Ordering::SeqCst);
        self.advance();
    }

    pub fn inc_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
        self.advance();
    }

    pub fn set_message(&self, message: String) {
        self.main_bar.set_message(message);
    }

    pub fn finish(&self) {
        self.main_bar.finish_with_message("done");
        self.detail_bar.finish_and_clear();
    }

    pub fn get_stats(&self) -> BatchStats {
        BatchStats {
            processed: self.processed.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
            skipped: self.skipped.load(Ordering::SeqCst),
            bytes: self.bytes.load(Ordering::SeqCst),
            duration: self.start_time.elapsed(),
        }
    }

    fn advance(&self) {
        self.main_bar.inc(1);
        self.detail_bar.set_message(format!(
            "Processed: {} | Failed: {} | Skipped: {}",
            self.processed.load(Ordering::SeqCst),
            self.failed.load(Ordering::SeqCst),
            self.skipped.load(Ordering::SeqCst)
        ));
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        self.finish();
    }
}

fn create_progress_bar(multi_progress: &MultiProgress, total: u64, colored: bool) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(total));
    let (template, chars) = if colored {
        (
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
            "█▓▒░",
        )
    } else {
        ("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} {msg}", "=>-")
    };

    let style = ProgressStyle::default_bar()
        .template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars(chars);
    bar.set_style(style);
    bar
}

fn create_detail_bar(multi_progress: &MultiProgress) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(0));
    let style = ProgressStyle::default_bar()
        .template("{msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar
}
