use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use once_cell::sync::Lazy;
use peel_convert::{Progress, ProgressCallback};

const SPINNER_STYLE: &str = "{spinner:.blue} {prefix:>10.cyan.bold} [{elapsed_precise}] {pos} leaves {wide_msg}";

const TICK: &str = "⠁⠂⠄⡀⢀⠠⠐⠈ ";

static SPINNER_TEMPLATE: Lazy<Option<ProgressStyle>> = Lazy::new(|| {
    ProgressStyle::with_template(SPINNER_STYLE)
        .ok()
        .map(|style| style.tick_chars(TICK))
});

/// Spinner fed by the converter's progress callback.
pub struct LeafTracker {
    pb: ProgressBar,
}

impl LeafTracker {
    pub fn new(prefix: &str, visible: bool) -> Self {
        let pb = ProgressBar::new_spinner();
        if !visible {
            pb.set_draw_target(ProgressDrawTarget::hidden());
        }
        if let Some(style) = SPINNER_TEMPLATE.as_ref() {
            pb.set_style(style.clone());
        }
        pb.set_prefix(prefix.to_string());
        pb.enable_steady_tick(Duration::from_millis(120));
        Self { pb }
    }

    pub fn callback(&self) -> ProgressCallback {
        let pb = self.pb.clone();
        Arc::new(move |progress: Progress| {
            pb.set_position(progress.counts.read);
            pb.set_message(format!(
                "[{}/{}] {}",
                progress.input_index + 1,
                progress.input_total,
                progress.path
            ));
        })
    }

    pub fn finish(self, message: String) {
        self.pb.finish_with_message(message);
    }

    pub fn abandon(self) {
        self.pb.abandon();
    }
}
