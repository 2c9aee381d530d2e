//! Status output and file output.

pub mod utils;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use lazy_static::lazy_static;

lazy_static! {
    static ref DEFAULT_PROGRESS_STYLE: ProgressStyle = ProgressStyle::default_bar()
        .template("Progress: {bar:40}  {percent}% | ETA: {eta}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
}

/// How much non-critical status information to print.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Verbosity {
    #[default]
    Quiet,
    Messages,
    Progress,
}

impl Verbosity {
    /// Whether status messages should be printed.
    pub fn print_messages(&self) -> bool {
        match self {
            Self::Quiet => false,
            Self::Messages | Self::Progress => true,
        }
    }

    /// Whether progress bars should be shown.
    pub fn show_progress(&self) -> bool {
        *self == Self::Progress
    }

    /// Creates a progress bar for the given number of items,
    /// which is hidden unless progress should be shown.
    pub fn create_progress_bar(&self, n_items: usize) -> ProgressBar {
        if self.show_progress() {
            let progress_bar = ProgressBar::new(n_items as u64);
            progress_bar.set_style(DEFAULT_PROGRESS_STYLE.clone());
            progress_bar
        } else {
            ProgressBar::with_draw_target(Some(n_items as u64), ProgressDrawTarget::hidden())
        }
    }
}
