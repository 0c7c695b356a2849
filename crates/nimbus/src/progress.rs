//! Terminal spinner driven by the console's request loader.

use std::io::{self, IsTerminal};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tokio::task::JoinHandle;

use nimbus_core::Loader;

const TICK: Duration = Duration::from_millis(90);

/// Shows a spinner on stderr while any request is in flight.
///
/// Dropping it stops the watcher and clears the line.
pub struct Spinner {
    task: JoinHandle<()>,
}

impl Spinner {
    /// `None` when stderr is not a terminal or output is suppressed.
    pub fn attach(loader: &Loader, quiet: bool) -> Option<Self> {
        if quiet || !io::stderr().is_terminal() {
            return None;
        }

        let mut rx = loader.subscribe();
        let task = tokio::spawn(async move {
            let mut active: Option<ClearOnDrop> = None;
            loop {
                let in_flight = *rx.borrow_and_update();
                match (in_flight, &active) {
                    (0, Some(_)) => active = None,
                    (n, None) if n > 0 => active = Some(ClearOnDrop::start()),
                    _ => {}
                }
                if rx.changed().await.is_err() {
                    break;
                }
            }
        });
        Some(Self { task })
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.task.abort();
    }
}

struct ClearOnDrop(ProgressBar);

impl ClearOnDrop {
    fn start() -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            bar.set_style(style);
        }
        bar.set_message("loading");
        bar.enable_steady_tick(TICK);
        Self(bar)
    }
}

impl Drop for ClearOnDrop {
    fn drop(&mut self) {
        self.0.finish_and_clear();
    }
}
