pub mod history_view;
pub mod watch;

use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::history::ColorHistory;
use self::watch::{WatchConfig, WatchOutcome};

/// Alternate between the live view and the history screen until quit.
///
/// The two screens are the app's "tabs"; they share the one history store.
pub fn run_app(config: WatchConfig, history: Arc<Mutex<ColorHistory>>) -> Result<()> {
    let quit = Arc::new(AtomicBool::new(false));
    {
        let quit = quit.clone();
        ctrlc::set_handler(move || {
            quit.store(true, Ordering::SeqCst);
        })?;
    }

    loop {
        match watch::run(&config, &history, &quit)? {
            WatchOutcome::Quit => break,
            WatchOutcome::OpenHistory => match history_view::run(&history)? {
                history_view::HistoryOutcome::BackToWatch => continue,
                history_view::HistoryOutcome::Quit => break,
            },
        }
    }

    Ok(())
}
