use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;
use std::time::Instant;

use crate::config::Config;
use crate::feed_fetch::{self, FeedSource, HttpFeedSource};
use crate::state::{Delta, ProviderCommand};

/// Serves `LoadFeeds` commands over HTTP until the command channel closes.
pub fn spawn_feed_worker(config: Config, tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    thread::spawn(move || {
        let source = match HttpFeedSource::from_config(&config) {
            Ok(source) => Arc::new(source),
            Err(err) => {
                let _ = tx.send(Delta::LoadFailed(err.to_string()));
                return;
            }
        };
        let _ = tx.send(Delta::Log(format!(
            "[INFO] Feeds: {} | {}",
            config.records_url(),
            config.reference_url()
        )));
        run_worker(source, &tx, &cmd_rx);
    });
}

pub fn run_worker<S>(source: Arc<S>, tx: &Sender<Delta>, cmd_rx: &Receiver<ProviderCommand>)
where
    S: FeedSource + 'static,
{
    while let Ok(cmd) = cmd_rx.recv() {
        // Reload requests queued while a load was running collapse into one.
        while cmd_rx.try_recv().is_ok() {}
        match cmd {
            ProviderCommand::LoadFeeds => {
                let started = Instant::now();
                let delta = match feed_fetch::load_with(Arc::clone(&source)) {
                    Ok(feeds) => {
                        let _ = tx.send(Delta::Log(format!(
                            "[INFO] Feeds fetched in {}ms",
                            started.elapsed().as_millis()
                        )));
                        Delta::SetFeeds(feeds)
                    }
                    Err(err) => Delta::LoadFailed(err.to_string()),
                };
                if tx.send(delta).is_err() {
                    return;
                }
            }
        }
    }
}
