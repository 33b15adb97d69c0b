//! Periodic source refresh
//!
//! Polls the notebook file on a fixed interval and forwards changed text to
//! the host event loop. Cancellation clears the shared active flag before the
//! task is aborted; the loop also checks the flag before sending, so no tick
//! is delivered once `cancel` has returned. Ticks carry the generation of the
//! loop that sent them, so a tick still queued from an earlier loop is never
//! mistaken for one of the current loop.

use super::io::read_source;
use crate::message::HostEvent;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Settings for one refresh loop
#[derive(Debug, Clone)]
pub struct AutoreloadConfig {
    pub path: PathBuf,
    pub interval: Duration,
    pub max_file_size: u64,
    /// Tag stamped on every tick this loop sends
    pub generation: u64,
}

/// Handle to a running refresh loop
#[derive(Debug)]
pub struct Autoreload {
    active: Arc<AtomicBool>,
    generation: u64,
    task: JoinHandle<()>,
}

impl Autoreload {
    /// Spawn the loop; `last_seen` is the text the viewer was initialized with
    pub fn start(
        config: AutoreloadConfig,
        last_seen: String,
        events: UnboundedSender<HostEvent>,
    ) -> Self {
        let active = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&active);
        let generation = config.generation;

        log::info!(
            "Autoreload started for {} every {:?}",
            config.path.display(),
            config.interval
        );

        let task = tokio::spawn(async move {
            let mut last_seen = last_seen;
            let mut interval = tokio::time::interval(config.interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // first tick completes immediately
            interval.tick().await;

            loop {
                interval.tick().await;
                if !flag.load(Ordering::SeqCst) {
                    break;
                }

                let source = match read_source(&config.path, config.max_file_size).await {
                    Ok(source) => source,
                    Err(e) => {
                        log::debug!("Autoreload read skipped: {}", e);
                        continue;
                    }
                };
                if source.content == last_seen {
                    continue;
                }

                log::debug!("Autoreload: {} changed", config.path.display());
                last_seen = source.content.clone();
                if !flag.load(Ordering::SeqCst) {
                    break;
                }
                if events
                    .send(HostEvent::AutoreloadTick {
                        generation: config.generation,
                        raw: source.content,
                    })
                    .is_err()
                {
                    break;
                }
            }
        });

        Self {
            active,
            generation,
            task,
        }
    }

    /// Whether ticks from this loop may still be acted upon
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Whether a tick stamped with `generation` should be applied
    pub fn accepts(&self, generation: u64) -> bool {
        self.generation == generation && self.is_active()
    }

    /// Stop the loop
    pub fn cancel(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            log::info!("Autoreload cancelled");
        }
        self.task.abort();
    }
}

impl Drop for Autoreload {
    fn drop(&mut self) {
        self.cancel();
    }
}
