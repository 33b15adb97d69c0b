//! Command-line event loop
//!
//! Events from stdin, Ctrl-C and the autoreload task arrive on one channel
//! and are handled to completion one at a time. Once the channel is drained
//! the controller settles any pending recompute.

use super::FileHost;
use crate::app::NotebookViewer;
use crate::config::Config;
use crate::error::AppResult;
use crate::file_handler::{read_source, Autoreload, AutoreloadConfig};
use crate::message::{Command, HostEvent, Message};
use crate::render::Capabilities;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// One command-line viewing session
#[derive(Debug, Clone)]
pub struct Session {
    /// Notebook to view
    pub notebook: PathBuf,
    /// Page output path
    pub output: PathBuf,
    /// Effective configuration, CLI overrides applied
    pub config: Config,
    /// Initial colour-scheme preference
    pub prefers_dark: bool,
    /// Stop when stdin closes
    pub quit_on_eof: bool,
}

/// What the loop does after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Restart,
    Quit,
}

/// Run the session until quit
///
/// An unavailable source at (re)start writes an error page and ends the
/// session with an error.
pub async fn run(mut session: Session) -> AppResult<()> {
    let (events, mut receiver) = mpsc::unbounded_channel();
    spawn_input(events.clone(), session.quit_on_eof);
    let capabilities = Capabilities::bundled();
    let mut generation = 0u64;

    loop {
        generation += 1;
        let source = match read_source(&session.notebook, session.config.files.max_file_size).await
        {
            Ok(source) => {
                log::debug!(
                    "Read {} ({} bytes, {:?}{})",
                    session.notebook.display(),
                    source.size_bytes,
                    source.encoding,
                    if source.lossy { ", lossy" } else { "" }
                );
                source
            }
            Err(e) => {
                log::error!("{}", e);
                let host = FileHost::new(
                    &session.output,
                    session.config.ui.assets_base.clone(),
                    session.prefers_dark,
                );
                if let Err(write_err) = host.present_error(&session.config.viewer.theme, &e.to_string()) {
                    log::error!("{}", write_err);
                }
                return Err(e.into());
            }
        };

        let host = FileHost::new(
            &session.output,
            session.config.ui.assets_base.clone(),
            session.prefers_dark,
        );
        let payload = session.config.init_payload(source.content.clone());
        let mut viewer = NotebookViewer::init(payload, capabilities.clone(), host);

        let autoreload = session.config.files.autoreload.then(|| {
            Autoreload::start(
                AutoreloadConfig {
                    path: session.notebook.clone(),
                    interval: Duration::from_millis(session.config.files.autoreload_interval_ms),
                    max_file_size: session.config.files.max_file_size,
                    generation,
                },
                source.content,
                events.clone(),
            )
        });

        let flow = drive(
            &mut viewer,
            autoreload.as_ref(),
            &mut receiver,
            &mut session.prefers_dark,
        )
        .await;
        log::debug!("{} pages written", viewer.host().pages_written());

        if let Some(autoreload) = &autoreload {
            autoreload.cancel();
        }
        match flow {
            Flow::Restart => log::info!("Restarting viewer"),
            Flow::Quit => {
                log::info!("Viewer stopped");
                return Ok(());
            }
        }
    }
}

/// Handle events until a restart or quit is requested
async fn drive(
    viewer: &mut NotebookViewer<FileHost>,
    autoreload: Option<&Autoreload>,
    receiver: &mut UnboundedReceiver<HostEvent>,
    prefers_dark: &mut bool,
) -> Flow {
    while let Some(event) = receiver.recv().await {
        if let Some(flow) = handle(viewer, autoreload, event, prefers_dark) {
            return flow;
        }
        while let Ok(event) = receiver.try_recv() {
            if let Some(flow) = handle(viewer, autoreload, event, prefers_dark) {
                return flow;
            }
        }
        viewer.settle();
    }
    Flow::Quit
}

fn handle(
    viewer: &mut NotebookViewer<FileHost>,
    autoreload: Option<&Autoreload>,
    event: HostEvent,
    prefers_dark: &mut bool,
) -> Option<Flow> {
    match event {
        HostEvent::Message(message) => match viewer.update(message) {
            Command::None => None,
            Command::Restart => Some(Flow::Restart),
            Command::CancelAutoreload => {
                match autoreload {
                    Some(autoreload) => autoreload.cancel(),
                    None => log::debug!("Autoreload not running"),
                }
                None
            }
        },
        HostEvent::ToggleRawMode => {
            viewer.toggle_raw_mode();
            None
        }
        HostEvent::ToggleContentOption(option) => {
            viewer.toggle_content_option(option);
            None
        }
        HostEvent::PreferenceChanged { dark } => {
            *prefers_dark = dark;
            viewer.host_mut().set_prefers_dark(dark);
            viewer.redraw();
            None
        }
        HostEvent::AutoreloadTick { generation, raw } => {
            if autoreload.is_some_and(|autoreload| autoreload.accepts(generation)) {
                viewer.update(Message::Raw { raw });
            } else {
                log::debug!("Dropping tick from inactive autoreload");
            }
            None
        }
        HostEvent::Quit => Some(Flow::Quit),
    }
}

/// Forward stdin lines and Ctrl-C to the event channel
fn spawn_input(events: UnboundedSender<HostEvent>, quit_on_eof: bool) {
    let line_events = events.clone();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if let Some(event) = HostEvent::parse_line(&line) {
                        if line_events.send(event).is_err() {
                            break;
                        }
                    }
                }
                Ok(None) => {
                    log::debug!("stdin closed");
                    if quit_on_eof {
                        let _ = line_events.send(HostEvent::Quit);
                    }
                    break;
                }
                Err(e) => {
                    log::warn!("Failed to read stdin: {}", e);
                    break;
                }
            }
        }
    });

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = events.send(HostEvent::Quit);
        }
    });
}
