use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::abstractions::*;
use crate::editor::{start_editor, EditorCommand};
use crate::flags::{AtomicBoolFlags, Flags};
use crate::logger::setup_logger;
use crate::start::{start, StartOptions};
use log::{error, info, warn};
use anyhow::{anyhow, Result};

/// Runs the live dashboard and the editing view on their own thread with a
/// single-threaded runtime.
pub struct DashboardWorker<RS: RecordStore, EE: EventEmitter> {
    flags: Arc<AtomicBoolFlags>,
    store: Arc<RS>,
    event_emitter: Arc<EE>,
    settings_path: Option<PathBuf>,
    commands: UnboundedSender<EditorCommand>,
    commands_rx: Option<UnboundedReceiver<EditorCommand>>,
    handle: Option<JoinHandle<Result<()>>>
}

impl<RS: RecordStore, EE: EventEmitter> DashboardWorker<RS, EE> {
    pub fn new(store: Arc<RS>, event_emitter: Arc<EE>) -> Self {
        let (commands, commands_rx) = mpsc::unbounded_channel();

        Self {
            flags: Arc::new(AtomicBoolFlags::new()),
            store,
            event_emitter,
            settings_path: None,
            commands,
            commands_rx: Some(commands_rx),
            handle: None
        }
    }

    /// Reads settings from `path` instead of `settings.json` next to the
    /// executable.
    pub fn with_settings_path(mut self, path: PathBuf) -> Self {
        self.settings_path = Some(path);
        self
    }

    pub fn start(&mut self) {
        let Some(commands) = self.commands_rx.take() else {
            warn!("dashboard worker already started");
            return;
        };

        let flags = self.flags.clone();
        let store = self.store.clone();
        let event_emitter = self.event_emitter.clone();
        let settings_path = self.settings_path.clone();

        let handle = std::thread::spawn(move || {
            let mut file_system = DefaultFileSystem::new();
            let settings_path = match settings_path {
                Some(path) => path,
                None => file_system.get_executable_directory()?.join("settings.json"),
            };

            let settings = DefaultSettingsManager::new(&mut file_system, settings_path).get_or_create()?;

            let _logger = match setup_logger(&settings.logging) {
                Ok(handle) => Some(handle),
                Err(err) => {
                    warn!("logger not started: {}", err);
                    None
                }
            };

            let options = StartOptions::from(&settings.general);
            info!("tick interval {:?}", options.tick_interval);

            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()?;

            let clock = Arc::new(SystemClock::new());
            let flag_poll_interval = options.flag_poll_interval;

            runtime
                .block_on(async move {
                    tokio::try_join!(
                        start(flags.clone(), store.clone(), event_emitter.clone(), clock.clone(), options),
                        start_editor(flags, store, event_emitter, clock, commands, flag_poll_interval),
                    )
                })
                .map(|_| ())
                .inspect_err(|err| error!("unexpected error occurred in dashboard: {}", err))
        });

        self.handle = Some(handle);
    }

    /// Forwards a user action to the editing view.
    pub fn send(&self, command: EditorCommand) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|err| anyhow!("editor is not running: {:?}", err.0))
    }

    /// Asks the dashboard to re-read every boss, as when it becomes visible
    /// again.
    pub fn refresh(&self) {
        self.flags.set_refresh();
    }

    pub fn join(&mut self) -> Result<()> {
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|err| anyhow!("Error while stopping dashboard: {:?}", err))?,
            None => Ok(()),
        }
    }

    pub fn stop(&mut self) -> Result<()> {
        self.flags.set_stop();
        self.join()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio::sync::mpsc;

    use crate::test_utils::seeded_store;

    use super::*;

    fn settings_path() -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();

        std::env::temp_dir().join(format!("boss_spawn_tracker_{nanos}")).join("settings.json")
    }

    #[test]
    fn should_render_and_follow_store_changes() {
        let store = Arc::new(seeded_store(&[json!({ "name": "Venatus" })]));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let path = settings_path();

        let mut worker = DashboardWorker::new(store.clone(), Arc::new(ChannelEventEmitter::new(tx)))
            .with_settings_path(path.clone());
        worker.start();

        let first = loop {
            if let Some(AppEvent::DashboardRefresh(rows)) = rx.blocking_recv() {
                break rows;
            }
        };
        assert_eq!(first.len(), 1);

        store.create("bosses", json!({ "name": "Clemantis" })).unwrap();

        let second = loop {
            if let Some(AppEvent::DashboardRefresh(rows)) = rx.blocking_recv() {
                break rows;
            }
        };
        assert_eq!(second.len(), 2);

        store.insert("tokens/secret", json!(true)).unwrap();
        worker.send(EditorCommand::ShowBossList { token: Some("secret".into()) }).unwrap();

        let listed = loop {
            if let Some(AppEvent::BossListRefresh(rows)) = rx.blocking_recv() {
                break rows;
            }
        };
        assert_eq!(listed.len(), 2);

        worker.stop().unwrap();
        assert!(path.exists());

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn should_join_without_start() {
        let store = Arc::new(seeded_store(&[]));
        let mut worker = DashboardWorker::new(store, Arc::new(DefaultEventEmitter::new()));

        assert!(worker.join().is_ok());
    }
}
