use std::future::pending;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use log::{info, warn};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::sleep;

use crate::abstractions::*;
use crate::access::{AccessGate, EditorCapability, Session, View};
use crate::boss_list::{BossForm, BossList};
use crate::constants::ACCESS_GRANTED_NOTICE;
use crate::error::{AuthFailure, TrackerError};
use crate::flags::Flags;

/// User actions from the navigation bar and the editing view.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorCommand {
    ShowDashboard,
    /// `token` is what the user typed at the prompt, `None` when cancelled.
    /// Ignored once the session is unlocked.
    ShowBossList { token: Option<String> },
    OpenForEdit { key: String },
    Submit(BossForm),
    Reset { key: String },
    Delete { key: String },
}

/// Session, gate and list of the editing view. The list subscription is
/// only held while the editing view is shown.
pub struct Editor<RS, EE, FL, CL>
where
    RS: RecordStore,
    EE: EventEmitter,
    FL: Flags,
    CL: Clock,
{
    gate: AccessGate<RS>,
    list: BossList<RS>,
    session: Session,
    subscription: Option<UnboundedReceiver<Snapshot>>,
    event_emitter: Arc<EE>,
    flags: Arc<FL>,
    clock: Arc<CL>,
}

impl<RS, EE, FL, CL> Editor<RS, EE, FL, CL>
where
    RS: RecordStore,
    EE: EventEmitter,
    FL: Flags,
    CL: Clock,
{
    pub fn new(store: Arc<RS>, event_emitter: Arc<EE>, flags: Arc<FL>, clock: Arc<CL>) -> Self {
        Self {
            gate: AccessGate::new(store.clone()),
            list: BossList::new(store),
            session: Session::new(),
            subscription: None,
            event_emitter,
            flags,
            clock,
        }
    }

    pub fn view(&self) -> View {
        self.session.view()
    }

    /// Runs one command. A failure becomes a notice and leaves the view as
    /// it was.
    pub fn handle(&mut self, command: EditorCommand) {
        if let Err(err) = self.try_handle(command) {
            warn!("editor action failed: {}", err);
            self.emit(AppEvent::Notice(err.notice()));
        }
    }

    fn try_handle(&mut self, command: EditorCommand) -> Result<(), TrackerError> {
        match command {
            EditorCommand::ShowDashboard => {
                self.subscription = None;
                let view = self.session.show_dashboard();
                self.flags.set_refresh();
                self.emit(AppEvent::ViewChanged(view));
            }
            EditorCommand::ShowBossList { token } => {
                let was_locked = self.session.capability().is_none();
                self.session.show_boss_list(&self.gate, || token)?;

                if was_locked {
                    self.emit(AppEvent::Notice(ACCESS_GRANTED_NOTICE.to_string()));
                }

                if self.subscription.is_none() {
                    self.subscription = Some(self.list.subscribe()?);
                }

                self.emit(AppEvent::ViewChanged(View::BossList));
            }
            EditorCommand::OpenForEdit { key } => {
                let capability = self.capability()?;
                let form = self.list.open_for_edit(&capability, &key, &self.clock.now().timezone())?;
                self.emit(AppEvent::FormChanged(form));
            }
            EditorCommand::Submit(form) => {
                let capability = self.capability()?;
                self.list.submit(&capability, &form)?;
                self.emit(AppEvent::FormChanged(BossForm::new()));
            }
            EditorCommand::Reset { key } => {
                let capability = self.capability()?;
                self.list.reset(&capability, &key, self.clock.now().with_timezone(&Utc))?;
            }
            EditorCommand::Delete { key } => {
                let capability = self.capability()?;
                self.list.delete(&capability, &key)?;
            }
        }

        Ok(())
    }

    fn capability(&self) -> Result<EditorCapability, TrackerError> {
        self.session
            .capability()
            .cloned()
            .ok_or(TrackerError::Auth(AuthFailure::InvalidToken))
    }

    async fn next_snapshot(&mut self) -> Option<Snapshot> {
        match self.subscription.as_mut() {
            Some(subscription) => subscription.recv().await,
            None => pending().await,
        }
    }

    fn on_snapshot(&mut self, snapshot: Option<Snapshot>) {
        match snapshot {
            Some(snapshot) => {
                let rows = BossList::<RS>::rows_from_snapshot(snapshot, &self.clock.now());
                self.emit(AppEvent::BossListRefresh(rows));
            }
            None => {
                info!("boss list subscription closed");
                self.subscription = None;
            }
        }
    }

    fn emit(&self, event: AppEvent) {
        if let Err(err) = self.event_emitter.emit(event) {
            warn!("failed to emit event: {:?}", err);
        }
    }
}

/// Drives the editing view until stopped or the command channel closes.
pub async fn start_editor<FL, RS, EE, CL>(
    flags: Arc<FL>,
    store: Arc<RS>,
    event_emitter: Arc<EE>,
    clock: Arc<CL>,
    mut commands: UnboundedReceiver<EditorCommand>,
    flag_poll_interval: Duration)
    -> Result<()>
    where
        FL: Flags,
        RS: RecordStore,
        EE: EventEmitter,
        CL: Clock
    {
    let mut editor = Editor::new(store, event_emitter, flags.clone(), clock);

    info!("editor started");

    loop {
        if flags.triggered_stop() {
            info!("editor stopped");
            return Ok(());
        }

        tokio::select! {
            command = commands.recv() => {
                match command {
                    Some(command) => editor.handle(command),
                    None => {
                        info!("editor command channel closed");
                        return Ok(());
                    }
                }
            }
            snapshot = editor.next_snapshot() => editor.on_snapshot(snapshot),
            _ = sleep(flag_poll_interval) => {}
        }
    }
}
