use crate::abstractions::*;
use crate::constants::{BOSSES_PATH, LOAD_FAILED_NOTICE};
use crate::dashboard::Dashboard;
use crate::settings::GeneralSettings;
use super::flags::Flags;
use anyhow::Result;
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;

#[derive(Debug, Clone)]
pub struct StartOptions {
    pub tick_interval: Duration,
    pub flag_poll_interval: Duration,
}

impl From<&GeneralSettings> for StartOptions {
    fn from(settings: &GeneralSettings) -> Self {
        Self {
            tick_interval: settings.tick_interval(),
            flag_poll_interval: settings.flag_poll_interval(),
        }
    }
}

fn emit<EE: EventEmitter>(event_emitter: &EE, event: AppEvent) {
    if let Err(err) = event_emitter.emit(event) {
        warn!("failed to emit event: {:?}", err);
    }
}

fn reload<RS, EE, CL>(store: &RS, dashboard: &mut Dashboard, event_emitter: &EE, clock: &CL)
where
    RS: RecordStore,
    EE: EventEmitter,
    CL: Clock,
{
    match store.read_all(BOSSES_PATH) {
        Ok(snapshot) => {
            let rows = dashboard.apply_snapshot(snapshot, &clock.now());
            emit(event_emitter, AppEvent::DashboardRefresh(rows));
        }
        Err(err) => {
            warn!("error loading bosses: {:?}", err);
            emit(event_emitter, AppEvent::Notice(LOAD_FAILED_NOTICE.to_string()));
        }
    }
}

/// Drives the live dashboard until stopped or the store subscription ends.
///
/// Store snapshots re-render the rows, row ticks update a single countdown
/// in place, and the flags are polled in between.
pub async fn start<FL, RS, EE, CL>(
    flags: Arc<FL>,
    store: Arc<RS>,
    event_emitter: Arc<EE>,
    clock: Arc<CL>,
    options: StartOptions)
    -> Result<()>
    where
        FL: Flags,
        RS: RecordStore,
        EE: EventEmitter,
        CL: Clock
    {
    let mut snapshots = store.subscribe(BOSSES_PATH)?;
    let (tick_tx, mut tick_rx) = mpsc::unbounded_channel();
    let mut dashboard = Dashboard::new(options.tick_interval, tick_tx);

    info!("dashboard started");

    loop {
        if flags.triggered_stop() {
            info!("dashboard stopped");
            dashboard.clear();
            return Ok(());
        }

        if flags.triggered_refresh() {
            flags.clear_refresh();
            reload(store.as_ref(), &mut dashboard, event_emitter.as_ref(), clock.as_ref());
        }

        tokio::select! {
            snapshot = snapshots.recv() => {
                match snapshot {
                    Some(snapshot) => {
                        let rows = dashboard.apply_snapshot(snapshot, &clock.now());
                        emit(event_emitter.as_ref(), AppEvent::DashboardRefresh(rows));
                    },
                    None => {
                        info!("boss subscription closed");
                        dashboard.clear();
                        return Ok(());
                    }
                }
            }
            Some(tick) = tick_rx.recv() => {
                if let Some(row) = dashboard.on_tick(&tick, &clock.now()) {
                    emit(event_emitter.as_ref(), AppEvent::CountdownUpdate(row));
                }
            }
            _ = sleep(options.flag_poll_interval) => {}
        }
    }
}
