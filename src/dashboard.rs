use std::fmt::Display;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use hashbrown::HashMap;
use log::debug;
use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

use crate::abstractions::Snapshot;
use crate::countdown::{format_spawn_display, CountdownEngine, CountdownState, Tier};
use crate::models::{ResolvedBoss, StoredBoss};
use crate::spawn_resolver::{resolve, resolve_all};
use crate::ticker::{RowTick, Ticker};

/// Everything a front end needs to draw one dashboard tile.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowView {
    pub key: String,
    pub name: String,
    pub guild: String,
    pub spawn_display: String,
    pub countdown: String,
    pub tier: Tier,
    pub color: String,
}

#[derive(Debug)]
pub struct DashboardRow {
    pub boss: ResolvedBoss,
    pub state: CountdownState,
    ticker: Ticker,
}

impl DashboardRow {
    pub fn generation(&self) -> u64 {
        self.ticker.generation()
    }

    /// Re-derives the countdown. A weekly slot that has passed rolls over to
    /// the next one without waiting for a new snapshot.
    pub fn recompute<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) {
        let now_utc = now.with_timezone(&Utc);
        self.state = CountdownEngine::tick(&self.boss, &now_utc);

        if self.state.tier == Tier::Passed && self.boss.record.schedule().is_some() {
            let next = resolve(&self.boss.record, now);

            if next != self.boss.spawn_instant {
                self.boss.spawn_instant = next;
                self.state = CountdownEngine::tick(&self.boss, &now_utc);
            }
        }
    }

    pub fn view<Tz: TimeZone>(&self, tz: &Tz) -> RowView
    where
        Tz::Offset: Display,
    {
        RowView {
            key: self.boss.key.clone(),
            name: self.boss.record.display_name().to_string(),
            guild: self.boss.record.guild_tag().to_string(),
            spawn_display: format_spawn_display(self.boss.spawn_instant.as_ref(), tz),
            countdown: self.state.label(),
            tier: self.state.tier,
            color: self.state.tier.color().to_string(),
        }
    }
}

/// Live countdown view.
///
/// Rows are keyed by store key: a key seen again keeps its row and ticker,
/// a vanished key drops its row, which cancels the ticker.
pub struct Dashboard {
    rows: Vec<DashboardRow>,
    period: Duration,
    tx: UnboundedSender<RowTick>,
}

impl Dashboard {
    pub fn new(period: Duration, tx: UnboundedSender<RowTick>) -> Self {
        Self {
            rows: Vec::new(),
            period,
            tx,
        }
    }

    pub fn rows(&self) -> &[DashboardRow] {
        &self.rows
    }

    /// Re-renders from a full collection snapshot. Must run inside a tokio
    /// runtime since new rows start their tickers.
    pub fn apply_snapshot<Tz: TimeZone>(&mut self, snapshot: Snapshot, now: &DateTime<Tz>) -> Vec<RowView>
    where
        Tz::Offset: Display,
    {
        let bosses = StoredBoss::from_entries(snapshot);
        let engine = CountdownEngine::new(resolve_all(bosses, now));
        let now_utc = now.with_timezone(&Utc);

        let mut previous: HashMap<String, DashboardRow> = self
            .rows
            .drain(..)
            .map(|row| (row.boss.key.clone(), row))
            .collect();

        let period = self.period;
        let tx = &self.tx;
        let mut created = 0;

        let rows: Vec<DashboardRow> = engine
            .into_sorted()
            .into_iter()
            .map(|boss| {
                let state = CountdownEngine::tick(&boss, &now_utc);

                match previous.remove(&boss.key) {
                    Some(mut row) => {
                        row.boss = boss;
                        row.state = state;
                        row
                    }
                    None => {
                        created += 1;
                        let ticker = Ticker::start(boss.key.clone(), period, tx.clone());
                        DashboardRow { boss, state, ticker }
                    }
                }
            })
            .collect();

        debug!(
            "dashboard: {} rows, {} new, {} removed",
            rows.len(),
            created,
            previous.len()
        );

        // dropping the leftovers aborts their tickers
        drop(previous);
        self.rows = rows;

        self.views(&now.timezone())
    }

    /// Updates one row in place. Ticks for rows that no longer exist, or
    /// from a ticker that has since been replaced, are ignored.
    pub fn on_tick<Tz: TimeZone>(&mut self, tick: &RowTick, now: &DateTime<Tz>) -> Option<RowView>
    where
        Tz::Offset: Display,
    {
        let row = self
            .rows
            .iter_mut()
            .find(|row| row.boss.key == tick.key && row.generation() == tick.generation)?;

        row.recompute(now);

        Some(row.view(&now.timezone()))
    }

    /// Recomputes every row, e.g. after the view was hidden for a while.
    pub fn refresh_all<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) -> Vec<RowView>
    where
        Tz::Offset: Display,
    {
        for row in self.rows.iter_mut() {
            row.recompute(now);
        }

        self.views(&now.timezone())
    }

    pub fn views<Tz: TimeZone>(&self, tz: &Tz) -> Vec<RowView>
    where
        Tz::Offset: Display,
    {
        self.rows.iter().map(|row| row.view(tz)).collect()
    }

    /// Unmounts the view, cancelling every ticker.
    pub fn clear(&mut self) {
        self.rows.clear();
    }
}
