use log::debug;
use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use std::fmt::Debug;

use crate::access::View;
use crate::boss_list::{BossForm, BossListRow};
use crate::dashboard::RowView;

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "event", content = "data")]
#[serde(rename_all = "camelCase")]
pub enum AppEvent {
    DashboardRefresh(Vec<RowView>),
    CountdownUpdate(RowView),
    BossListRefresh(Vec<BossListRow>),
    FormChanged(BossForm),
    Notice(String),
    ViewChanged(View),
}

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
pub trait EventEmitter : Send + Sync + 'static {
    fn emit(&self, event: AppEvent) -> anyhow::Result<()>;
}

pub struct DefaultEventEmitter;

impl EventEmitter for DefaultEventEmitter {

    fn emit(&self, event: AppEvent) -> anyhow::Result<()> {
        debug!("{:?}", event);
        Ok(())
    }
}

impl DefaultEventEmitter {
    pub fn new() -> Self {
        Self {}
    }
}

/// Forwards events to a front end listening on the other end of a channel.
pub struct ChannelEventEmitter {
    tx: UnboundedSender<AppEvent>,
}

impl EventEmitter for ChannelEventEmitter {
    fn emit(&self, event: AppEvent) -> anyhow::Result<()> {
        self.tx
            .send(event)
            .map_err(|err| anyhow::anyhow!("event receiver dropped: {:?}", err.0))
    }
}

impl ChannelEventEmitter {
    pub fn new(tx: UnboundedSender<AppEvent>) -> Self {
        Self { tx }
    }
}
