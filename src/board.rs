//! Table-status board: one independent timer per table.

use std::{collections::HashMap, sync::Arc};

use serde::Serialize;
use tokio::sync::Mutex;

use crate::{
    models::{TableBinding, TimerProps},
    settings::TimerSettings,
    timer::{Clock, SystemClock, TimerController, TimerSnapshot, TimerStatus},
};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::log_info;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TableDisplay {
    pub table_id: String,
    pub snapshot: TimerSnapshot,
}

#[derive(Clone)]
pub struct TableBoard {
    tables: Arc<Mutex<HashMap<String, TimerController>>>,
    settings: TimerSettings,
    clock: Arc<dyn Clock>,
}

impl TableBoard {
    pub fn new(settings: TimerSettings) -> Self {
        Self::with_clock(settings, Arc::new(SystemClock))
    }

    pub fn with_clock(settings: TimerSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            tables: Arc::new(Mutex::new(HashMap::new())),
            settings,
            clock,
        }
    }

    /// Binds props to a table's timer, creating the timer on first sight.
    pub async fn bind_table(&self, table_id: &str, props: TimerProps) -> TimerSnapshot {
        let controller = {
            let mut tables = self.tables.lock().await;
            tables
                .entry(table_id.to_string())
                .or_insert_with(|| {
                    log_info!("table {table_id} added to board");
                    TimerController::with_clock(&self.settings, self.clock.clone())
                })
                .clone()
        };
        controller.bind(props).await
    }

    pub async fn bind_all(&self, bindings: Vec<TableBinding>) {
        for binding in bindings {
            self.bind_table(&binding.table_id, binding.props).await;
        }
    }

    /// Unmounts and forgets a table. Returns false if it wasn't on the board.
    pub async fn remove_table(&self, table_id: &str) -> bool {
        let removed = self.tables.lock().await.remove(table_id);
        match removed {
            Some(controller) => {
                controller.unmount().await;
                log_info!("table {table_id} removed from board");
                true
            }
            None => false,
        }
    }

    pub async fn displays(&self) -> Vec<TableDisplay> {
        let tables = self.tables.lock().await;
        let mut displays: Vec<TableDisplay> = tables
            .iter()
            .map(|(table_id, controller)| TableDisplay {
                table_id: table_id.clone(),
                snapshot: controller.snapshot(),
            })
            .collect();
        displays.sort_by(|a, b| a.table_id.cmp(&b.table_id));
        displays
    }

    /// True once no table is ticking. Blank tables count as frozen.
    pub async fn is_all_frozen(&self) -> bool {
        self.tables
            .lock()
            .await
            .values()
            .all(|controller| controller.snapshot().status != TimerStatus::Ticking)
    }

    pub async fn shutdown(&self) {
        let drained: Vec<TimerController> = self
            .tables
            .lock()
            .await
            .drain()
            .map(|(_, controller)| controller)
            .collect();
        for controller in drained {
            controller.unmount().await;
        }
    }
}
