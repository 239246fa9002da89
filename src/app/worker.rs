use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use eframe::egui::Context;
use tracing::debug;

use crate::error::DataError;
use crate::graph::ExpansionTicket;
use crate::taxonomy::{DataSource, LeafRecord};

pub(super) type FinishedExpansion = (ExpansionTicket, Result<Vec<LeafRecord>, DataError>);

/// Runs child fetches off the UI thread. Results are picked up once per frame
/// and applied in the order they resolved.
pub(super) struct ExpansionWorker {
    tx: Sender<FinishedExpansion>,
    rx: Receiver<FinishedExpansion>,
}

impl ExpansionWorker {
    pub(super) fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    pub(super) fn spawn(
        &self,
        ctx: &Context,
        source: Arc<dyn DataSource>,
        language: String,
        ticket: ExpansionTicket,
    ) {
        let tx = self.tx.clone();
        let ctx = ctx.clone();
        debug!(node_id = %ticket.node_id, language = %language, "fetching children");

        thread::spawn(move || {
            let fetched = source.fetch_children(&language, &ticket.node_id);
            let _ = tx.send((ticket, fetched));
            ctx.request_repaint();
        });
    }

    pub(super) fn drain(&self) -> Vec<FinishedExpansion> {
        self.rx.try_iter().collect()
    }
}
