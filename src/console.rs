use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::event::Event;

/// Reads console lines on a background task and hands them out as events
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    cancel: CancellationToken,
    task: tokio::task::JoinHandle<()>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();

        let task = tokio::spawn(async move {
            tx.send(Event::Init).ok();
            let mut lines = BufReader::new(tokio::io::stdin()).lines();

            loop {
                tokio::select! {
                    _ = task_cancel.cancelled() => break,
                    line = lines.next_line() => match line {
                        Ok(Some(line)) => {
                            tx.send(Event::Line(line)).ok();
                        }
                        Ok(None) => {
                            tx.send(Event::Eof).ok();
                            break;
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "stdin read failed");
                            tx.send(Event::Eof).ok();
                            break;
                        }
                    }
                }
            }
        });

        Self { rx, cancel, task }
    }

    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

impl Drop for EventHandler {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.task.abort();
    }
}
