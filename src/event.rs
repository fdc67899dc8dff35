use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, MouseEvent};
use tokio::sync::mpsc;

use crate::dispatch::Target;
use crate::error::{ApiError, Result};
use crate::folder::item::FolderItem;

/// A backend response, tagged with what it answers.
#[derive(Debug)]
pub enum ApiEvent {
    Listed {
        target: Target,
        generation: u64,
        path: String,
        result: std::result::Result<Vec<FolderItem>, ApiError>,
    },
    Children {
        target: Target,
        generation: u64,
        path: String,
        result: std::result::Result<Vec<FolderItem>, ApiError>,
    },
    Searched {
        generation: u64,
        result: std::result::Result<Vec<FolderItem>, ApiError>,
    },
    Validated {
        generation: u64,
        path: String,
        result: std::result::Result<bool, ApiError>,
    },
    Detail {
        path: String,
        result: std::result::Result<FolderItem, ApiError>,
    },
    /// A mutation finished. Create-folder returns the server's item.
    Mutated {
        op: u64,
        result: std::result::Result<Option<FolderItem>, ApiError>,
    },
}

/// Application events.
#[derive(Debug)]
pub enum Event {
    /// A key press event.
    Key(KeyEvent),
    /// A mouse event.
    Mouse(MouseEvent),
    /// A periodic tick for rendering.
    Tick,
    /// Terminal resize event.
    Resize(u16, u16),
    /// A backend request completed.
    Api(ApiEvent),
}

/// Async event handler that polls crossterm events and forwards them via a channel.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    tx: mpsc::UnboundedSender<Event>,
}

impl EventHandler {
    /// Create a new EventHandler with the given tick rate.
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let event_tx = tx.clone();

        tokio::spawn(async move {
            loop {
                if event::poll(tick_rate).unwrap_or(false) {
                    let forwarded = match event::read() {
                        Ok(CrosstermEvent::Key(key)) => event_tx.send(Event::Key(key)),
                        Ok(CrosstermEvent::Mouse(mouse)) => event_tx.send(Event::Mouse(mouse)),
                        Ok(CrosstermEvent::Resize(w, h)) => event_tx.send(Event::Resize(w, h)),
                        _ => Ok(()),
                    };
                    if forwarded.is_err() {
                        break;
                    }
                } else if event_tx.send(Event::Tick).is_err() {
                    break;
                }
            }
        });

        Self { rx, tx }
    }

    /// Sender for backend tasks to deliver their responses.
    pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
        self.tx.clone()
    }

    /// Receive the next event (blocks until available).
    pub async fn next(&mut self) -> Result<Event> {
        self.rx
            .recv()
            .await
            .ok_or_else(|| crate::error::AppError::Terminal("Event channel closed".into()))
    }
}
