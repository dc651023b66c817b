//! Terminal input plus two clocks, merged into one [`Event`] stream.
//!
//! The tick clock drives housekeeping (toast expiry, the busy spinner) and
//! the render clock drives redraws. Both skip missed ticks so a stalled
//! loop never replays a burst.

use std::time::Duration;

use crossterm::event::{Event as TermEvent, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time::{self, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    Resize(u16, u16),
    Tick,
    Render,
}

/// Only key presses and resizes matter; releases, repeats, mouse and
/// focus events are dropped.
fn translate(event: TermEvent) -> Option<Event> {
    match event {
        TermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
        TermEvent::Resize(w, h) => Some(Event::Resize(w, h)),
        _ => None,
    }
}

fn clock(period: Duration) -> Interval {
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

async fn pump(
    tx: mpsc::UnboundedSender<Event>,
    cancel: CancellationToken,
    tick_rate: Duration,
    render_rate: Duration,
) {
    let mut input = EventStream::new();
    let mut tick = clock(tick_rate);
    let mut render = clock(render_rate);
    let mut input_open = true;

    loop {
        let next = tokio::select! {
            () = cancel.cancelled() => return,
            _ = tick.tick() => Some(Event::Tick),
            _ = render.tick() => Some(Event::Render),
            raw = input.next(), if input_open => match raw {
                Some(Ok(event)) => translate(event),
                Some(Err(_)) => None,
                // Input closed; keep the clocks running.
                None => {
                    input_open = false;
                    None
                }
            },
        };

        if let Some(event) = next {
            if tx.send(event).is_err() {
                return;
            }
        }
    }
}

/// Receiving end of the event pump. The background task stops when this
/// is dropped or [`stop`](Self::stop) is called.
pub struct EventReader {
    rx: mpsc::UnboundedReceiver<Event>,
    cancel: CancellationToken,
}

impl EventReader {
    pub fn new(tick_rate: Duration, render_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        tokio::spawn(pump(tx, cancel.clone(), tick_rate, render_rate));
        Self { rx, cancel }
    }

    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Drop for EventReader {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
