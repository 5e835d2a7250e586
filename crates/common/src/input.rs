use std::sync::mpsc::{Receiver, TryRecvError};

use serde::{Deserialize, Serialize};

use crate::point::Point2D;

/// Pointer and window events, already abstracted from any windowing backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputEvent {
    PrimaryClick { x: f64, y: f64 },
    SecondaryClick { x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    Quit,
}

impl InputEvent {
    pub fn primary_click(p: Point2D) -> Self {
        InputEvent::PrimaryClick { x: p.x, y: p.y }
    }

    pub fn secondary_click(p: Point2D) -> Self {
        InputEvent::SecondaryClick { x: p.x, y: p.y }
    }

    pub fn pointer_move(p: Point2D) -> Self {
        InputEvent::PointerMove { x: p.x, y: p.y }
    }
}

/// An event due at a given tick of a headless run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub tick: u64,
    #[serde(flatten)]
    pub event: InputEvent,
}

/// A batch of input gathered for one frame.
#[derive(Debug, Default)]
pub struct EventBatch {
    pub events: Vec<InputEvent>,
    /// The source can never produce more events.
    pub exhausted: bool,
}

/// Where a driver pulls each frame's events from.
pub trait EventSource {
    /// Everything pending for the frame that is about to tick as `tick`.
    fn drain(&mut self, tick: u64) -> EventBatch;
}

impl EventSource for Receiver<InputEvent> {
    fn drain(&mut self, _tick: u64) -> EventBatch {
        let mut batch = EventBatch::default();
        loop {
            match self.try_recv() {
                Ok(event) => batch.events.push(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    batch.exhausted = true;
                    break;
                }
            }
        }
        batch
    }
}

/// Replays a fixed, tick-stamped list of events.
///
/// Never reports itself exhausted: a scripted run keeps ticking until it
/// sees `Quit` or hits its tick limit.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    script: Vec<ScheduledEvent>,
    cursor: usize,
}

impl ScriptedInput {
    pub fn new(mut script: Vec<ScheduledEvent>) -> Self {
        // Stable sort keeps same-tick events in their written order.
        script.sort_by_key(|s| s.tick);
        Self { script, cursor: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.script.len() - self.cursor
    }
}

impl EventSource for ScriptedInput {
    fn drain(&mut self, tick: u64) -> EventBatch {
        let mut batch = EventBatch::default();
        while let Some(scheduled) = self.script.get(self.cursor) {
            if scheduled.tick > tick {
                break;
            }
            batch.events.push(scheduled.event);
            self.cursor += 1;
        }
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn scripted_input_releases_events_by_tick() {
        let mut input = ScriptedInput::new(vec![
            ScheduledEvent { tick: 3, event: InputEvent::Quit },
            ScheduledEvent { tick: 1, event: InputEvent::PointerMove { x: 1.0, y: 2.0 } },
            ScheduledEvent { tick: 1, event: InputEvent::PrimaryClick { x: 5.0, y: 5.0 } },
        ]);

        assert!(input.drain(0).events.is_empty());
        assert_eq!(
            input.drain(1).events,
            vec![
                InputEvent::PointerMove { x: 1.0, y: 2.0 },
                InputEvent::PrimaryClick { x: 5.0, y: 5.0 },
            ]
        );
        assert_eq!(input.remaining(), 1);
        assert!(input.drain(2).events.is_empty());
        assert_eq!(input.drain(7).events, vec![InputEvent::Quit]);
        assert!(!input.drain(8).exhausted);
    }

    #[test]
    fn channel_source_drains_in_arrival_order() {
        let (tx, mut rx) = mpsc::channel();
        tx.send(InputEvent::SecondaryClick { x: 1.0, y: 1.0 }).unwrap();
        tx.send(InputEvent::Quit).unwrap();

        let batch = rx.drain(0);
        assert_eq!(batch.events.len(), 2);
        assert_eq!(batch.events[1], InputEvent::Quit);
        assert!(!batch.exhausted);

        drop(tx);
        assert!(rx.drain(1).exhausted);
    }

    #[test]
    fn scheduled_event_reads_from_toml() {
        #[derive(Deserialize)]
        struct Script {
            script: Vec<ScheduledEvent>,
        }

        let parsed: Script = toml::from_str(
            r#"
            [[script]]
            tick = 5
            kind = "secondary_click"
            x = 500.0
            y = 500.0

            [[script]]
            tick = 9
            kind = "quit"
            "#,
        )
        .unwrap();

        assert_eq!(
            parsed.script,
            vec![
                ScheduledEvent { tick: 5, event: InputEvent::SecondaryClick { x: 500.0, y: 500.0 } },
                ScheduledEvent { tick: 9, event: InputEvent::Quit },
            ]
        );
    }
}
