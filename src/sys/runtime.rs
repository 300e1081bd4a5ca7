use crate::config::DialConfig;
use crate::dial::{Dial, DialState, SharedSurface, Signal};
use crate::events::DialEvent;
use async_channel::{Receiver, Sender};
use std::time::Instant;

/// Feeds events into a dial until the event channel closes, waking up on its
/// own whenever a throttled update is due. Returns the final state.
pub async fn run_dial(
    config: DialConfig,
    events: Receiver<DialEvent>,
    signals: Sender<Signal>,
) -> DialState {
    let surface = SharedSurface::default();
    let mut dial = Dial::new(config, surface.clone(), signals);

    loop {
        let next = match dial.deadline() {
            Some(at) => {
                tokio::select! {
                    ev = events.recv() => ev,
                    _ = tokio::time::sleep_until(at.into()) => {
                        dial.tick(Instant::now());
                        continue;
                    }
                }
            }
            None => events.recv().await,
        };

        let Ok(event) = next else {
            break;
        };

        let now = Instant::now();
        match event {
            DialEvent::Layout(bounds) => {
                surface.set_bounds(bounds);
                dial.on_layout();
            }
            DialEvent::Screen(width) => {
                surface.set_screen_width(width);
                dial.on_layout();
            }
            DialEvent::Down(point) => {
                dial.on_gesture_start(point, now);
            }
            DialEvent::Move(point) => dial.on_gesture_move(point, now),
            DialEvent::Up(point) => dial.on_gesture_end(point, now),
            DialEvent::Reset => {
                dial.reset();
                log::info!("Dial reset");
            }
        }
    }

    dial.flush(Instant::now());
    *dial.state()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Bounds, Point};

    async fn drive(config: DialConfig, events: Vec<DialEvent>) -> (DialState, Vec<Signal>) {
        let (event_tx, event_rx) = async_channel::unbounded();
        let (signal_tx, signal_rx) = async_channel::unbounded();

        for ev in events {
            event_tx.send(ev).await.unwrap();
        }
        drop(event_tx);

        let state = run_dial(config, event_rx, signal_tx).await;

        let mut signals = Vec::new();
        while let Ok(s) = signal_rx.try_recv() {
            signals.push(s);
        }
        (state, signals)
    }

    #[tokio::test]
    async fn test_drag_and_release() {
        let config = DialConfig {
            throttle_ms: 0,
            ..Default::default()
        };
        let (state, signals) = drive(
            config,
            vec![
                DialEvent::Layout(Bounds::new(50.0, 50.0, 100.0, 100.0)),
                DialEvent::Down(Point::new(150.0, 100.0)),
                DialEvent::Move(Point::new(100.0, 150.0)),
                DialEvent::Up(Point::new(100.0, 150.0)),
            ],
        )
        .await;

        assert!((state.angle_y - 90.0).abs() < 1e-6);
        assert_eq!(state.release_angle, state.angle_y);
        assert!(matches!(signals[0], Signal::ValueChange { .. }));
    }

    #[tokio::test]
    async fn test_throttled_moves_end_on_latest_value() {
        let (state, signals) = drive(
            DialConfig::default(),
            vec![
                DialEvent::Layout(Bounds::new(50.0, 50.0, 100.0, 100.0)),
                DialEvent::Down(Point::new(150.0, 100.0)),
                DialEvent::Move(Point::new(100.0, 150.0)),
                DialEvent::Move(Point::new(50.0, 100.0)),
                DialEvent::Move(Point::new(100.0, 50.0)),
            ],
        )
        .await;

        let last = signals
            .iter()
            .rev()
            .find_map(|s| match s {
                Signal::ValueChange { angle, .. } => Some(*angle),
                _ => None,
            })
            .unwrap();
        assert_eq!(last, state.angle_y);
        assert!((last - 270.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_reset_and_tap() {
        let (state, signals) = drive(
            DialConfig {
                throttle_ms: 0,
                initial_angle: 45.0,
                ..Default::default()
            },
            vec![
                DialEvent::Screen(400.0),
                DialEvent::Layout(Bounds::new(450.0, 50.0, 100.0, 100.0)),
                DialEvent::Down(Point::new(150.0, 100.0)),
                DialEvent::Move(Point::new(100.0, 150.0)),
                DialEvent::Up(Point::new(100.0, 150.0)),
                DialEvent::Reset,
                DialEvent::Down(Point::new(150.0, 100.0)),
                DialEvent::Up(Point::new(150.0, 100.0)),
            ],
        )
        .await;

        assert_eq!(state.angle_y, 45.0);
        assert_eq!(signals.last(), Some(&Signal::Press));
    }
}
