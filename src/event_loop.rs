use std::io;
use std::time::{Duration, Instant};

use crossterm::event::Event;

use crate::drivers::InputDriver;

pub enum ControlFlow {
    /// Keep going; wake no later than the given instant even without input.
    Continue(Option<Instant>),
    Quit,
}

/// A centralized event loop that drives the main UI thread.
///
/// It is the only place that polls the input driver. The handler is called
/// with `None` on every wake-up (frame tick, elapsed deadline or idle
/// timeout) and with `Some(event)` for each input event. The poll timeout is
/// the shorter of the idle interval and the deadline the handler returned,
/// so debounced saves fire on time without busy-waiting.
///
/// Persistence I/O runs on its own thread; this loop only hands it work.
pub struct EventLoop<D> {
    driver: D,
    idle_interval: Duration,
}

impl<D: InputDriver> EventLoop<D> {
    pub fn new(driver: D, idle_interval: Duration) -> Self {
        Self {
            driver,
            idle_interval,
        }
    }

    pub fn driver(&mut self) -> &mut D {
        &mut self.driver
    }

    fn timeout(&self, wake_at: Option<Instant>, now: Instant) -> Duration {
        match wake_at {
            Some(at) => at.saturating_duration_since(now).min(self.idle_interval),
            None => self.idle_interval,
        }
    }

    pub fn run<F>(&mut self, mut handler: F) -> io::Result<()>
    where
        F: FnMut(&mut D, Option<Event>) -> io::Result<ControlFlow>,
    {
        loop {
            let wake_at = match handler(&mut self.driver, None)? {
                ControlFlow::Quit => break,
                ControlFlow::Continue(wake_at) => wake_at,
            };

            let timeout = self.timeout(wake_at, Instant::now());
            if self.driver.poll(timeout)? {
                // Drain the queue so a burst of drag events is handled before
                // the next frame instead of one event per frame.
                loop {
                    let event = self.driver.read()?;
                    if let ControlFlow::Quit = handler(&mut self.driver, Some(event))? {
                        return Ok(());
                    }
                    if !self.driver.poll(Duration::from_millis(0))? {
                        break;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::collections::VecDeque;

    #[derive(Default)]
    struct Scripted {
        events: VecDeque<Event>,
        timeouts: Vec<Duration>,
    }

    impl InputDriver for Scripted {
        fn poll(&mut self, timeout: Duration) -> io::Result<bool> {
            self.timeouts.push(timeout);
            Ok(!self.events.is_empty())
        }

        fn read(&mut self) -> io::Result<Event> {
            self.events
                .pop_front()
                .ok_or_else(|| io::Error::other("no scripted events"))
        }
    }

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    #[test]
    fn burst_is_drained_before_next_tick() {
        let driver = Scripted {
            events: VecDeque::from([key('a'), key('b'), key('c')]),
            ..Scripted::default()
        };
        let mut event_loop = EventLoop::new(driver, Duration::from_millis(100));
        let mut seen = Vec::new();
        event_loop
            .run(|_, event| {
                seen.push(event.is_some());
                if seen.iter().filter(|e| !**e).count() == 2 {
                    return Ok(ControlFlow::Quit);
                }
                Ok(ControlFlow::Continue(None))
            })
            .unwrap();
        assert_eq!(seen, vec![false, true, true, true, false]);
    }

    #[test]
    fn deadline_shortens_the_poll() {
        let mut event_loop = EventLoop::new(Scripted::default(), Duration::from_secs(1));
        let mut ticks = 0;
        event_loop
            .run(|_, _| {
                ticks += 1;
                if ticks == 3 {
                    return Ok(ControlFlow::Quit);
                }
                let wake = (ticks == 1).then(|| Instant::now() + Duration::from_millis(50));
                Ok(ControlFlow::Continue(wake))
            })
            .unwrap();
        let timeouts = &event_loop.driver().timeouts;
        assert_eq!(timeouts.len(), 2);
        assert!(timeouts[0] <= Duration::from_millis(50));
        assert_eq!(timeouts[1], Duration::from_secs(1));
    }
}
