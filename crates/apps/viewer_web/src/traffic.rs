use foundation::TimeMs;
use runtime::{DeferredQueue, Event};
use scene::GlobeEvent;

use crate::config::TrafficGate;

/// Why the traffic layers were attached.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AttachReason {
    Delay,
    Ready,
    Deadline,
}

/// One-shot gate deciding the tick on which traffic layers are attached.
#[derive(Debug)]
pub struct TrafficScheduler {
    gate: TrafficGate,
    timers: DeferredQueue<AttachReason>,
    fired: bool,
}

impl TrafficScheduler {
    /// Timers are measured from `started_at`, the bootstrap time.
    pub fn new(gate: TrafficGate, started_at: TimeMs) -> Self {
        let mut timers = DeferredQueue::new();
        match gate {
            TrafficGate::FixedDelay { delay_ms } => {
                timers.schedule(started_at.add_ms(delay_ms), AttachReason::Delay);
            }
            TrafficGate::GlobeReady { max_wait_ms } => {
                timers.schedule(started_at.add_ms(max_wait_ms), AttachReason::Deadline);
            }
        }
        Self {
            gate,
            timers,
            fired: false,
        }
    }

    pub fn gate(&self) -> TrafficGate {
        self.gate
    }

    pub fn is_pending(&self) -> bool {
        !self.fired
    }

    /// Returns a reason at most once over the scheduler's lifetime.
    pub fn poll(&mut self, now: TimeMs, events: &[Event<GlobeEvent>]) -> Option<AttachReason> {
        if self.fired {
            return None;
        }
        let ready = matches!(self.gate, TrafficGate::GlobeReady { .. })
            && events.iter().any(|e| e.payload == GlobeEvent::Ready);
        let reason = if ready {
            Some(AttachReason::Ready)
        } else {
            self.timers.take_due(now).into_iter().next()
        };
        if reason.is_some() {
            self.fire();
        }
        reason
    }

    /// Nothing will fire after this.
    pub fn cancel(&mut self) {
        self.fire();
    }

    fn fire(&mut self) {
        self.fired = true;
        self.timers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use runtime::{EventBus, Frame};

    fn ready_at(ms: f64) -> Vec<Event<GlobeEvent>> {
        let mut bus = EventBus::new();
        bus.emit(Frame::new(0, TimeMs(ms), 16.0), GlobeEvent::Ready);
        bus.drain()
    }

    #[test]
    fn fixed_delay_fires_once_at_the_deadline() {
        let mut gate = TrafficScheduler::new(TrafficGate::FixedDelay { delay_ms: 1000.0 }, TimeMs(500.0));
        assert_eq!(gate.poll(TimeMs(1499.0), &[]), None);
        // The ready event does not matter for a fixed delay.
        assert_eq!(gate.poll(TimeMs(1499.0), &ready_at(1499.0)), None);
        assert_eq!(gate.poll(TimeMs(1500.0), &[]), Some(AttachReason::Delay));
        assert_eq!(gate.poll(TimeMs(9000.0), &[]), None);
        assert!(!gate.is_pending());
    }

    #[test]
    fn ready_signal_wins_over_the_deadline() {
        let mut gate = TrafficScheduler::new(TrafficGate::GlobeReady { max_wait_ms: 3000.0 }, TimeMs(0.0));
        assert_eq!(gate.poll(TimeMs(100.0), &[]), None);
        assert_eq!(gate.poll(TimeMs(600.0), &ready_at(600.0)), Some(AttachReason::Ready));
        assert_eq!(gate.poll(TimeMs(3000.0), &[]), None);
    }

    #[test]
    fn deadline_is_the_fallback() {
        let mut gate = TrafficScheduler::new(TrafficGate::GlobeReady { max_wait_ms: 3000.0 }, TimeMs(0.0));
        assert_eq!(gate.poll(TimeMs(2999.0), &[]), None);
        assert_eq!(gate.poll(TimeMs(3200.0), &[]), Some(AttachReason::Deadline));
    }

    #[test]
    fn cancelled_gate_never_fires() {
        let mut gate = TrafficScheduler::new(TrafficGate::FixedDelay { delay_ms: 0.0 }, TimeMs(0.0));
        gate.cancel();
        assert_eq!(gate.poll(TimeMs(10.0), &[]), None);
    }
}
