use std::sync::mpsc;

use thiserror::Error;

use crate::event::PulseEvent;

/// A subscriber could not accept an event
#[derive(Debug, Clone, Error)]
#[error("event consumer rejected {event}: {reason}")]
pub struct DispatchError {
    pub event: &'static str,
    pub reason: String,
}

pub trait Dispatcher {
    fn dispatch(&self, event: PulseEvent) -> Result<(), DispatchError>;
}

impl Dispatcher for mpsc::Sender<PulseEvent> {
    fn dispatch(&self, event: PulseEvent) -> Result<(), DispatchError> {
        let name = event.variant_name();
        self.send(event)
            .map_err(|e| DispatchError { event: name, reason: e.to_string() })
    }
}

/// Fan-out: every subscriber receives its own copy, the first failure stops delivery
impl<D: Dispatcher> Dispatcher for Vec<D> {
    fn dispatch(&self, event: PulseEvent) -> Result<(), DispatchError> {
        self.iter()
            .try_for_each(|subscriber| subscriber.dispatch(event.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fan_out_delivers_to_every_subscriber() {
        let (tx_a, rx_a) = mpsc::channel();
        let (tx_b, rx_b) = mpsc::channel();
        let subscribers = vec![tx_a, tx_b];

        subscribers
            .dispatch(PulseEvent::RateLimited { minutes_until_reset: 4 })
            .unwrap();

        assert!(matches!(rx_a.try_recv(), Ok(PulseEvent::RateLimited { minutes_until_reset: 4 })));
        assert!(matches!(rx_b.try_recv(), Ok(PulseEvent::RateLimited { minutes_until_reset: 4 })));
    }

    #[test]
    fn dropped_receiver_is_a_dispatch_error() {
        let (tx, rx) = mpsc::channel::<PulseEvent>();
        drop(rx);

        let err = tx
            .dispatch(PulseEvent::RequestFailed { status: 500, message: None })
            .unwrap_err();
        assert_eq!(err.event, "RequestFailed");
    }

    #[test]
    fn fan_out_stops_at_first_failing_subscriber() {
        let (tx_a, rx_a) = mpsc::channel::<PulseEvent>();
        let (tx_b, rx_b) = mpsc::channel();
        drop(rx_a);
        let subscribers = vec![tx_a, tx_b];

        let err = subscribers
            .dispatch(PulseEvent::RateLimited { minutes_until_reset: 2 })
            .unwrap_err();

        assert_eq!(err.event, "RateLimited");
        assert!(rx_b.try_recv().is_err());
    }
}
