use std::fmt;

use log::debug;

/// Where a [`crate::HeartRateClient`] is in bringing up its connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionPhase {
    #[default]
    Idle,
    Scanning,
    Connecting,
    DiscoveringServices,
    DiscoveringCharacteristics,
    Ready,
}

impl ConnectionPhase {
    /// Whether `next` may follow this phase.
    ///
    /// Any phase can fall back to `Idle`. A known device is reconnected from `Idle` or
    /// `Ready` without scanning again.
    pub fn can_advance_to(self, next: ConnectionPhase) -> bool {
        use ConnectionPhase::*;
        matches!(
            (self, next),
            (_, Idle)
                | (Idle, Scanning)
                | (Idle | Scanning | Ready, Connecting)
                | (Connecting, DiscoveringServices)
                | (DiscoveringServices, DiscoveringCharacteristics)
                | (DiscoveringCharacteristics, Ready)
        )
    }

    pub fn is_ready(self) -> bool {
        self == ConnectionPhase::Ready
    }

    pub(crate) fn advance(&mut self, next: ConnectionPhase) {
        debug_assert!(self.can_advance_to(next), "illegal transition {self} -> {next}");
        debug!("HEART RATE: {self} -> {next}");
        *self = next;
    }

    /// Settle the phase after a connection attempt. A failed attempt falls back to `Idle`
    /// so the next attempt can start from `Connecting` again.
    pub(crate) fn settle<T, E>(&mut self, attempt: Result<T, E>) -> Result<T, E> {
        if attempt.is_err() {
            self.advance(ConnectionPhase::Idle);
        }
        attempt
    }
}

impl fmt::Display for ConnectionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Scanning => "scanning",
            Self::Connecting => "connecting",
            Self::DiscoveringServices => "discovering services",
            Self::DiscoveringCharacteristics => "discovering characteristics",
            Self::Ready => "ready",
        };
        f.write_str(name)
    }
}

#[test]
fn test_happy_path() {
    let mut phase = ConnectionPhase::default();
    for next in [
        ConnectionPhase::Scanning,
        ConnectionPhase::Connecting,
        ConnectionPhase::DiscoveringServices,
        ConnectionPhase::DiscoveringCharacteristics,
        ConnectionPhase::Ready,
    ] {
        assert!(!phase.is_ready());
        phase.advance(next);
    }
    assert!(phase.is_ready());
}

#[test]
fn test_reconnect() {
    assert!(ConnectionPhase::Ready.can_advance_to(ConnectionPhase::Connecting));
    assert!(ConnectionPhase::Idle.can_advance_to(ConnectionPhase::Connecting));
    assert!(!ConnectionPhase::Ready.can_advance_to(ConnectionPhase::Scanning));
}

#[test]
fn test_no_skipping_discovery() {
    assert!(!ConnectionPhase::Connecting.can_advance_to(ConnectionPhase::Ready));
    assert!(!ConnectionPhase::Scanning.can_advance_to(ConnectionPhase::DiscoveringServices));
    assert!(ConnectionPhase::DiscoveringServices.can_advance_to(ConnectionPhase::Idle));
}

#[test]
fn test_failed_reconnect_falls_back_to_idle() {
    let mut phase = ConnectionPhase::Ready;

    // Sensor dropped and every connection attempt failed
    phase.advance(ConnectionPhase::Connecting);
    assert_eq!(phase.settle::<(), _>(Err("retries exhausted")), Err("retries exhausted"));
    assert_eq!(phase, ConnectionPhase::Idle);

    // Connected, but the service vanished
    phase.advance(ConnectionPhase::Connecting);
    phase.advance(ConnectionPhase::DiscoveringServices);
    assert!(phase.settle::<(), _>(Err("no heart rate service")).is_err());
    assert_eq!(phase, ConnectionPhase::Idle);

    // A later attempt goes all the way through
    phase.advance(ConnectionPhase::Connecting);
    phase.advance(ConnectionPhase::DiscoveringServices);
    phase.advance(ConnectionPhase::DiscoveringCharacteristics);
    phase.advance(ConnectionPhase::Ready);
    assert_eq!(phase.settle::<_, &str>(Ok(())), Ok(()));
    assert!(phase.is_ready());
}
