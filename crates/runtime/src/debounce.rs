/// Collapses bursts of submissions into a single fire.
///
/// Trailing mode (the default) delivers the payload of the *last* submission
/// once `wait_ms` has elapsed without a newer one. Leading mode (`immediate`)
/// delivers the *first* submission right away and suppresses the rest of the
/// burst until a quiet gap of `wait_ms` re-arms it.
///
/// The debouncer is a pure state machine: all time comes in through the
/// `now_ms` arguments, so behavior is deterministic and testable. The caller
/// polls it from its frame loop.
#[derive(Debug)]
pub struct Debouncer<T> {
    wait_ms: f64,
    immediate: bool,
    pending: Option<T>,
    deadline_ms: Option<f64>,
}

impl<T> Debouncer<T> {
    pub fn trailing(wait_ms: f64) -> Self {
        Self {
            wait_ms,
            immediate: false,
            pending: None,
            deadline_ms: None,
        }
    }

    pub fn leading(wait_ms: f64) -> Self {
        Self {
            wait_ms,
            immediate: true,
            pending: None,
            deadline_ms: None,
        }
    }

    /// Submit a payload at `now_ms`.
    ///
    /// In leading mode this returns the payload to fire immediately when the
    /// debouncer is armed; otherwise the payload is held (or suppressed) and
    /// `poll` drives delivery.
    pub fn submit(&mut self, now_ms: f64, payload: T) -> Option<T> {
        if self.immediate {
            let armed = self.deadline_ms.is_none_or(|d| now_ms >= d);
            self.deadline_ms = Some(now_ms + self.wait_ms);
            return if armed { Some(payload) } else { None };
        }

        self.pending = Some(payload);
        self.deadline_ms = Some(now_ms + self.wait_ms);
        None
    }

    /// Deliver a due trailing payload, if any. Also re-arms leading mode once
    /// the quiet gap has passed.
    pub fn poll(&mut self, now_ms: f64) -> Option<T> {
        let due = self.deadline_ms.is_some_and(|d| now_ms >= d);
        if !due {
            return None;
        }
        self.deadline_ms = None;
        self.pending.take()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
