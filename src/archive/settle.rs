//! Single-settlement guard for subprocess completion.

use tokio::sync::oneshot;

enum State<T> {
    Pending(oneshot::Sender<T>),
    Settled,
}

/// Delivers a result at most once, however many completion events arrive.
pub struct Settle<T> {
    state: State<T>,
}

impl<T> Settle<T> {
    /// Creates a pending guard and the receiver that observes its single result.
    pub fn channel() -> (Self, oneshot::Receiver<T>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                state: State::Pending(tx),
            },
            rx,
        )
    }

    /// Settles with `value` if still pending. Later calls are ignored and return false.
    pub fn settle(&mut self, value: T) -> bool {
        match std::mem::replace(&mut self.state, State::Settled) {
            State::Pending(tx) => {
                // A dropped receiver means nobody is waiting; still settled.
                let _ = tx.send(value);
                true
            }
            State::Settled => false,
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(self.state, State::Settled)
    }
}
