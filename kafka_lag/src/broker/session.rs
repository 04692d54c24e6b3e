use std::ops::Deref;
use tracing::trace;

/// Read-only view of a broker, bound to a single consumer group.
///
/// Implementations must never commit offsets for the group they were opened with.
pub trait BrokerSession: Sync {
    fn topics(&self) -> Result<Vec<String>, anyhow::Error>;

    fn partitions(&self, topic: &str) -> Result<Vec<i32>, anyhow::Error>;

    /// `None` when the group has never committed this partition.
    fn committed_offset(&self, topic: &str, partition: i32) -> Result<Option<i64>, anyhow::Error>;

    /// High watermark, one past the last produced message.
    fn end_offset(&self, topic: &str, partition: i32) -> Result<i64, anyhow::Error>;

    fn close(&mut self);
}

pub trait SessionFactory: Send + Sync + 'static {
    type Session: BrokerSession;

    fn open(&self, group_id: &str) -> Result<Self::Session, anyhow::Error>;

    fn open_scoped(&self, group_id: &str) -> Result<ScopedSession<Self::Session>, anyhow::Error> {
        let session = self.open(group_id)?;
        Ok(ScopedSession::new(session))
    }
}

/// Owns a session and closes it once when dropped.
pub struct ScopedSession<S: BrokerSession> {
    session: S,
}

impl<S: BrokerSession> ScopedSession<S> {
    pub fn new(session: S) -> Self {
        Self { session }
    }
}

impl<S: BrokerSession> Deref for ScopedSession<S> {
    type Target = S;

    fn deref(&self) -> &Self::Target {
        &self.session
    }
}

impl<S: BrokerSession> Drop for ScopedSession<S> {
    fn drop(&mut self) {
        trace!("Closing broker session");
        self.session.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingSession {
        closed: Arc<AtomicUsize>,
    }

    impl BrokerSession for CountingSession {
        fn topics(&self) -> Result<Vec<String>, anyhow::Error> {
            Ok(vec![])
        }

        fn partitions(&self, _topic: &str) -> Result<Vec<i32>, anyhow::Error> {
            Ok(vec![])
        }

        fn committed_offset(&self, _topic: &str, _partition: i32) -> Result<Option<i64>, anyhow::Error> {
            Ok(None)
        }

        fn end_offset(&self, _topic: &str, _partition: i32) -> Result<i64, anyhow::Error> {
            Ok(0)
        }

        fn close(&mut self) {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn scoped_session_closes_once_on_drop() {
        let closed = Arc::new(AtomicUsize::new(0));
        let scoped = ScopedSession::new(CountingSession {
            closed: closed.clone(),
        });

        assert_eq!(closed.load(Ordering::SeqCst), 0);
        drop(scoped);
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn scoped_session_closes_while_unwinding() {
        let closed = Arc::new(AtomicUsize::new(0));
        let closed_clone = closed.clone();

        let result = std::panic::catch_unwind(move || {
            let _scoped = ScopedSession::new(CountingSession {
                closed: closed_clone,
            });
            panic!("broker client panicked");
        });

        assert!(result.is_err());
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }
}
