//! Base trait for bell sounds.

use anyhow::Result;
use async_trait::async_trait;

use crate::schedule::types::EventName;

/// Something that can ring the bell.
///
/// Calls are fire-and-forget from the scheduler's point of view: the alarm
/// service logs an `Err` and keeps going.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Play the notification for `event`.
    async fn play(&self, event: EventName) -> Result<()>;
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Arc, Mutex};

    use super::*;

    /// Records every event it is asked to play.
    #[derive(Clone, Default)]
    pub struct RecordingSink {
        pub played: Arc<Mutex<Vec<EventName>>>,
        pub fail: bool,
    }

    impl RecordingSink {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        pub fn played(&self) -> Vec<EventName> {
            self.played.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NotificationSink for RecordingSink {
        fn name(&self) -> &str {
            "recording"
        }

        async fn play(&self, event: EventName) -> Result<()> {
            self.played.lock().unwrap().push(event);
            if self.fail {
                anyhow::bail!("audio device unavailable");
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_recording_sink_records_even_on_failure() {
        let sink = RecordingSink::failing();
        assert!(sink.play(EventName::Open).await.is_err());
        assert_eq!(sink.played(), vec![EventName::Open]);
    }
}
