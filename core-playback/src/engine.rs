//! Engine slot: owned home of the current streaming engine.
//!
//! The invariant that matters is teardown-before-attach: a previous engine
//! keeps fetching into the shared media element until it is disposed, so two
//! live engines on one element means interleaved garbage. The slot makes the
//! order structural — `attach` cannot complete without first consuming and
//! disposing whatever was there.

use bridge_traits::media::StreamEngine;
use tracing::warn;

/// Holds at most one live streaming engine.
#[derive(Default)]
pub struct EngineSlot {
    current: Option<Box<dyn StreamEngine>>,
}

impl EngineSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_attached(&self) -> bool {
        self.current.is_some()
    }

    /// Borrow the attached engine, if any.
    pub fn engine(&self) -> Option<&dyn StreamEngine> {
        self.current.as_deref()
    }

    /// Dispose the attached engine, if any. A dispose failure is logged and
    /// otherwise ignored: the engine is unreachable afterwards either way,
    /// and the teardown path must not be able to fail.
    pub async fn dispose(&mut self) {
        if let Some(engine) = self.current.take() {
            if let Err(e) = engine.dispose().await {
                warn!(error = %e, "engine dispose failed");
            }
        }
    }

    /// Attach a new engine, disposing the previous one first.
    pub async fn attach(&mut self, engine: Box<dyn StreamEngine>) {
        self.dispose().await;
        self.current = Some(engine);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result;
    use bridge_traits::media::EngineEvent;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use tokio::sync::broadcast;

    struct TracedEngine {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
        events: broadcast::Sender<EngineEvent>,
    }

    impl TracedEngine {
        fn boxed(name: &'static str, log: Arc<Mutex<Vec<String>>>) -> Box<dyn StreamEngine> {
            let (events, _) = broadcast::channel(4);
            Box::new(Self { name, log, events })
        }
    }

    #[async_trait]
    impl StreamEngine for TracedEngine {
        async fn load(&self, manifest_url: &str) -> Result<()> {
            self.log.lock().push(format!("{} load {manifest_url}", self.name));
            Ok(())
        }

        async fn recover_media(&self) -> Result<()> {
            Ok(())
        }

        async fn dispose(self: Box<Self>) -> Result<()> {
            self.log.lock().push(format!("{} dispose", self.name));
            Ok(())
        }

        fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
            self.events.subscribe()
        }
    }

    #[tokio::test]
    async fn attach_disposes_the_previous_engine_first() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut slot = EngineSlot::new();

        slot.attach(TracedEngine::boxed("first", log.clone())).await;
        slot.attach(TracedEngine::boxed("second", log.clone())).await;
        slot.engine().unwrap().load("https://e.com/m.m3u8").await.unwrap();

        assert_eq!(
            *log.lock(),
            vec!["first dispose", "second load https://e.com/m.m3u8"]
        );
    }

    #[tokio::test]
    async fn dispose_empties_the_slot() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut slot = EngineSlot::new();
        slot.attach(TracedEngine::boxed("only", log.clone())).await;
        assert!(slot.is_attached());

        slot.dispose().await;
        assert!(!slot.is_attached());
        assert_eq!(*log.lock(), vec!["only dispose"]);

        // Disposing again is a no-op.
        slot.dispose().await;
        assert_eq!(log.lock().len(), 1);
    }
}
