use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::bail;
use async_trait::async_trait;

use crate::dispatch::packet_handler::PacketHandler;


/// A handler that records every `(source, message)` pair it is invoked with, in
///  invocation order, and always succeeds.
pub struct RecordingHandler<S, M> {
    calls: Mutex<Vec<(S, M)>>,
}

impl<S, M> RecordingHandler<S, M> {
    pub fn new() -> RecordingHandler<S, M> {
        RecordingHandler {
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(S, M)>
    where
        S: Clone,
        M: Clone,
    {
        self.calls.lock().unwrap().clone()
    }

    pub fn num_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl<S, M> Default for RecordingHandler<S, M> {
    fn default() -> Self {
        RecordingHandler::new()
    }
}

#[async_trait]
impl<S: Send + Sync + 'static, M: Send + 'static> PacketHandler<S, M> for RecordingHandler<S, M> {
    async fn handle_packet(&self, source: S, message: M) -> anyhow::Result<()> {
        self.calls.lock().unwrap().push((source, message));
        Ok(())
    }
}


/// A handler that fails the first `n` invocations and succeeds afterwards, recording
///  all invocations either way.
pub struct FailingHandler<S, M> {
    fail_first: usize,
    num_invocations: AtomicUsize,
    recorder: RecordingHandler<S, M>,
}

impl<S, M> FailingHandler<S, M> {
    pub fn fail_first(n: usize) -> FailingHandler<S, M> {
        FailingHandler {
            fail_first: n,
            num_invocations: AtomicUsize::new(0),
            recorder: RecordingHandler::new(),
        }
    }

    pub fn calls(&self) -> Vec<(S, M)>
    where
        S: Clone,
        M: Clone,
    {
        self.recorder.calls()
    }

    pub fn num_calls(&self) -> usize {
        self.recorder.num_calls()
    }
}

#[async_trait]
impl<S: Send + Sync + 'static, M: Send + 'static> PacketHandler<S, M> for FailingHandler<S, M> {
    async fn handle_packet(&self, source: S, message: M) -> anyhow::Result<()> {
        let call_index = self.num_invocations.fetch_add(1, Ordering::SeqCst);
        self.recorder.handle_packet(source, message).await?;
        if call_index < self.fail_first {
            bail!("intentional handler failure #{}", call_index + 1);
        }
        Ok(())
    }
}
