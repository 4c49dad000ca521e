use std::collections::VecDeque;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::{debug, trace, warn};

use crate::dispatch::dispatcher_config::DispatcherConfig;
use crate::dispatch::packet_handler::PacketHandler;
use crate::dispatch::scheduling_ring::SchedulingRing;


/// A [FairDispatcher] stands between the transport's receive loop and the application's
///  [PacketHandler], isolating each source's traffic so that a loud or slow source
///  cannot starve the others.
///
/// Sources take turns in a scheduling ring, each source's backlog is a bounded FIFO
///  queue, and a source whose turn repeatedly passes without accepted input is evicted.
///  Sources and messages are opaque to the dispatcher - fairness is by source, not by
///  byte or priority.
///
/// NB: [dispatch](FairDispatcher::dispatch) takes `&mut self`: state transitions assume
///  a single logical caller at a time, and the exclusive borrow is what enforces that.
///  [SerializedDispatcher](crate::dispatch::serialized::SerializedDispatcher) makes a
///  dispatcher shareable across concurrent producers.
pub struct FairDispatcher<S, M> {
    config: Arc<DispatcherConfig>,
    handler: Arc<dyn PacketHandler<S, M>>,

    ring: SchedulingRing<S>,
    /// per-source backlog. Invariant: the key set is exactly the ring's member set.
    queues: FxHashMap<S, VecDeque<M>>,
    /// per-source count of consecutive scheduling cycles in which the source was given
    ///  up on; reset when a message from the source is accepted
    retries: FxHashMap<S, u32>,
    /// arrivals from sources other than the ring head since the last drain or give-up
    skipped: u32,
}

impl<S, M> FairDispatcher<S, M>
where
    S: Clone + Eq + Hash + Debug + Send + Sync + 'static,
    M: Send + 'static,
{
    pub fn new(handler: Arc<dyn PacketHandler<S, M>>, config: DispatcherConfig) -> anyhow::Result<FairDispatcher<S, M>> {
        config.validate()?;

        Ok(FairDispatcher {
            config: Arc::new(config),
            handler,
            ring: SchedulingRing::new(),
            queues: Default::default(),
            retries: Default::default(),
            skipped: 0,
        })
    }

    /// Submit a message from a source, then do whatever dispatch work is due. The call
    ///  resolves when that work has quiesced, which may include zero or more handler
    ///  invocations and possibly the eviction of some source - not necessarily the
    ///  caller's.
    ///
    /// This is a fire-and-forget submission point: neither queue overflow nor handler
    ///  failure is reported to the caller.
    pub async fn dispatch(&mut self, source: S, message: M) {
        self.ensure_source(&source);
        self.enqueue(&source, message);
        self.drain(&source).await;
    }

    /// number of sources currently known to the scheduler
    pub fn num_sources(&self) -> usize {
        self.ring.len()
    }

    /// current backlog size for a source, or `None` if the source is not (or no longer)
    ///  known
    pub fn queued_messages(&self, source: &S) -> Option<usize> {
        self.queues.get(source).map(|q| q.len())
    }

    fn ensure_source(&mut self, source: &S) {
        if !self.queues.contains_key(source) {
            debug!("first message from {:?} - adding it to the scheduling ring", source);
            self.ring.push_tail(source.clone());
            self.queues.insert(source.clone(), VecDeque::new());
            self.retries.insert(source.clone(), 0);
        }
    }

    fn enqueue(&mut self, source: &S, message: M) {
        let queue = self.queues.get_mut(source).expect("source was registered above");
        if queue.len() < self.config.max_source_queue_size {
            queue.push_back(message);
            // accepted input means the source is making progress - it starts a fresh
            //  retry budget. A discarded message does not count as progress.
            self.retries.insert(source.clone(), 0);
        }
        else {
            warn!("backlog for {:?} is full ({} messages) - discarding message", source, queue.len());
        }
    }

    async fn drain(&mut self, source: &S) {
        if self.ring.head() != Some(source) {
            self.skipped += 1;
            trace!("arrival from {:?} while {:?} is scheduled - {} skipped so far", source, self.ring.head(), self.skipped);

            if self.skipped < self.config.give_up_after_skipped {
                return;
            }
            self.give_up_on_head();
        }
        self.handle_pending().await;
    }

    /// The current head had its chance: too many messages arrived for other sources
    ///  while its own queue stayed empty. Charge a retry against it and move it to the
    ///  end of the ring - or evict it if its retry budget is used up.
    fn give_up_on_head(&mut self) {
        self.skipped = 0;

        let Some(head) = self.ring.head().cloned() else {
            return;
        };

        let retries = self.retries.get_mut(&head).expect("ring members are always tracked");
        *retries += 1;
        let retries = *retries;

        if retries > self.config.drop_source_after_retries {
            let num_lost = self.queues.get(&head).map(|q| q.len()).unwrap_or(0);
            debug!("{:?} had no accepted input for {} consecutive cycles - evicting it, discarding {} queued messages", head, retries, num_lost);
            self.ring.remove(&head);
            self.queues.remove(&head);
            self.retries.remove(&head);
        }
        else {
            trace!("giving up on idle head {:?} for this cycle (retry {})", head, retries);
            self.ring.rotate();
        }
    }

    /// Serve the ring head's backlog until it is empty, then rotate and continue with
    ///  the next head, stopping at the first head with nothing pending. That head is
    ///  idle and will be visited again on the next arrival.
    async fn handle_pending(&mut self) {
        let handler = self.handler.clone();

        loop {
            let Some(head) = self.ring.head().cloned() else {
                return;
            };

            if self.queues.get(&head).map(|q| q.is_empty()).unwrap_or(true) {
                return;
            }

            while let Some(message) = self.queues.get_mut(&head).and_then(|q| q.pop_front()) {
                trace!("dispatching message from {:?}", head);
                if let Err(e) = handler.handle_packet(head.clone(), message).await {
                    // the dispatcher's liveness must not depend on handler reliability:
                    //  the message counts as consumed regardless
                    warn!("handler failed for a message from {:?}: {}", head, e);
                }
                self.skipped = 0;
            }

            self.ring.rotate();
        }
    }
}
