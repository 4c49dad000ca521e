//! Fair dispatch of inbound peer traffic to an application-level packet handler.
//!
//! A peer-to-peer node continuously receives packets from an unbounded set of remote
//!  peers over its transport; this crate sits between that receive loop and the
//!  application's handler, deciding which peer's backlog is served next.
//!
//! ## Design goals
//!
//! * Isolate each peer's traffic - a loud or slow peer must not starve the others
//!   * peers take turns in a scheduling ring, and each turn drains one peer's backlog
//! * Bound the memory consumed by any single peer's backlog
//!   * per-peer FIFO queues with a configured cap; messages arriving above the cap are
//!      discarded
//! * Detect peers that repeatedly fail to make progress on their turn, and evict them
//!   along with their queued messages
//! * Guarantee strict serialization of handler invocations when requested
//!   * [dispatch::serialized::SerializedDispatcher] keeps the entire dispatch operation
//!      inside one mutex, so a handler that is not concurrency safe sees one invocation
//!      at a time
//! * Stay agnostic of transport, wire format and peer identity - sources and messages
//!    are opaque type parameters, and delivery order within one source is preserved
//!
//! Submission is fire-and-forget: neither queue overflow nor a failing handler is
//!  reported back to the submitter. Peers are not entitled to synchronous
//!  acknowledgement from the scheduler; higher-level protocols observe the effects
//!  (e.g. missing acks) instead.

pub mod dispatch;
pub mod test_util;
