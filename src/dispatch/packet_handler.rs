use async_trait::async_trait;
#[cfg(test)] use mockall::automock;


/// A [PacketHandler] is the application-level consumer of inbound traffic: the
///  dispatcher feeds it one `(source, message)` pair per call, in the order determined
///  by the scheduling ring.
///
/// This is a blocking call from the dispatcher's perspective, holding up the drain loop
///  until it completes. Non-trivial work should probably be offloaded to some
///  asynchronous processing, but it is up to the handler implementation to decide and
///  do this.
///
/// The handler's reliability is not assumed: an error returned from [handle_packet]
///  is caught and logged by the dispatcher, and the message counts as consumed either
///  way - it is not redelivered.
///
/// [handle_packet]: PacketHandler::handle_packet
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PacketHandler<S: Send + 'static, M: Send + 'static>: Send + Sync + 'static {
    async fn handle_packet(&self, source: S, message: M) -> anyhow::Result<()>;
}

// mockall's generated `MockPacketHandler<S, M>` holds `S`/`M` only via `PhantomData`,
// so it never actually shares a `S`/`M` value across threads; the auto-derived `Sync`
// bound on those markers is overly conservative for this generic+automock combination.
#[cfg(test)]
unsafe impl<S: Send + 'static, M: Send + 'static> Sync for MockPacketHandler<S, M> {}
