use anyhow::bail;


/// Configuration of the dispatch fairness machinery, fixed at dispatcher construction.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// upper bound for each source's backlog. Messages arriving while the backlog is at
    ///  this size are discarded - overflow means the source sends faster than the
    ///  handler drains, and backpressure is applied by discard.
    pub max_source_queue_size: usize,

    /// how many arrivals from sources other than the ring head to tolerate before the
    ///  head's turn is abandoned for this scheduling cycle. With 0, every mismatched
    ///  arrival abandons the head's turn immediately.
    pub give_up_after_skipped: u32,

    /// how many consecutive given-up scheduling cycles a source survives before it is
    ///  evicted along with its queued messages
    pub drop_source_after_retries: u32,
}

impl DispatcherConfig {
    /// Invalid configuration is a programming error, surfaced as construction failure
    ///  of the dispatcher.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_source_queue_size == 0 {
            bail!("max_source_queue_size must be greater than zero - a zero-sized backlog would discard every message");
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use rstest::rstest;
    use super::*;

    #[rstest]
    #[case::regular(2, 2, 1, true)]
    #[case::zero_queue_size(0, 2, 1, false)]
    #[case::zero_thresholds(1, 0, 0, true)]
    #[case::large_values(1024, u32::MAX, u32::MAX, true)]
    fn test_validate(#[case] max_source_queue_size: usize, #[case] give_up_after_skipped: u32, #[case] drop_source_after_retries: u32, #[case] expected_valid: bool) {
        let config = DispatcherConfig {
            max_source_queue_size,
            give_up_after_skipped,
            drop_source_after_retries,
        };
        assert_eq!(config.validate().is_ok(), expected_valid);
    }
}
