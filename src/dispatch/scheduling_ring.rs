use std::collections::VecDeque;


/// The scheduling ring is the ordered sequence of sources known to the dispatcher. The
///  head is the source currently entitled to be drained; rotating moves the head to the
///  tail so the next source gets its turn.
///
/// The ring stores each source at most once; keeping it that way is the caller's
///  responsibility (sources are added only when their queue entry is created).
pub struct SchedulingRing<S> {
    ring: VecDeque<S>,
}

impl<S: Eq> SchedulingRing<S> {
    pub fn new() -> SchedulingRing<S> {
        SchedulingRing {
            ring: VecDeque::new(),
        }
    }

    pub fn head(&self) -> Option<&S> {
        self.ring.front()
    }

    /// append a source at the tail, i.e. at the end of the current scheduling cycle
    pub fn push_tail(&mut self, source: S) {
        self.ring.push_back(source);
    }

    /// move the head to the tail. On a ring with a single element this rotates the ring
    ///  onto itself, which is a no-op.
    pub fn rotate(&mut self) {
        if let Some(head) = self.ring.pop_front() {
            self.ring.push_back(head);
        }
    }

    /// remove a source from the ring, wherever it currently is
    pub fn remove(&mut self, source: &S) {
        self.ring.retain(|s| s != source);
    }

    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &S> {
        self.ring.iter()
    }
}

impl<S: Eq> Default for SchedulingRing<S> {
    fn default() -> Self {
        SchedulingRing::new()
    }
}
