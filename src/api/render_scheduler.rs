use tracing::trace;

/// Opaque handle of a scheduled animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequestId(u64);

impl FrameRequestId {
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Coalesces render requests into at most one paint per animation frame.
#[derive(Debug, Default)]
pub struct RenderScheduler {
    pending: Option<FrameRequestId>,
    next_id: u64,
    coalesced: u64,
}

impl RenderScheduler {
    /// Schedules a frame. Returns the new handle, or `None` when a frame is
    /// already in flight and this request folds into it.
    pub fn request(&mut self) -> Option<FrameRequestId> {
        if self.pending.is_some() {
            self.coalesced += 1;
            trace!(coalesced = self.coalesced, "render request coalesced");
            return None;
        }
        self.next_id += 1;
        let id = FrameRequestId(self.next_id);
        self.pending = Some(id);
        Some(id)
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Clears and returns the in-flight handle when its frame fires.
    pub fn take_pending(&mut self) -> Option<FrameRequestId> {
        self.pending.take()
    }

    /// Requests folded into an already scheduled frame since creation.
    #[must_use]
    pub fn coalesced_requests(&self) -> u64 {
        self.coalesced
    }
}

#[cfg(test)]
mod tests {
    use super::RenderScheduler;

    #[test]
    fn repeated_requests_share_one_frame() {
        let mut scheduler = RenderScheduler::default();
        let first = scheduler.request().expect("scheduled");
        assert!(scheduler.request().is_none());
        assert!(scheduler.request().is_none());
        assert_eq!(scheduler.coalesced_requests(), 2);
        assert_eq!(scheduler.take_pending(), Some(first));
        assert!(scheduler.take_pending().is_none());

        let second = scheduler.request().expect("scheduled again");
        assert_ne!(first, second);
    }
}
