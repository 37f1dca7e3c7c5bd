use crate::models::HourWindow;
use crate::storage::FileMedium;
use crate::tracker::CompletionTracker;
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct AppState<M = FileMedium> {
    pub window: HourWindow,
    pub tracker: Arc<Mutex<CompletionTracker<M>>>,
}

impl<M> AppState<M> {
    pub fn new(window: HourWindow, tracker: CompletionTracker<M>) -> Self {
        Self {
            window,
            tracker: Arc::new(Mutex::new(tracker)),
        }
    }
}

// Derive would require `M: Clone`; only the `Arc` is shared.
impl<M> Clone for AppState<M> {
    fn clone(&self) -> Self {
        Self {
            window: self.window,
            tracker: Arc::clone(&self.tracker),
        }
    }
}
