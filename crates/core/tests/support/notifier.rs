//! Notifier that keeps every notice for later assertions.

use chamados_core::Notifier;
use chamados_domain::{Notice, NoticeLevel};
use parking_lot::Mutex;

#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    pub fn titles(&self) -> Vec<String> {
        self.notices.lock().iter().map(|n| n.title.clone()).collect()
    }

    pub fn last(&self) -> Option<Notice> {
        self.notices.lock().last().cloned()
    }

    pub fn destructive_count(&self) -> usize {
        self.notices.lock().iter().filter(|n| n.level == NoticeLevel::Destructive).count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().push(notice);
    }
}
