//! Notice delivery
//!
//! [`TracingNotifier`] logs every notice and republishes it on a broadcast
//! channel for whatever surface displays them. Delivery never blocks and a
//! notice with no subscriber is simply logged.

use chamados_core::Notifier;
use chamados_domain::{Notice, NoticeLevel};
use tokio::sync::broadcast;
use tracing::{info, warn};

const NOTICE_CAPACITY: usize = 32;

pub struct TracingNotifier {
    sender: broadcast::Sender<Notice>,
}

impl TracingNotifier {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(NOTICE_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.sender.subscribe()
    }
}

impl Default for TracingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Info => {
                info!(title = %notice.title, description = %notice.description, "notice")
            }
            NoticeLevel::Destructive => {
                warn!(title = %notice.title, description = %notice.description, "notice")
            }
        }
        // No receivers is fine.
        let _ = self.sender.send(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notices_reach_subscribers() {
        let notifier = TracingNotifier::new();
        let mut notices = notifier.subscribe();

        notifier.notify(Notice::destructive("Erro ao cancelar", "offline"));

        let received = notices.try_recv().unwrap();
        assert_eq!(received.level, NoticeLevel::Destructive);
        assert_eq!(received.title, "Erro ao cancelar");
    }

    #[test]
    fn notify_without_subscribers_does_not_fail() {
        let _guard = tracing::subscriber::set_default(
            tracing_subscriber::fmt().with_test_writer().finish(),
        );
        TracingNotifier::default().notify(Notice::info("Chamado finalizado", ""));
    }
}
