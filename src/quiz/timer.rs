//! Per-chat question countdowns.
//!
//! Every question transition arms a fresh countdown, and arming always
//! cancels the countdown already running for that chat first. At most one
//! countdown is ever live per chat; without that discipline an old timer
//! would keep firing over the next question.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use teloxide::types::ChatId;
use tokio::task::JoinHandle;

#[derive(Default)]
pub struct Countdowns {
    armed: tokio::sync::Mutex<HashMap<ChatId, JoinHandle<()>>>,
}

impl Countdowns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms a countdown for `chat` that runs `on_expire` after `after`.
    /// Any countdown already armed for the chat is aborted before the new
    /// one starts.
    pub async fn arm<F>(&self, chat: ChatId, after: Duration, on_expire: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut armed = self.armed.lock().await;
        if let Some(previous) = armed.remove(&chat) {
            previous.abort();
        }
        armed.insert(
            chat,
            tokio::spawn(async move {
                tokio::time::sleep(after).await;
                on_expire.await;
            }),
        );
    }

    /// Cancels the countdown for `chat`, if one is armed.
    pub async fn disarm(&self, chat: ChatId) {
        if let Some(previous) = self.armed.lock().await.remove(&chat) {
            previous.abort();
        }
    }

    /// Drops the bookkeeping for `chat` without aborting the task. The
    /// expiry task calls this about itself before re-arming, since it must
    /// not abort its own handle mid-flight.
    pub async fn forget(&self, chat: ChatId) {
        self.armed.lock().await.remove(&chat);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const CHAT: ChatId = ChatId(1);

    #[tokio::test]
    async fn countdown_fires_after_the_delay() {
        let timers = Countdowns::new();
        let fired = Arc::new(AtomicUsize::new(0));

        let counter = fired.clone();
        timers
            .arm(CHAT, Duration::from_millis(10), async move {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .await;

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rearming_cancels_the_previous_countdown() {
        let timers = Countdowns::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let counter = first.clone();
        timers
            .arm(CHAT, Duration::from_millis(20), async move {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .await;

        let counter = second.clone();
        timers
            .arm(CHAT, Duration::from_millis(20), async move {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .await;

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(first.load(Ordering::SeqCst), 0, "replaced countdown must not fire");
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn countdowns_for_different_chats_are_independent() {
        let timers = Countdowns::new();
        let fired = Arc::new(AtomicUsize::new(0));

        for id in [ChatId(1), ChatId(2)] {
            let counter = fired.clone();
            timers
                .arm(id, Duration::from_millis(10), async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                })
                .await;
        }

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn disarm_cancels_the_countdown() {
        let timers = Countdowns::new();
        let fired = Arc::new(AtomicUsize::new(0));

        let counter = fired.clone();
        timers
            .arm(CHAT, Duration::from_millis(20), async move {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .await;
        timers.disarm(CHAT).await;

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
