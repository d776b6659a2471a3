//! # Notice Bus
//!
//! The only user-facing fault surface: stacked, dismissible banners that expire on their own.
//!
//! Components that report faults receive an `Arc<dyn Notifier>`; there is no global instance.
//! Every raised notice is also logged and broadcast to subscribers (the terminal client prints them).

use log::{error, warn};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::Instant;

pub const WARN_AUTO_HIDE: Duration = Duration::from_millis(6000);
pub const ERROR_AUTO_HIDE: Duration = Duration::from_millis(8000);

const DEFAULT_WARN_TEXT: &str = "Warning: Something may be wrong.";
const DEFAULT_ERROR_TEXT: &str = "Something went wrong.";

/// Surface for reporting faults to the user. Calls never block.
pub trait Notifier: Send + Sync {
    fn warn_for(&self, message: &str, auto_hide: Duration);

    fn error_for(&self, message: &str, auto_hide: Duration);

    /// Removes every banner.
    fn clear(&self);

    fn warn(&self, message: &str) {
        self.warn_for(message, WARN_AUTO_HIDE);
    }

    fn error(&self, message: &str) {
        self.error_for(message, ERROR_AUTO_HIDE);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Warn,
    Error,
}

impl NoticeKind {
    fn default_auto_hide(self) -> Duration {
        match self {
            Self::Warn => WARN_AUTO_HIDE,
            Self::Error => ERROR_AUTO_HIDE,
        }
    }

    fn default_text(self) -> &'static str {
        match self {
            Self::Warn => DEFAULT_WARN_TEXT,
            Self::Error => DEFAULT_ERROR_TEXT,
        }
    }
}

/// One banner.
#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    pub id: u64,
    pub kind: NoticeKind,
    pub message: String,
    pub expires_at: Instant,
}

#[derive(Default)]
struct Banners {
    next_id: u64,
    active: Vec<Notice>,
}

/// In-process [`Notifier`] keeping the banner stack.
///
/// Expired banners are pruned whenever the stack is read or written.
#[derive(Clone)]
pub struct NoticeBus {
    banners: Arc<Mutex<Banners>>,
    sender: broadcast::Sender<Notice>,
}

impl NoticeBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(64);
        Self {
            banners: Arc::new(Mutex::new(Banners::default())),
            sender,
        }
    }

    /// Receives every notice raised from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.sender.subscribe()
    }

    /// Banners still on screen, oldest first.
    pub fn active(&self) -> Vec<Notice> {
        let mut banners = self.lock();
        prune(&mut banners.active);
        banners.active.clone()
    }

    /// Close button of one banner. Returns false if it was already gone.
    pub fn dismiss(&self, id: u64) -> bool {
        let mut banners = self.lock();
        let before = banners.active.len();
        banners.active.retain(|n| n.id != id);
        banners.active.len() != before
    }

    /// An empty message gets the kind's default text, a zero delay the kind's default delay.
    fn show(&self, kind: NoticeKind, message: &str, auto_hide: Duration) -> Notice {
        let message = if message.is_empty() {
            kind.default_text()
        } else {
            message
        };
        let auto_hide = if auto_hide.is_zero() {
            kind.default_auto_hide()
        } else {
            auto_hide
        };

        let notice = {
            let mut banners = self.lock();
            prune(&mut banners.active);
            banners.next_id += 1;
            let notice = Notice {
                id: banners.next_id,
                kind,
                message: message.to_string(),
                expires_at: Instant::now() + auto_hide,
            };
            banners.active.push(notice.clone());
            notice
        };

        match kind {
            NoticeKind::Warn => warn!("Notice: {}", message),
            NoticeKind::Error => error!("Notice: {}", message),
        }
        // No subscribers is fine.
        let _ = self.sender.send(notice.clone());
        notice
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Banners> {
        self.banners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for NoticeBus {
    fn default() -> Self {
        Self::new()
    }
}

fn prune(active: &mut Vec<Notice>) {
    let now = Instant::now();
    active.retain(|n| n.expires_at > now);
}

impl Notifier for NoticeBus {
    fn warn_for(&self, message: &str, auto_hide: Duration) {
        self.show(NoticeKind::Warn, message, auto_hide);
    }

    fn error_for(&self, message: &str, auto_hide: Duration) {
        self.show(NoticeKind::Error, message, auto_hide);
    }

    fn clear(&self) {
        self.lock().active.clear();
    }
}
