use crate::i18n::Translator;
use crate::metrics::Metrics;
use crate::models::{BackendEvent, NotificationId, NotificationKind, NotificationLevel, Toast};
use crate::state::StateManager;
use crate::ui::ToastRenderer;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::{Notify, broadcast};
use tokio::task::JoinHandle;

/// Fixed pause between two rendered notifications
pub const DEFAULT_GAP: Duration = Duration::from_millis(100);

/// Display time used when the caller does not pick one
pub const DEFAULT_DURATION: Duration = Duration::from_millis(3000);

/// Pacing of the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationSettings {
    pub gap: Duration,
    pub default_duration: Duration,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            gap: DEFAULT_GAP,
            default_duration: DEFAULT_DURATION,
        }
    }
}

/// What to show and for how long
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationOptions {
    pub message: String,
    pub title: Option<String>,
    pub duration: Option<Duration>,
    /// Stay until closed; overrides `duration`
    pub persistent: bool,
}

impl NotificationOptions {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn persistent(mut self) -> Self {
        self.persistent = true;
        self
    }
}

impl From<&str> for NotificationOptions {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for NotificationOptions {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// A notification waiting for its turn
#[derive(Debug, Clone)]
struct Pending {
    id: NotificationId,
    kind: NotificationKind,
    options: NotificationOptions,
    queued_at: Instant,
}

struct QueueInner {
    pending: Mutex<VecDeque<Pending>>,
    wake: Notify,
    dismiss_timers: Mutex<HashMap<NotificationId, JoinHandle<()>>>,
    state: StateManager,
    renderer: Arc<dyn ToastRenderer>,
    translator: Arc<Translator>,
    metrics: Arc<Metrics>,
    settings: NotificationSettings,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// FIFO queue of user-facing notifications
///
/// Every enqueue gets a fresh random id and joins the pending queue. One worker
/// task renders them strictly in enqueue order, pausing `gap` after each so a
/// burst stays readable. Rendered toasts dismiss themselves after their
/// duration unless persistent.
///
/// Identical messages are not merged; each call produces its own toast.
pub struct NotificationQueue {
    inner: Arc<QueueInner>,
    worker: JoinHandle<()>,
}

impl NotificationQueue {
    /// Create the queue and start its worker on the current tokio runtime
    pub fn new(
        state: StateManager,
        renderer: Arc<dyn ToastRenderer>,
        translator: Arc<Translator>,
        metrics: Arc<Metrics>,
        settings: NotificationSettings,
    ) -> Self {
        let inner = Arc::new(QueueInner {
            pending: Mutex::new(VecDeque::new()),
            wake: Notify::new(),
            dismiss_timers: Mutex::new(HashMap::new()),
            state,
            renderer,
            translator,
            metrics,
            settings,
        });

        let worker = tokio::spawn(Self::drain(Arc::clone(&inner)));

        Self { inner, worker }
    }

    async fn drain(inner: Arc<QueueInner>) {
        tracing::debug!("Notification worker started");
        loop {
            if inner.render_next() {
                tokio::time::sleep(inner.settings.gap).await;
            } else {
                inner.wake.notified().await;
            }
        }
    }

    /// Queue a notification and return its id
    pub fn enqueue(&self, kind: NotificationKind, options: impl Into<NotificationOptions>) -> NotificationId {
        let id = format!("{:016x}", rand::random::<u64>());
        let options = options.into();

        tracing::debug!("Queued {:?} notification {}: {}", kind, id, options.message);
        lock(&self.inner.pending).push_back(Pending {
            id: id.clone(),
            kind,
            options,
            queued_at: Instant::now(),
        });
        self.inner.wake.notify_one();

        id
    }

    pub fn success(&self, options: impl Into<NotificationOptions>) -> NotificationId {
        self.enqueue(NotificationKind::Success, options)
    }

    pub fn info(&self, options: impl Into<NotificationOptions>) -> NotificationId {
        self.enqueue(NotificationKind::Info, options)
    }

    pub fn warning(&self, options: impl Into<NotificationOptions>) -> NotificationId {
        self.enqueue(NotificationKind::Warning, options)
    }

    pub fn error(&self, options: impl Into<NotificationOptions>) -> NotificationId {
        self.enqueue(NotificationKind::Error, options)
    }

    /// Close a notification whether it is still queued or already shown.
    ///
    /// Unknown ids are ignored.
    pub fn close(&self, id: &str) {
        let mut pending = lock(&self.inner.pending);
        let before = pending.len();
        pending.retain(|p| p.id != id);
        if pending.len() != before {
            tracing::debug!("Removed queued notification {}", id);
            return;
        }

        self.inner.dismiss(id);
    }

    /// Number of notifications waiting to be rendered
    pub fn pending_len(&self) -> usize {
        lock(&self.inner.pending).len()
    }

    /// Forward the backend's global `Notification` events into the queue
    pub fn forward_backend_events(
        self: &Arc<Self>,
        mut rx: broadcast::Receiver<BackendEvent>,
    ) -> JoinHandle<()> {
        let queue = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(BackendEvent::Notification(n)) => {
                        let kind = match n.level {
                            NotificationLevel::Info => NotificationKind::Info,
                            NotificationLevel::Warning => NotificationKind::Warning,
                            NotificationLevel::Error => NotificationKind::Error,
                        };
                        queue.enqueue(kind, NotificationOptions::new(n.msg).with_title(n.title));
                    }
                    Ok(BackendEvent::QuickActionCompleted(_)) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("Missed {} backend notifications", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            tracing::debug!("Backend notification forwarding stopped");
        })
    }

    /// Stop the worker and every pending dismissal timer
    pub fn shutdown(&self) {
        self.worker.abort();
        for (_, timer) in lock(&self.inner.dismiss_timers).drain() {
            timer.abort();
        }
    }
}

impl Drop for NotificationQueue {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl QueueInner {
    /// Render the oldest pending notification; `false` when none is waiting.
    ///
    /// The pending lock is held until the toast is visible and its timer is
    /// registered, so a concurrent `close` sees it in exactly one place.
    fn render_next(self: &Arc<Self>) -> bool {
        let mut pending = lock(&self.pending);
        let Some(next) = pending.pop_front() else {
            return false;
        };

        let toast = self.build_toast(next);
        self.state.show_toast(toast.clone());
        self.renderer.render(&toast);
        self.metrics.record_notification_shown();

        if !toast.is_persistent() {
            let inner = Arc::clone(self);
            let id = toast.id.clone();
            let duration = toast.duration;
            let timer = tokio::spawn(async move {
                tokio::time::sleep(duration).await;
                lock(&inner.dismiss_timers).remove(&id);
                inner.dismiss(&id);
            });
            lock(&self.dismiss_timers).insert(toast.id.clone(), timer);
        }

        drop(pending);
        true
    }

    fn build_toast(&self, pending: Pending) -> Toast {
        let Pending {
            id,
            kind,
            options,
            queued_at,
        } = pending;

        let duration = if options.persistent {
            Duration::ZERO
        } else {
            options.duration.unwrap_or(self.settings.default_duration)
        };

        Toast {
            id,
            kind,
            title: options
                .title
                .unwrap_or_else(|| self.translator.t(kind.title_key())),
            message: options.message,
            duration,
            queued_at,
        }
    }

    fn dismiss(&self, id: &str) {
        if let Some(timer) = lock(&self.dismiss_timers).remove(id) {
            timer.abort();
        }
        if self.state.close_toast(id) {
            self.renderer.dismiss(id);
        }
    }
}
