// RenderBridge - Hands toast rendering to a dedicated render loop
//
// Services call the renderer from whatever task they run on. The bridge turns
// those calls into commands on a bounded channel so the actual drawing happens
// on one loop, in order, without blocking the caller.

use super::ToastRenderer;
use crate::models::Toast;
use tokio::sync::mpsc;

/// A drawing request produced by the notification queue
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    Show(Toast),
    Dismiss(String),
}

/// [`ToastRenderer`] that forwards to a render loop over a bounded channel
///
/// # Example
/// ```ignore
/// let (bridge, mut rx) = RenderBridge::new();
/// tokio::spawn(async move {
///     while let Some(cmd) = rx.recv().await {
///         draw(cmd);
///     }
/// });
/// ```
#[derive(Clone)]
pub struct RenderBridge {
    /// Bounded to 100 commands to prevent unbounded memory growth if rendering lags
    tx: mpsc::Sender<RenderCommand>,
}

impl RenderBridge {
    pub fn new() -> (Self, mpsc::Receiver<RenderCommand>) {
        let (tx, rx) = mpsc::channel(100);
        (Self { tx }, rx)
    }

    /// Spawn a render loop that hands every command to `renderer`
    pub fn spawn<R>(renderer: R) -> (Self, tokio::task::JoinHandle<()>)
    where
        R: ToastRenderer + 'static,
    {
        let (bridge, mut rx) = Self::new();
        let handle = tokio::spawn(async move {
            tracing::debug!("Render loop started");
            while let Some(cmd) = rx.recv().await {
                match cmd {
                    RenderCommand::Show(toast) => renderer.render(&toast),
                    RenderCommand::Dismiss(id) => renderer.dismiss(&id),
                }
            }
            tracing::debug!("Render loop terminated");
        });
        (bridge, handle)
    }

    fn send(&self, cmd: RenderCommand) {
        match self.tx.try_send(cmd) {
            Ok(_) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!("Render channel full - dropping render command");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::warn!("Failed to send render command - render loop has stopped");
            }
        }
    }
}

impl ToastRenderer for RenderBridge {
    fn render(&self, toast: &Toast) {
        self.send(RenderCommand::Show(toast.clone()));
    }

    fn dismiss(&self, id: &str) {
        self.send(RenderCommand::Dismiss(id.to_string()));
    }
}
