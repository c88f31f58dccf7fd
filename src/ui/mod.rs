// UI module - rendering and prompt seams
//
// This module contains:
// - ToastRenderer / Prompter: the traits services use to reach the screen
// - RenderBridge: hands render commands to a dedicated render loop
// - Console implementations used by the headless shell

pub mod bridge;
pub mod console;

use crate::models::Toast;
use std::future::Future;
use std::pin::Pin;

pub use bridge::{RenderBridge, RenderCommand};
pub use console::{ConsolePrompter, TracingToastRenderer};

/// Future returned by prompt methods
pub type PromptFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// Displays toasts produced by the notification queue
pub trait ToastRenderer: Send + Sync {
    /// Show a toast
    fn render(&self, toast: &Toast);

    /// Remove a previously shown toast
    fn dismiss(&self, id: &str);
}

/// Modal prompts.
///
/// A dismissed dialog is a normal outcome, reported as `false` / `None`.
#[cfg_attr(test, mockall::automock)]
pub trait Prompter: Send + Sync {
    /// Ask a yes/no question
    fn confirm(&self, title: &str, message: &str) -> PromptFuture<bool>;

    /// Let the user pick one of `options`; returns the chosen index
    fn choose(&self, title: &str, options: &[String]) -> PromptFuture<Option<usize>>;
}
