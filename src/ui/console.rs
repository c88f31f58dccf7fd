use super::{PromptFuture, Prompter, ToastRenderer};
use crate::models::{NotificationKind, Toast};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

/// Renders toasts as log records
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingToastRenderer;

impl ToastRenderer for TracingToastRenderer {
    fn render(&self, toast: &Toast) {
        match toast.kind {
            NotificationKind::Error => {
                tracing::error!(id = %toast.id, "{}: {}", toast.title, toast.message)
            }
            NotificationKind::Warning => {
                tracing::warn!(id = %toast.id, "{}: {}", toast.title, toast.message)
            }
            NotificationKind::Success | NotificationKind::Info => {
                tracing::info!(id = %toast.id, "{}: {}", toast.title, toast.message)
            }
        }
    }

    fn dismiss(&self, id: &str) {
        tracing::debug!("Dismissed toast {}", id);
    }
}

/// Prompts on stdout, answers read line by line from stdin
///
/// Every clone reads from the same buffered input, so answers typed (or piped)
/// ahead of a prompt are not lost between prompts.
pub struct ConsolePrompter<R = Stdin> {
    input: Arc<Mutex<Lines<BufReader<R>>>>,
}

impl ConsolePrompter {
    pub fn new() -> Self {
        Self::from_reader(tokio::io::stdin())
    }
}

impl Default for ConsolePrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Clone for ConsolePrompter<R> {
    fn clone(&self) -> Self {
        Self {
            input: Arc::clone(&self.input),
        }
    }
}

impl<R: AsyncRead + Unpin + Send + 'static> ConsolePrompter<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            input: Arc::new(Mutex::new(BufReader::new(reader).lines())),
        }
    }

    async fn ask(input: Arc<Mutex<Lines<BufReader<R>>>>, prompt: String) -> Option<String> {
        // Held across the write so concurrent prompts do not interleave
        let mut lines = input.lock().await;

        let mut stdout = tokio::io::stdout();
        if stdout.write_all(prompt.as_bytes()).await.is_err() || stdout.flush().await.is_err() {
            return None;
        }

        match lines.next_line().await {
            Ok(Some(line)) => Some(line.trim().to_string()),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Failed to read answer: {}", e);
                None
            }
        }
    }
}

impl<R: AsyncRead + Unpin + Send + 'static> Prompter for ConsolePrompter<R> {
    fn confirm(&self, title: &str, message: &str) -> PromptFuture<bool> {
        let answer = Self::ask(Arc::clone(&self.input), format!("{}\n{} [y/N] ", title, message));
        Box::pin(async move {
            matches!(
                answer.await.as_deref(),
                Some("y") | Some("Y") | Some("yes")
            )
        })
    }

    fn choose(&self, title: &str, options: &[String]) -> PromptFuture<Option<usize>> {
        let mut prompt = format!("{}\n", title);
        for (i, option) in options.iter().enumerate() {
            prompt.push_str(&format!("  {}. {}\n", i + 1, option));
        }
        prompt.push_str("> ");

        let answer = Self::ask(Arc::clone(&self.input), prompt);
        Box::pin(async move { parse_choice(&answer.await?) })
    }
}

/// 1-based answer to 0-based index; anything else is a cancellation
fn parse_choice(answer: &str) -> Option<usize> {
    answer.trim().parse::<usize>().ok()?.checked_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_choice() {
        assert_eq!(parse_choice("1"), Some(0));
        assert_eq!(parse_choice(" 3 "), Some(2));
        assert_eq!(parse_choice("0"), None);
        assert_eq!(parse_choice(""), None);
        assert_eq!(parse_choice("abc"), None);
    }

    #[tokio::test]
    async fn test_answers_survive_across_prompts() {
        let prompter = ConsolePrompter::from_reader(&b"2\n1\ny\n"[..]);
        let options = vec!["laptop".to_string(), "deck".to_string()];

        assert_eq!(prompter.choose("Game A", &options).await, Some(1));
        assert_eq!(prompter.clone().choose("Game B", &options).await, Some(0));
        assert!(prompter.confirm("Reset", "Sure?").await);

        // Input exhausted
        assert_eq!(prompter.choose("Game C", &options).await, None);
    }
}
