// Shared services handed to every UI-facing component
//
// Built once at startup and cloned into whatever needs it; there is no
// module-level state anywhere in the crate.

use crate::i18n::Translator;
use crate::metrics::Metrics;
use crate::services::loading::LoadingStack;
use crate::services::notification::{NotificationQueue, NotificationSettings};
use crate::state::StateManager;
use crate::ui::ToastRenderer;
use std::sync::Arc;

/// State, text, metrics and the two side-effect helpers
#[derive(Clone)]
pub struct AppContext {
    pub state: StateManager,
    pub translator: Arc<Translator>,
    pub metrics: Arc<Metrics>,
    pub notifications: Arc<NotificationQueue>,
    pub loading: LoadingStack,
}

impl AppContext {
    /// Build the context; starts the notification worker on the current runtime
    pub fn new(
        renderer: Arc<dyn ToastRenderer>,
        translator: Translator,
        notification_settings: NotificationSettings,
    ) -> Self {
        let state = StateManager::new();
        let translator = Arc::new(translator);
        let metrics = Arc::new(Metrics::new());
        let notifications = Arc::new(NotificationQueue::new(
            state.clone(),
            renderer,
            Arc::clone(&translator),
            Arc::clone(&metrics),
            notification_settings,
        ));
        let loading = LoadingStack::new(state.clone(), Arc::clone(&translator));

        Self {
            state,
            translator,
            metrics,
            notifications,
            loading,
        }
    }

    /// Shorthand for [`Translator::t`]
    pub fn t(&self, key: &str) -> String {
        self.translator.t(key)
    }

    /// Shorthand for [`Translator::t_with`]
    pub fn t_with(&self, key: &str, args: &[(&str, &str)]) -> String {
        self.translator.t_with(key, args)
    }
}
