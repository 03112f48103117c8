use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::activity_service::ActivityService;
use crate::ai::{AiConfig, AiGateway, ChatCompletionsClient, TextGenerator};
use crate::analytics_service::AnalyticsService;
use crate::error::AppServicesError;
use crate::evaluation::EvaluationService;
use crate::interviews::InterviewService;
use crate::role_service::RoleService;

/// Assembles the app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    evaluation: Arc<EvaluationService>,
    interviews: Arc<InterviewService>,
    analytics: Arc<AnalyticsService>,
    activity: Arc<ActivityService>,
    roles: Arc<RoleService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// Without an `AiConfig` every answer is scored by the heuristic evaluator and
    /// questions come from the static bank.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        ai: Option<AiConfig>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let generator = ai.map(|config| {
            tracing::info!(model = %config.model, base_url = %config.base_url, "AI provider enabled");
            Arc::new(ChatCompletionsClient::new(config)) as Arc<dyn TextGenerator>
        });
        Ok(Self::from_storage(&storage, clock, generator))
    }

    /// Build services over in-memory storage.
    #[must_use]
    pub fn in_memory(clock: Clock, generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self::from_storage(&Storage::in_memory(), clock, generator)
    }

    #[must_use]
    pub fn from_storage(
        storage: &Storage,
        clock: Clock,
        generator: Option<Arc<dyn TextGenerator>>,
    ) -> Self {
        let gateway =
            generator.map(|generator| AiGateway::new(generator, Arc::clone(&storage.roles)));
        let evaluation = Arc::new(EvaluationService::new(gateway));
        let interviews = Arc::new(InterviewService::new(
            clock,
            Arc::clone(&storage.sessions),
            Arc::clone(&storage.activities),
            Arc::clone(&evaluation),
        ));
        let analytics = Arc::new(AnalyticsService::new(
            clock,
            Arc::clone(&storage.sessions),
            Arc::clone(&storage.activities),
        ));
        let activity = Arc::new(ActivityService::new(clock, Arc::clone(&storage.activities)));
        let roles = Arc::new(RoleService::new(Arc::clone(&storage.roles)));

        Self {
            evaluation,
            interviews,
            analytics,
            activity,
            roles,
        }
    }

    #[must_use]
    pub fn evaluation(&self) -> Arc<EvaluationService> {
        Arc::clone(&self.evaluation)
    }

    #[must_use]
    pub fn interviews(&self) -> Arc<InterviewService> {
        Arc::clone(&self.interviews)
    }

    #[must_use]
    pub fn analytics(&self) -> Arc<AnalyticsService> {
        Arc::clone(&self.analytics)
    }

    #[must_use]
    pub fn activity(&self) -> Arc<ActivityService> {
        Arc::clone(&self.activity)
    }

    #[must_use]
    pub fn roles(&self) -> Arc<RoleService> {
        Arc::clone(&self.roles)
    }
}
