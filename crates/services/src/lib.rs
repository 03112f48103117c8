#![forbid(unsafe_code)]

pub mod activity_service;
pub mod ai;
pub mod analytics_service;
pub mod app_services;
pub mod error;
pub mod evaluation;
pub mod interviews;
pub mod paging;
pub mod role_service;

pub use interview_core::Clock;

pub use activity_service::{ActivityListRequest, ActivityLog, ActivityService};
pub use analytics_service::AnalyticsService;
pub use app_services::AppServices;
pub use error::{
    ActivityError, AnalyticsError, AppServicesError, GatewayError, InterviewError,
    RoleServiceError,
};
pub use evaluation::EvaluationService;
pub use interviews::InterviewService;
pub use role_service::RoleService;
