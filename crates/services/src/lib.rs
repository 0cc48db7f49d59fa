#![forbid(unsafe_code)]

pub mod aggregator;
pub mod answer_service;
pub mod app_services;
pub mod catalog_service;
pub mod dashboard;
pub mod error;
pub mod membership;

#[cfg(test)]
mod test_support;

pub use vocab_core::{Clock, ProgressConfig};

pub use aggregator::ProgressAggregator;
pub use answer_service::AnswerService;
pub use app_services::AppServices;
pub use catalog_service::{
    CreatedList, ListCatalog, ListCatalogService, ListDetail, VocabularyPage, WORDS_PER_PAGE,
    WordProgress,
};
pub use dashboard::DashboardService;
pub use error::{AnswerError, AppServicesError, CatalogError, MembershipError, ProgressError};
pub use membership::ActiveListResolver;
