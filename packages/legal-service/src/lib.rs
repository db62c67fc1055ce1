pub mod activity;
pub mod cases;
pub mod clients;
pub mod directories;
pub mod dispatch;
pub mod documents;
pub mod drafting;
pub mod pagination;
pub mod rate_limit;
pub mod research;
pub mod secrets;
pub mod settings;
pub mod time_serde;
pub mod users;

mod error;
mod validate;

pub use activity::{ActivityEntry, ActivityKind, ActivityLog, ActivityView};
pub use cases::{CaseView, CreateCaseRequest, UpdateCaseRequest};
pub use clients::{ClientView, CreateClientRequest, UpdateClientRequest};
pub use directories::{
	CreateDirectoryRequest, CreateSubdirectoryRequest, DirectoryView, SubdirectoryView,
};
pub use dispatch::{Dispatched, ModelPreference};
pub use documents::{DocumentView, RegisterDocumentRequest};
pub use drafting::{
	CaseAnalysisRequest, CaseAnalysisResponse, CaseDraftRequest, CaseDraftResponse, CatalogueEntry,
	ExplainRequest, ExplainResponse, JuniorRequest, JuniorResponse, Parties, PropertyOpinionRequest,
	PropertyOpinionResponse, ReviewRequest, ReviewResponse,
};
pub use error::{Error, FieldError, Result};
pub use pagination::{PageMeta, PageRequest, Paged};
pub use rate_limit::RateLimiter;
pub use research::{NewResearch, ResearchRecord, ResearchRequest, ResearchResponse};
pub use settings::{SettingView, UpsertSettingRequest};
pub use users::{UpdateProfileRequest, UserView};

use std::{future::Future, pin::Pin, sync::Arc};

use legal_config::{Config, DeepSeekProviderConfig, InLegalBertProviderConfig};
use legal_providers::{Completion, deepseek, inlegalbert};
use legal_storage::db::Db;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Chat-completion provider. Failures are fatal to the request.
pub trait DeepSeekProvider
where
	Self: Send + Sync,
{
	fn complete<'a>(
		&'a self,
		cfg: &'a DeepSeekProviderConfig,
		api_key: Option<&'a str>,
		prompt: &'a str,
	) -> BoxFuture<'a, legal_providers::Result<Completion>>;
}

/// Classification provider. Never fails: problems surface as an empty completion.
pub trait InLegalBertProvider
where
	Self: Send + Sync,
{
	fn infer<'a>(
		&'a self,
		cfg: &'a InLegalBertProviderConfig,
		api_key: Option<&'a str>,
		inputs: &'a str,
	) -> BoxFuture<'a, Completion>;
}

#[derive(Clone)]
pub struct Providers {
	pub deepseek: Arc<dyn DeepSeekProvider>,
	pub inlegalbert: Arc<dyn InLegalBertProvider>,
}
impl Providers {
	pub fn new(
		deepseek: Arc<dyn DeepSeekProvider>,
		inlegalbert: Arc<dyn InLegalBertProvider>,
	) -> Self {
		Self { deepseek, inlegalbert }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { deepseek: provider.clone(), inlegalbert: provider }
	}
}

/// The resolved identity a request acts as.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Caller {
	pub user_id: String,
	pub role: String,
}
impl Caller {
	pub fn is_admin(&self) -> bool {
		self.role == "admin"
	}
}

pub struct LegalService {
	pub cfg: Config,
	pub db: Db,
	pub providers: Providers,
	pub rate_limiter: RateLimiter,
	pub activity: ActivityLog,
}
impl LegalService {
	pub fn new(cfg: Config, db: Db) -> Self {
		Self::with_providers(cfg, db, Providers::default())
	}

	pub fn with_providers(cfg: Config, db: Db, providers: Providers) -> Self {
		let rate_limiter = RateLimiter::from_config(&cfg.rate_limit);
		let activity = ActivityLog::new(db.clone());

		Self { cfg, db, providers, rate_limiter, activity }
	}
}

struct DefaultProviders;
impl DeepSeekProvider for DefaultProviders {
	fn complete<'a>(
		&'a self,
		cfg: &'a DeepSeekProviderConfig,
		api_key: Option<&'a str>,
		prompt: &'a str,
	) -> BoxFuture<'a, legal_providers::Result<Completion>> {
		Box::pin(deepseek::complete(cfg, api_key, prompt))
	}
}
impl InLegalBertProvider for DefaultProviders {
	fn infer<'a>(
		&'a self,
		cfg: &'a InLegalBertProviderConfig,
		api_key: Option<&'a str>,
		inputs: &'a str,
	) -> BoxFuture<'a, Completion> {
		Box::pin(inlegalbert::infer(cfg, api_key, inputs))
	}
}

/// Owner check shared by every owner-scoped resource. Admins may act on any row.
pub(crate) fn ensure_owner(caller: &Caller, owner_id: &str, resource: &str) -> Result<()> {
	if caller.is_admin() || caller.user_id == owner_id {
		Ok(())
	} else {
		Err(Error::Forbidden { message: format!("{resource} belongs to another user.") })
	}
}
