use std::sync::{
	Arc, Mutex,
	atomic::{AtomicUsize, Ordering},
};

use serde_json::Map;
use time::OffsetDateTime;

use legal_config::{
	Config, DeepSeekProviderConfig, InLegalBertProviderConfig, RateLimit, Research, Security,
	Service, Sqlite, Storage,
};
use legal_providers::Completion;
use legal_service::{
	ActivityEntry, ActivityKind, BoxFuture, Caller, CreateCaseRequest, CreateClientRequest,
	CreateDirectoryRequest, CreateSubdirectoryRequest, DeepSeekProvider, Error, InLegalBertProvider,
	LegalService, ModelPreference, NewResearch, PageRequest, Providers, RegisterDocumentRequest,
	ResearchRequest, UpdateCaseRequest, UpsertSettingRequest,
};
use legal_storage::{db::Db, ids, models::User, research, users};
use legal_testkit::TestDatabase;

const DEEPSEEK_ANSWER: &str = "Section 6 of the Specific Relief Act allows recovery of possession.";

struct SpyDeepSeek {
	calls: Arc<AtomicUsize>,
	last_prompt: Mutex<Option<String>>,
}
impl SpyDeepSeek {
	fn new() -> Self {
		Self { calls: Arc::new(AtomicUsize::new(0)), last_prompt: Mutex::new(None) }
	}

	fn count(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	fn last_prompt(&self) -> Option<String> {
		self.last_prompt.lock().expect("Failed to lock prompt.").clone()
	}
}
impl DeepSeekProvider for SpyDeepSeek {
	fn complete<'a>(
		&'a self,
		_cfg: &'a DeepSeekProviderConfig,
		_api_key: Option<&'a str>,
		prompt: &'a str,
	) -> BoxFuture<'a, legal_providers::Result<Completion>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		*self.last_prompt.lock().expect("Failed to lock prompt.") = Some(prompt.to_string());

		Box::pin(async move {
			Ok(Completion { text: DEEPSEEK_ANSWER.to_string(), confidence: 0.85 })
		})
	}
}

struct SpyInLegalBert {
	calls: Arc<AtomicUsize>,
	reply: Completion,
}
impl SpyInLegalBert {
	fn replying(text: &str, confidence: f64) -> Self {
		Self {
			calls: Arc::new(AtomicUsize::new(0)),
			reply: Completion { text: text.to_string(), confidence },
		}
	}

	fn count(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl InLegalBertProvider for SpyInLegalBert {
	fn infer<'a>(
		&'a self,
		_cfg: &'a InLegalBertProviderConfig,
		_api_key: Option<&'a str>,
		_inputs: &'a str,
	) -> BoxFuture<'a, Completion> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		let reply = self.reply.clone();

		Box::pin(async move { reply })
	}
}

struct Harness {
	service: LegalService,
	deepseek: Arc<SpyDeepSeek>,
	inlegalbert: Arc<SpyInLegalBert>,
	_test_db: TestDatabase,
}

fn test_config(test_db: &TestDatabase) -> Config {
	let secret_suffix = test_db.name().to_uppercase();

	Config {
		service: Service {
			http_bind: "127.0.0.1:0".to_string(),
			log_level: "info".to_string(),
			environment: "development".to_string(),
		},
		storage: Storage {
			sqlite: Sqlite { path: test_db.path_str(), pool_max_conns: 2, busy_timeout_ms: 5_000 },
		},
		providers: legal_config::Providers {
			deepseek: DeepSeekProviderConfig {
				api_base: "http://127.0.0.1:9".to_string(),
				path: "/chat/completions".to_string(),
				model: "deepseek-chat".to_string(),
				temperature: 0.3,
				system_prompt: "You are a legal assistant.".to_string(),
				secret_key: format!("DEEPSEEK_KEY_{secret_suffix}"),
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
			inlegalbert: InLegalBertProviderConfig {
				api_base: "http://127.0.0.1:9".to_string(),
				path: "/models/law-ai/InLegalBERT".to_string(),
				secret_key: format!("HF_KEY_{secret_suffix}"),
				wait_for_model: true,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
		},
		research: Research {
			confidence_threshold: 0.6,
			min_query_chars: 3,
			max_query_chars: 5_000,
			base_prompt: "Configured base prompt.".to_string(),
		},
		rate_limit: RateLimit { enabled: false, max_requests: 100, window_seconds: 60 },
		security: Security { auth_mode: "off".to_string(), auth_keys: vec![] },
	}
}

async fn open_db(cfg: &Config) -> Db {
	let db = Db::connect(&cfg.storage.sqlite).await.expect("Failed to open SQLite database.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	db
}

async fn harness(inlegalbert: SpyInLegalBert) -> Harness {
	let test_db = TestDatabase::new().expect("Failed to create test database.");
	let cfg = test_config(&test_db);
	let db = open_db(&cfg).await;
	let deepseek = Arc::new(SpyDeepSeek::new());
	let inlegalbert = Arc::new(inlegalbert);
	let providers = Providers::new(deepseek.clone(), inlegalbert.clone());
	let service = LegalService::with_providers(cfg, db, providers);

	Harness { service, deepseek, inlegalbert, _test_db: test_db }
}

async fn seed_user(service: &LegalService, role: &str) -> Caller {
	let now = OffsetDateTime::now_utc();
	let id = ids::new_id(ids::USER);
	let user = User {
		id: id.clone(),
		name: "Meera Iyer".to_string(),
		email: format!("{id}@example.com"),
		password: None,
		phone: None,
		address: None,
		image: None,
		provider: None,
		role: role.to_string(),
		is_active: true,
		created_at: now,
		updated_at: now,
	};

	users::insert_user(&service.db, &user).await.expect("Failed to insert user.");

	service.resolve_caller(&id).await.expect("Failed to resolve caller.")
}

async fn store_setting(service: &LegalService, admin: &Caller, key: &str, value: &str) {
	let req = UpsertSettingRequest {
		value: value.to_string(),
		description: None,
		category: None,
		is_public: None,
	};

	service.upsert_setting(admin, key, req).await.expect("Failed to store setting.");
}

fn research_request(query: &str, model: ModelPreference) -> ResearchRequest {
	ResearchRequest {
		query: query.to_string(),
		model,
		client_id: None,
		case_id: None,
		save: false,
		tags: None,
	}
}

fn client_request(name: &str) -> CreateClientRequest {
	CreateClientRequest {
		name: name.to_string(),
		email: Some("client@example.com".to_string()),
		phone: "+91 98765 43210".to_string(),
		address: None,
		reference_id: None,
	}
}

#[tokio::test]
async fn deepseek_preference_never_calls_inlegalbert() {
	let h = harness(SpyInLegalBert::replying("Injunction", 0.99)).await;
	let dispatched = h
		.service
		.select_and_run("Explain adverse possession.", ModelPreference::DeepSeek)
		.await
		.expect("Failed to dispatch.");

	assert_eq!(dispatched.model, ModelPreference::DeepSeek);
	assert_eq!(dispatched.completion.text, DEEPSEEK_ANSWER);
	assert_eq!(h.deepseek.count(), 1);
	assert_eq!(h.inlegalbert.count(), 0);
}

#[tokio::test]
async fn low_confidence_answer_falls_back_to_deepseek_once() {
	let h = harness(SpyInLegalBert::replying("Tenancy", 0.4)).await;
	let dispatched = h
		.service
		.select_and_run("Can a landlord evict without notice?", ModelPreference::InLegalBert)
		.await
		.expect("Failed to dispatch.");

	assert_eq!(dispatched.model, ModelPreference::DeepSeek);
	assert_eq!(dispatched.completion.confidence, 0.85);
	assert_eq!(h.inlegalbert.count(), 1);
	assert_eq!(h.deepseek.count(), 1);
}

#[tokio::test]
async fn empty_answer_falls_back_even_with_high_confidence() {
	let h = harness(SpyInLegalBert::replying("", 0.95)).await;
	let dispatched = h
		.service
		.select_and_run("What is a caveat petition?", ModelPreference::InLegalBert)
		.await
		.expect("Failed to dispatch.");

	assert_eq!(dispatched.model, ModelPreference::DeepSeek);
	assert_eq!(h.deepseek.count(), 1);
}

#[tokio::test]
async fn accepted_answer_keeps_text_except_newline_runs() {
	let h = harness(SpyInLegalBert::replying(" Bail\n\n\n\nSection 437 CrPC \n", 0.6)).await;
	let dispatched = h
		.service
		.select_and_run("Bail in non-bailable offences", ModelPreference::InLegalBert)
		.await
		.expect("Failed to dispatch.");

	assert_eq!(dispatched.model, ModelPreference::InLegalBert);
	assert_eq!(dispatched.completion.text, " Bail\n\nSection 437 CrPC \n");
	assert_eq!(dispatched.completion.confidence, 0.6);
	assert_eq!(h.deepseek.count(), 0);
}

#[tokio::test]
async fn research_prompt_uses_stored_base_prompt() {
	let h = harness(SpyInLegalBert::replying("", 0.0)).await;
	let response = h
		.service
		.research(None, research_request("  My property was encroached  ", ModelPreference::DeepSeek))
		.await
		.expect("Failed to run research.");
	let prompt = h.deepseek.last_prompt().expect("DeepSeek must receive a prompt.");

	assert!(prompt.starts_with("You are an expert Indian legal research assistant."));
	assert!(prompt.ends_with("\n\nUser query: My property was encroached"));
	assert_eq!(response.query, "My property was encroached");
	assert_eq!(response.confidence, 0.85);
	assert!(response.id.is_none());
}

#[tokio::test]
async fn research_falls_back_to_configured_prompt_when_setting_blank() {
	let h = harness(SpyInLegalBert::replying("", 0.0)).await;
	let admin = seed_user(&h.service, "admin").await;

	h.service
		.upsert_setting(
			&admin,
			"PROMPT_BASE",
			UpsertSettingRequest {
				value: "   ".to_string(),
				description: None,
				category: None,
				is_public: None,
			},
		)
		.await
		.expect("Failed to blank PROMPT_BASE.");
	h.service
		.research(None, research_request("Partition suit", ModelPreference::DeepSeek))
		.await
		.expect("Failed to run research.");

	let prompt = h.deepseek.last_prompt().expect("DeepSeek must receive a prompt.");

	assert_eq!(prompt, "Configured base prompt.\n\nUser query: Partition suit");
}

#[tokio::test]
async fn saved_research_reads_back_with_raw_query() {
	let h = harness(SpyInLegalBert::replying("", 0.0)).await;
	let caller = seed_user(&h.service, "lawyer").await;
	let client = h
		.service
		.create_client(&caller, client_request("Kapoor Textiles"))
		.await
		.expect("Failed to create client.");
	let mut req = research_request("Recovery of dues under MSMED Act", ModelPreference::DeepSeek);

	req.save = true;
	req.client_id = Some(client.id.clone());
	req.tags = Some(vec![" msme ".to_string()]);

	let response = h.service.research(Some(&caller), req).await.expect("Failed to run research.");
	let id = response.id.expect("Saved research must return an id.");
	let record = h.service.research_record(&caller, &id).await.expect("Failed to read record.");

	assert!(id.starts_with("rq_"));
	assert_eq!(record.query_text, "Recovery of dues under MSMED Act");
	assert_eq!(record.response_text, DEEPSEEK_ANSWER);
	assert_eq!(record.model, "deepseek");
	assert_eq!(record.status, "completed");
	assert_eq!(record.client_id.as_deref(), Some(client.id.as_str()));
	assert_eq!(record.tags, vec!["msme".to_string()]);

	let history = h
		.service
		.research_history(&caller, PageRequest::default())
		.await
		.expect("Failed to list history.");
	let by_client = h
		.service
		.client_research(&caller, &client.id, PageRequest::default())
		.await
		.expect("Failed to list client research.");

	assert_eq!(history.pagination.total, 1);
	assert_eq!(by_client.items[0].id, id);
}

#[tokio::test]
async fn fallback_keeps_the_requested_model_on_response_and_record() {
	let h = harness(SpyInLegalBert::replying("Easement", 0.4)).await;
	let caller = seed_user(&h.service, "lawyer").await;
	let mut req =
		research_request("Right of way over a neighbour's land", ModelPreference::InLegalBert);

	req.save = true;

	let response = h.service.research(Some(&caller), req).await.expect("Failed to run research.");
	let id = response.id.clone().expect("Saved research must return an id.");
	let record = h.service.research_record(&caller, &id).await.expect("Failed to read record.");

	assert_eq!(response.model, ModelPreference::InLegalBert);
	assert_eq!(response.answered_by, ModelPreference::DeepSeek);
	assert_eq!(response.result, DEEPSEEK_ANSWER);
	assert_eq!(record.model, "inlegalbert");
	assert_eq!(h.deepseek.count(), 1);
}

#[tokio::test]
async fn persistence_writer_round_trips_without_owners() {
	let h = harness(SpyInLegalBert::replying("", 0.0)).await;
	let stored = h
		.service
		.save_research(NewResearch::new("What is a lok adalat?", "An alternate dispute forum."))
		.await
		.expect("Failed to save research.");
	let row = research::get_research_query(&h.service.db, &stored.id)
		.await
		.expect("Failed to read research.")
		.expect("Saved research must exist.");

	assert_eq!(row.query_text, "What is a lok adalat?");
	assert_eq!(row.response_text, "An alternate dispute forum.");
	assert!(row.user_id.is_none());

	let empty = h.service.save_research(NewResearch::new("Blank", "  ")).await;

	assert!(matches!(empty, Err(Error::Validation { .. })));
}

#[tokio::test]
async fn saving_without_caller_is_unauthorized() {
	let h = harness(SpyInLegalBert::replying("", 0.0)).await;
	let mut req = research_request("Stamp duty on gift deed", ModelPreference::DeepSeek);

	req.save = true;

	let result = h.service.research(None, req).await;

	assert!(matches!(result, Err(Error::Unauthorized { .. })));
	assert_eq!(h.deepseek.count(), 0);
}

#[tokio::test]
async fn query_length_is_validated_before_any_call() {
	let h = harness(SpyInLegalBert::replying("", 0.0)).await;
	let short = h.service.research(None, research_request(" ab ", ModelPreference::DeepSeek)).await;
	let long = h
		.service
		.research(None, research_request(&"x".repeat(5_001), ModelPreference::DeepSeek))
		.await;

	assert!(matches!(short, Err(Error::Validation { .. })));
	assert!(matches!(long, Err(Error::Validation { .. })));
	assert_eq!(h.deepseek.count(), 0);
}

#[tokio::test]
async fn research_against_foreign_client_is_forbidden() {
	let h = harness(SpyInLegalBert::replying("", 0.0)).await;
	let owner = seed_user(&h.service, "lawyer").await;
	let other = seed_user(&h.service, "lawyer").await;
	let client = h
		.service
		.create_client(&owner, client_request("Bose Estates"))
		.await
		.expect("Failed to create client.");
	let mut req = research_request("Mutation of land records", ModelPreference::DeepSeek);

	req.client_id = Some(client.id);

	let result = h.service.research(Some(&other), req).await;

	assert!(matches!(result, Err(Error::Forbidden { .. })));
	assert_eq!(h.deepseek.count(), 0);
}

#[tokio::test]
async fn activity_failure_never_fails_the_operation() {
	let h = harness(SpyInLegalBert::replying("", 0.0)).await;
	let ghost = Caller { user_id: "user_missing".to_string(), role: "lawyer".to_string() };
	let response = h
		.service
		.research(
			Some(&ghost),
			research_request("Limitation for cheque bounce", ModelPreference::DeepSeek),
		)
		.await
		.expect("Research must succeed even when activity logging fails.");

	h.service
		.activity
		.record(ActivityEntry::new(ActivityKind::Research, "query", "Orphan entry", &ghost.user_id))
		.await;

	let logged = h
		.service
		.list_activities(&ghost, PageRequest::default())
		.await
		.expect("Failed to list activities.");

	assert_eq!(response.result, DEEPSEEK_ANSWER);
	assert_eq!(logged.pagination.total, 0);
}

#[tokio::test]
async fn emitted_activity_lists_for_its_user() {
	let h = harness(SpyInLegalBert::replying("", 0.0)).await;
	let caller = seed_user(&h.service, "lawyer").await;
	let other = seed_user(&h.service, "lawyer").await;

	h.service
		.activity
		.emit(
			ActivityEntry::new(ActivityKind::Case, "hearing", "Hearing listed", &caller.user_id)
				.metadata(serde_json::json!({ "court": "Bombay High Court" })),
		)
		.await
		.expect("Activity task panicked.");

	let mine = h
		.service
		.list_activities(&caller, PageRequest::default())
		.await
		.expect("Failed to list activities.");
	let theirs = h
		.service
		.list_activities(&other, PageRequest::default())
		.await
		.expect("Failed to list activities.");

	assert_eq!(mine.pagination.total, 1);
	assert_eq!(mine.items[0].activity_type, "case");
	assert_eq!(
		mine.items[0].metadata.as_ref().and_then(|meta| meta["court"].as_str()),
		Some("Bombay High Court")
	);
	assert_eq!(theirs.pagination.total, 0);
}

#[tokio::test]
async fn missing_deepseek_key_surfaces_as_ai_error() {
	let test_db = TestDatabase::new().expect("Failed to create test database.");
	let cfg = test_config(&test_db);
	let db = open_db(&cfg).await;
	let service = LegalService::new(cfg, db);
	let result = service
		.research(None, research_request("Grounds for divorce", ModelPreference::DeepSeek))
		.await;
	let Err(err) = result else {
		panic!("Expected DeepSeek to be unconfigured.");
	};

	assert!(matches!(err, Error::Ai { .. }));
	assert_eq!(err.to_string(), "AI service error: DeepSeek API key not configured.");
}

#[tokio::test]
async fn soft_deleted_client_disappears_but_keeps_research_link() {
	let h = harness(SpyInLegalBert::replying("", 0.0)).await;
	let caller = seed_user(&h.service, "lawyer").await;
	let client = h
		.service
		.create_client(&caller, client_request("Nair & Sons"))
		.await
		.expect("Failed to create client.");
	let mut req = research_request("Partnership dissolution", ModelPreference::DeepSeek);

	req.save = true;
	req.client_id = Some(client.id.clone());

	let id = h
		.service
		.research(Some(&caller), req)
		.await
		.expect("Failed to run research.")
		.id
		.expect("Saved research must return an id.");

	h.service.delete_client(&caller, &client.id).await.expect("Failed to delete client.");

	let listed = h
		.service
		.list_clients(&caller, PageRequest::default())
		.await
		.expect("Failed to list clients.");
	let fetched = h.service.get_client(&caller, &client.id).await;
	let record = h.service.research_record(&caller, &id).await.expect("Failed to read record.");

	assert_eq!(listed.pagination.total, 0);
	assert!(matches!(fetched, Err(Error::NotFound { .. })));
	assert_eq!(record.client_id.as_deref(), Some(client.id.as_str()));
}

#[tokio::test]
async fn client_validation_reports_every_field() {
	let h = harness(SpyInLegalBert::replying("", 0.0)).await;
	let caller = seed_user(&h.service, "lawyer").await;
	let result = h
		.service
		.create_client(
			&caller,
			CreateClientRequest {
				name: " ".to_string(),
				email: Some("nope".to_string()),
				phone: "12345".to_string(),
				address: None,
				reference_id: None,
			},
		)
		.await;
	let Err(Error::Validation { details }) = result else {
		panic!("Expected validation failure.");
	};
	let fields = details.iter().map(|detail| detail.field.as_str()).collect::<Vec<_>>();

	assert_eq!(fields, vec!["name", "phone", "email"]);
}

#[tokio::test]
async fn cases_follow_their_assignee() {
	let h = harness(SpyInLegalBert::replying("", 0.0)).await;
	let caller = seed_user(&h.service, "lawyer").await;
	let other = seed_user(&h.service, "lawyer").await;
	let client = h
		.service
		.create_client(&caller, client_request("Rathore Logistics"))
		.await
		.expect("Failed to create client.");
	let bad_date = h
		.service
		.create_case(
			&caller,
			CreateCaseRequest {
				title: "Arbitration".to_string(),
				client_id: client.id.clone(),
				start_date: "15-01-2026".to_string(),
				description: None,
				case_number: None,
				court: None,
				status: None,
				priority: None,
				end_date: None,
				tags: None,
			},
		)
		.await;

	assert!(matches!(bad_date, Err(Error::Validation { .. })));

	let case = h
		.service
		.create_case(
			&caller,
			CreateCaseRequest {
				title: "Arbitration under Section 11".to_string(),
				client_id: client.id.clone(),
				start_date: "2026-01-15T10:00:00Z".to_string(),
				description: None,
				case_number: Some("ARB/12/2026".to_string()),
				court: Some("Delhi High Court".to_string()),
				status: None,
				priority: Some("high".to_string()),
				end_date: None,
				tags: Some(vec!["arbitration".to_string()]),
			},
		)
		.await
		.expect("Failed to create case.");

	assert_eq!(case.status, "active");

	let updated = h
		.service
		.update_case(
			&caller,
			&case.id,
			UpdateCaseRequest {
				status: Some("closed".to_string()),
				end_date: Some("2026-06-01T00:00:00Z".to_string()),
				..Default::default()
			},
		)
		.await
		.expect("Failed to update case.");
	let foreign = h.service.get_case(&other, &case.id).await;

	assert_eq!(updated.status, "closed");
	assert!(updated.end_date.is_some());
	assert_eq!(updated.priority, "high");
	assert!(matches!(foreign, Err(Error::Forbidden { .. })));
}

#[tokio::test]
async fn directory_tree_is_scoped_to_the_client_owner() {
	let h = harness(SpyInLegalBert::replying("", 0.0)).await;
	let owner = seed_user(&h.service, "lawyer").await;
	let stranger = seed_user(&h.service, "lawyer").await;
	let client = h
		.service
		.create_client(&owner, client_request("Kapoor Estates"))
		.await
		.expect("Failed to create client.");
	let directory = h
		.service
		.create_directory(
			&owner,
			&client.id,
			CreateDirectoryRequest {
				name: " Pleadings ".to_string(),
				description: Some("  ".to_string()),
			},
		)
		.await
		.expect("Failed to create directory.");
	let subdirectory = h
		.service
		.create_subdirectory(
			&owner,
			&directory.id,
			CreateSubdirectoryRequest { name: "Drafts".to_string(), description: None },
		)
		.await
		.expect("Failed to create subdirectory.");
	let document = h
		.service
		.register_document(
			&owner,
			RegisterDocumentRequest {
				name: "plaint.docx".to_string(),
				document_type: "docx".to_string(),
				size: 4_096,
				path: "uploads/plaint.docx".to_string(),
				client_id: Some(client.id.clone()),
				directory_id: Some(directory.id.clone()),
				subdirectory_id: Some(subdirectory.id.clone()),
			},
		)
		.await
		.expect("Failed to register document.");

	assert_eq!(directory.name, "Pleadings");
	assert_eq!(directory.description, None);
	assert_eq!(document.subdirectory_id.as_deref(), Some(subdirectory.id.as_str()));

	let foreign = h.service.list_directories(&stranger, &client.id).await;
	let foreign_sub = h
		.service
		.create_subdirectory(
			&stranger,
			&directory.id,
			CreateSubdirectoryRequest { name: "Mine".to_string(), description: None },
		)
		.await;

	assert!(matches!(foreign, Err(Error::Forbidden { .. })));
	assert!(matches!(foreign_sub, Err(Error::Forbidden { .. })));

	let subdirectories = h
		.service
		.list_subdirectories(&owner, &directory.id)
		.await
		.expect("Failed to list subdirectories.");

	assert_eq!(subdirectories.len(), 1);

	h.service.delete_directory(&owner, &directory.id).await.expect("Failed to delete directory.");

	let remaining =
		h.service.list_directories(&owner, &client.id).await.expect("Failed to list directories.");
	let documents = h
		.service
		.list_client_documents(&owner, &client.id, PageRequest::default())
		.await
		.expect("Failed to list documents.");

	assert!(remaining.is_empty());
	assert_eq!(documents.pagination.total, 1);
	assert!(matches!(
		h.service.list_subdirectories(&owner, &directory.id).await,
		Err(Error::NotFound { .. })
	));
}

#[tokio::test]
async fn runtime_settings_tune_request_limits() {
	let h = harness(SpyInLegalBert::replying("", 0.0)).await;
	let admin = seed_user(&h.service, "admin").await;
	let long_query = "Specific performance of sale";

	store_setting(&h.service, &admin, "MAX_RESEARCH_LENGTH", "20").await;
	store_setting(&h.service, &admin, "DEFAULT_PAGE_SIZE", "1").await;
	store_setting(&h.service, &admin, "ALLOWED_FILE_TYPES", "pdf").await;

	let too_long =
		h.service.research(None, research_request(long_query, ModelPreference::DeepSeek)).await;
	let short =
		h.service.research(None, research_request("Stamp duty", ModelPreference::DeepSeek)).await;

	assert!(matches!(too_long, Err(Error::Validation { .. })));
	assert!(short.is_ok());

	for name in ["Rao Holdings", "Shah Metals"] {
		h.service.create_client(&admin, client_request(name)).await.expect("Failed to create.");
	}

	let listed = h
		.service
		.list_clients(&admin, PageRequest::default())
		.await
		.expect("Failed to list clients.");

	assert_eq!(listed.items.len(), 1);
	assert_eq!(listed.pagination.limit, 1);
	assert_eq!(listed.pagination.total_pages, 2);

	let document = |name: &str| RegisterDocumentRequest {
		name: name.to_string(),
		document_type: "txt".to_string(),
		size: 128,
		path: format!("uploads/{name}"),
		client_id: None,
		directory_id: None,
		subdirectory_id: None,
	};
	let rejected = h.service.register_document(&admin, document("notes.txt")).await;

	assert!(matches!(rejected, Err(Error::Validation { .. })));
	assert!(h.service.register_document(&admin, document("brief.pdf")).await.is_ok());

	store_setting(&h.service, &admin, "MAX_RESEARCH_LENGTH", "2").await;

	let fallback =
		h.service.research(None, research_request(long_query, ModelPreference::DeepSeek)).await;

	assert!(fallback.is_ok(), "An out-of-range bound must fall back to the configured maximum.");
}

#[tokio::test]
async fn document_size_is_capped_by_setting() {
	let h = harness(SpyInLegalBert::replying("", 0.0)).await;
	let caller = seed_user(&h.service, "lawyer").await;
	let request = |size: i64| RegisterDocumentRequest {
		name: "vakalatnama.pdf".to_string(),
		document_type: "pdf".to_string(),
		size,
		path: "uploads/vakalatnama.pdf".to_string(),
		client_id: None,
		directory_id: None,
		subdirectory_id: None,
	};
	let too_big = h.service.register_document(&caller, request(10_485_761)).await;
	let document = h
		.service
		.register_document(&caller, request(2_048))
		.await
		.expect("Failed to register document.");

	assert!(matches!(too_big, Err(Error::Validation { .. })));
	assert!(document.id.starts_with("doc_"));

	h.service.delete_document(&caller, &document.id).await.expect("Failed to delete document.");

	let again = h.service.delete_document(&caller, &document.id).await;

	assert!(matches!(again, Err(Error::NotFound { .. })));
}

#[tokio::test]
async fn private_settings_are_admin_only() {
	let h = harness(SpyInLegalBert::replying("", 0.0)).await;
	let lawyer = seed_user(&h.service, "lawyer").await;
	let admin = seed_user(&h.service, "admin").await;
	let secret = h.service.get_setting(&lawyer, "DEEPSEEK_API_KEY").await;
	let public = h.service.get_setting(&lawyer, "MAX_FILE_SIZE").await.expect("Failed to read.");
	let visible = h.service.list_settings(&lawyer).await.expect("Failed to list settings.");
	let denied = h
		.service
		.upsert_setting(
			&lawyer,
			"DEFAULT_PAGE_SIZE",
			UpsertSettingRequest {
				value: "50".to_string(),
				description: None,
				category: None,
				is_public: None,
			},
		)
		.await;

	assert!(matches!(secret, Err(Error::Forbidden { .. })));
	assert_eq!(public.value, "10485760");
	assert!(visible.iter().all(|setting| setting.is_public));
	assert!(matches!(denied, Err(Error::Forbidden { .. })));
	assert!(h.service.get_setting(&admin, "DEEPSEEK_API_KEY").await.is_ok());
}

#[tokio::test]
async fn stored_secret_reaches_the_provider_lookup() {
	let h = harness(SpyInLegalBert::replying("", 0.0)).await;
	let admin = seed_user(&h.service, "admin").await;
	let key = h.service.cfg.providers.deepseek.secret_key.clone();

	assert_eq!(h.service.resolve_secret(&key).await, None);

	h.service
		.upsert_setting(
			&admin,
			&key,
			UpsertSettingRequest {
				value: " sk-live ".to_string(),
				description: None,
				category: Some("ai".to_string()),
				is_public: Some(false),
			},
		)
		.await
		.expect("Failed to store secret.");

	assert_eq!(h.service.resolve_secret(&key).await.as_deref(), Some("sk-live"));
}
