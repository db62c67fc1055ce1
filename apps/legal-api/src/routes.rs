use std::time::Instant;

use axum::{
	Extension, Json, Router,
	extract::{
		Path, Query, Request, State,
		rejection::{JsonRejection, QueryRejection},
	},
	http::{HeaderMap, HeaderValue, StatusCode, header},
	middleware::{self, Next},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;
use serde_json::{Value, json};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::state::{AppState, AuthMode};
use legal_service::{
	ActivityView, Caller, CaseAnalysisRequest, CaseAnalysisResponse, CaseDraftRequest,
	CaseDraftResponse, CaseView, CatalogueEntry, ClientView, CreateCaseRequest,
	CreateClientRequest, CreateDirectoryRequest, CreateSubdirectoryRequest, DirectoryView,
	DocumentView, Error, ExplainRequest, ExplainResponse, FieldError, JuniorRequest,
	JuniorResponse, PageMeta, PageRequest, Paged, PropertyOpinionRequest, PropertyOpinionResponse,
	RegisterDocumentRequest, ResearchRecord, ResearchRequest, ResearchResponse, ReviewRequest,
	ReviewResponse, SettingView, SubdirectoryView, UpdateCaseRequest, UpdateClientRequest,
	UpdateProfileRequest, UpsertSettingRequest, UserView,
};

pub const HEADER_USER_ID: &str = "x-legal-user-id";
const HEADER_FORWARDED_FOR: &str = "x-forwarded-for";

type ApiResult<T> = Result<Json<Envelope<T>>, ApiError>;

pub fn router(state: AppState) -> Router {
	let ai = Router::new()
		.route("/research", post(research))
		.route("/case/analyze", post(analyze_case))
		.route("/case/draft", post(draft_case))
		.route("/junior", post(junior))
		.route("/junior/review", post(junior_review))
		.route("/junior/explain", post(junior_explain))
		.route("/property-opinion", post(property_opinion))
		.route_layer(middleware::from_fn_with_state(state.clone(), rate_limit));
	let api = Router::new()
		.route("/research/history", get(research_history))
		.route("/research/{id}", get(research_record))
		.route("/clients", get(list_clients).post(create_client))
		.route("/clients/{id}", get(get_client).put(update_client).delete(delete_client))
		.route("/clients/{id}/research", get(client_research))
		.route("/clients/{id}/directories", get(list_directories).post(create_directory))
		.route("/clients/{id}/documents", get(client_documents))
		.route("/directories/{id}", axum::routing::delete(delete_directory))
		.route(
			"/directories/{id}/subdirectories",
			get(list_subdirectories).post(create_subdirectory),
		)
		.route("/cases", get(list_cases).post(create_case))
		.route("/cases/{id}", get(get_case).put(update_case))
		.route("/documents", post(register_document))
		.route("/documents/{id}", axum::routing::delete(delete_document))
		.route("/users/me", get(get_me).put(update_me))
		.route("/activities", get(list_activities))
		.route("/settings", get(list_settings))
		.route("/settings/{key}", get(get_setting).put(upsert_setting))
		.merge(ai)
		.route_layer(middleware::from_fn_with_state(state.clone(), identify));
	let public = Router::new()
		.route("/", get(banner))
		.route("/health", get(health))
		.route("/case/templates", get(case_templates))
		.route("/junior/tasks", get(junior_tasks))
		.route("/property-opinion/templates", get(property_templates));

	Router::new()
		.merge(public)
		.merge(api)
		.fallback(not_found)
		.layer(middleware::from_fn(log_requests))
		.with_state(state)
}

/// Success envelope. Paginated lists put the items in `data` and the page info beside it.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
	success: bool,
	data: T,
	#[serde(skip_serializing_if = "Option::is_none")]
	pagination: Option<PageMeta>,
}
impl<T> Envelope<T> {
	fn data(data: T) -> Self {
		Self { success: true, data, pagination: None }
	}
}
impl<T> Envelope<Vec<T>> {
	fn paged(paged: Paged<T>) -> Self {
		Self { success: true, data: paged.items, pagination: Some(paged.pagination) }
	}
}

/// The caller resolved by `identify`; `None` for anonymous requests.
#[derive(Clone, Debug)]
pub struct Identity(pub Option<Caller>);
impl Identity {
	fn require(&self) -> Result<&Caller, ApiError> {
		self.0.as_ref().ok_or_else(|| {
			ApiError::new(StatusCode::UNAUTHORIZED, "unauthorized", "Authentication required.")
		})
	}
}

async fn identify(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
	match resolve_identity(&state, req.headers()).await {
		Ok(identity) => {
			req.extensions_mut().insert(identity);

			next.run(req).await
		},
		Err(err) => err.into_response(),
	}
}

async fn resolve_identity(state: &AppState, headers: &HeaderMap) -> Result<Identity, ApiError> {
	let user_id = match &state.auth {
		AuthMode::Off => header_str(headers, HEADER_USER_ID).map(str::to_string),
		AuthMode::StaticKeys { tokens } => {
			let token = read_bearer_token(headers).ok_or_else(|| {
				ApiError::new(
					StatusCode::UNAUTHORIZED,
					"unauthorized",
					"Authentication required for security.auth_mode=static_keys with a Bearer token.",
				)
			})?;
			let user_id = tokens.get(token).ok_or_else(|| {
				ApiError::new(StatusCode::UNAUTHORIZED, "unauthorized", "Invalid API token.")
			})?;

			Some(user_id.clone())
		},
	};
	let Some(user_id) = user_id else {
		return Ok(Identity(None));
	};
	let caller = state
		.service
		.resolve_caller(&user_id)
		.await
		.map_err(|err| ApiError::from_service(err, state.is_production()))?;

	Ok(Identity(Some(caller)))
}

async fn rate_limit(State(state): State<AppState>, req: Request, next: Next) -> Response {
	let key = rate_key(&req);

	if let Err(err) = state.service.rate_limiter.check(&key) {
		tracing::warn!(key = %key, path = %req.uri().path(), "Rate limit exceeded.");

		return ApiError::from_service(err, state.is_production()).into_response();
	}

	next.run(req).await
}

/// Caller id when known, else the first forwarded address, else a shared anonymous bucket.
fn rate_key(req: &Request) -> String {
	if let Some(Identity(Some(caller))) = req.extensions().get::<Identity>() {
		return format!("user:{}", caller.user_id);
	}

	header_str(req.headers(), HEADER_FORWARDED_FOR)
		.and_then(|raw| raw.split(',').next())
		.map(str::trim)
		.filter(|ip| !ip.is_empty())
		.map(|ip| format!("ip:{ip}"))
		.unwrap_or_else(|| "anonymous".to_string())
}

async fn log_requests(req: Request, next: Next) -> Response {
	let method = req.method().clone();
	let path = req.uri().path().to_string();
	let started = Instant::now();
	let response = next.run(req).await;
	let status = response.status().as_u16();
	let elapsed_ms = started.elapsed().as_millis() as u64;

	if status >= 500 {
		tracing::error!(%method, %path, status, elapsed_ms, "Request failed.");
	} else {
		tracing::info!(%method, %path, status, elapsed_ms, "Request handled.");
	}

	response
}

async fn banner() -> Json<Value> {
	Json(json!({
		"success": true,
		"message": "LegalIndia Backend API",
		"version": env!("CARGO_PKG_VERSION"),
		"status": "healthy",
		"timestamp": now_rfc3339(),
	}))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
	Json(json!({
		"success": true,
		"status": "healthy",
		"uptime": state.started_at.elapsed().as_secs_f64(),
		"timestamp": now_rfc3339(),
	}))
}

async fn not_found() -> ApiError {
	ApiError::new(StatusCode::NOT_FOUND, "not_found", "Endpoint not found")
}

async fn research(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	payload: Result<Json<ResearchRequest>, JsonRejection>,
) -> ApiResult<ResearchResponse> {
	let req = parse_body(payload)?;

	respond(&state, state.service.research(identity.0.as_ref(), req).await)
}

async fn research_history(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	query: Result<Query<PageRequest>, QueryRejection>,
) -> ApiResult<Vec<ResearchRecord>> {
	let caller = identity.require()?;
	let page = parse_page(query)?;

	respond_paged(&state, state.service.research_history(caller, page).await)
}

async fn research_record(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	Path(id): Path<String>,
) -> ApiResult<ResearchRecord> {
	let caller = identity.require()?;

	respond(&state, state.service.research_record(caller, &id).await)
}

async fn analyze_case(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	payload: Result<Json<CaseAnalysisRequest>, JsonRejection>,
) -> ApiResult<CaseAnalysisResponse> {
	let req = parse_body(payload)?;

	respond(&state, state.service.analyze_case(identity.0.as_ref(), req).await)
}

async fn draft_case(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	payload: Result<Json<CaseDraftRequest>, JsonRejection>,
) -> ApiResult<CaseDraftResponse> {
	let req = parse_body(payload)?;

	respond(&state, state.service.draft_case_document(identity.0.as_ref(), req).await)
}

async fn case_templates(State(state): State<AppState>) -> Json<Envelope<&'static [CatalogueEntry]>> {
	Json(Envelope::data(state.service.case_templates()))
}

async fn junior(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	payload: Result<Json<JuniorRequest>, JsonRejection>,
) -> ApiResult<JuniorResponse> {
	let req = parse_body(payload)?;

	respond(&state, state.service.junior_assist(identity.0.as_ref(), req).await)
}

async fn junior_review(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	payload: Result<Json<ReviewRequest>, JsonRejection>,
) -> ApiResult<ReviewResponse> {
	let req = parse_body(payload)?;

	respond(&state, state.service.junior_review(identity.0.as_ref(), req).await)
}

async fn junior_explain(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	payload: Result<Json<ExplainRequest>, JsonRejection>,
) -> ApiResult<ExplainResponse> {
	let req = parse_body(payload)?;

	respond(&state, state.service.junior_explain(identity.0.as_ref(), req).await)
}

async fn junior_tasks(State(state): State<AppState>) -> Json<Envelope<&'static [CatalogueEntry]>> {
	Json(Envelope::data(state.service.junior_tasks()))
}

async fn property_opinion(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	payload: Result<Json<PropertyOpinionRequest>, JsonRejection>,
) -> ApiResult<PropertyOpinionResponse> {
	let req = parse_body(payload)?;

	respond(&state, state.service.property_opinion(identity.0.as_ref(), req).await)
}

async fn property_templates(
	State(state): State<AppState>,
) -> Json<Envelope<&'static [CatalogueEntry]>> {
	Json(Envelope::data(state.service.property_templates()))
}

async fn list_clients(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	query: Result<Query<PageRequest>, QueryRejection>,
) -> ApiResult<Vec<ClientView>> {
	let caller = identity.require()?;
	let page = parse_page(query)?;

	respond_paged(&state, state.service.list_clients(caller, page).await)
}

async fn create_client(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	payload: Result<Json<CreateClientRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<ClientView>>), ApiError> {
	let caller = identity.require()?;
	let req = parse_body(payload)?;
	let created = respond(&state, state.service.create_client(caller, req).await)?;

	Ok((StatusCode::CREATED, created))
}

async fn get_client(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	Path(id): Path<String>,
) -> ApiResult<ClientView> {
	let caller = identity.require()?;

	respond(&state, state.service.get_client(caller, &id).await)
}

async fn update_client(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	Path(id): Path<String>,
	payload: Result<Json<UpdateClientRequest>, JsonRejection>,
) -> ApiResult<ClientView> {
	let caller = identity.require()?;
	let req = parse_body(payload)?;

	respond(&state, state.service.update_client(caller, &id, req).await)
}

async fn delete_client(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	Path(id): Path<String>,
) -> ApiResult<Value> {
	let caller = identity.require()?;
	let result = state.service.delete_client(caller, &id).await;

	respond(&state, result.map(|()| json!({ "id": id, "deleted": true })))
}

async fn client_research(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	Path(id): Path<String>,
	query: Result<Query<PageRequest>, QueryRejection>,
) -> ApiResult<Vec<ResearchRecord>> {
	let caller = identity.require()?;
	let page = parse_page(query)?;

	respond_paged(&state, state.service.client_research(caller, &id, page).await)
}

async fn list_directories(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	Path(id): Path<String>,
) -> ApiResult<Vec<DirectoryView>> {
	let caller = identity.require()?;

	respond(&state, state.service.list_directories(caller, &id).await)
}

async fn create_directory(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	Path(id): Path<String>,
	payload: Result<Json<CreateDirectoryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<DirectoryView>>), ApiError> {
	let caller = identity.require()?;
	let req = parse_body(payload)?;
	let created = respond(&state, state.service.create_directory(caller, &id, req).await)?;

	Ok((StatusCode::CREATED, created))
}

async fn delete_directory(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	Path(id): Path<String>,
) -> ApiResult<Value> {
	let caller = identity.require()?;
	let result = state.service.delete_directory(caller, &id).await;

	respond(&state, result.map(|()| json!({ "id": id, "deleted": true })))
}

async fn list_subdirectories(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	Path(id): Path<String>,
) -> ApiResult<Vec<SubdirectoryView>> {
	let caller = identity.require()?;

	respond(&state, state.service.list_subdirectories(caller, &id).await)
}

async fn create_subdirectory(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	Path(id): Path<String>,
	payload: Result<Json<CreateSubdirectoryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<SubdirectoryView>>), ApiError> {
	let caller = identity.require()?;
	let req = parse_body(payload)?;
	let created = respond(&state, state.service.create_subdirectory(caller, &id, req).await)?;

	Ok((StatusCode::CREATED, created))
}

async fn client_documents(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	Path(id): Path<String>,
	query: Result<Query<PageRequest>, QueryRejection>,
) -> ApiResult<Vec<DocumentView>> {
	let caller = identity.require()?;
	let page = parse_page(query)?;

	respond_paged(&state, state.service.list_client_documents(caller, &id, page).await)
}

async fn list_cases(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	query: Result<Query<PageRequest>, QueryRejection>,
) -> ApiResult<Vec<CaseView>> {
	let caller = identity.require()?;
	let page = parse_page(query)?;

	respond_paged(&state, state.service.list_cases(caller, page).await)
}

async fn create_case(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	payload: Result<Json<CreateCaseRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<CaseView>>), ApiError> {
	let caller = identity.require()?;
	let req = parse_body(payload)?;
	let created = respond(&state, state.service.create_case(caller, req).await)?;

	Ok((StatusCode::CREATED, created))
}

async fn get_case(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	Path(id): Path<String>,
) -> ApiResult<CaseView> {
	let caller = identity.require()?;

	respond(&state, state.service.get_case(caller, &id).await)
}

async fn update_case(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	Path(id): Path<String>,
	payload: Result<Json<UpdateCaseRequest>, JsonRejection>,
) -> ApiResult<CaseView> {
	let caller = identity.require()?;
	let req = parse_body(payload)?;

	respond(&state, state.service.update_case(caller, &id, req).await)
}

async fn register_document(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	payload: Result<Json<RegisterDocumentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<DocumentView>>), ApiError> {
	let caller = identity.require()?;
	let req = parse_body(payload)?;
	let created = respond(&state, state.service.register_document(caller, req).await)?;

	Ok((StatusCode::CREATED, created))
}

async fn delete_document(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	Path(id): Path<String>,
) -> ApiResult<Value> {
	let caller = identity.require()?;
	let result = state.service.delete_document(caller, &id).await;

	respond(&state, result.map(|()| json!({ "id": id, "deleted": true })))
}

async fn get_me(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
) -> ApiResult<UserView> {
	let caller = identity.require()?;

	respond(&state, state.service.get_profile(caller).await)
}

async fn update_me(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> ApiResult<UserView> {
	let caller = identity.require()?;
	let req = parse_body(payload)?;

	respond(&state, state.service.update_profile(caller, req).await)
}

async fn list_activities(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	query: Result<Query<PageRequest>, QueryRejection>,
) -> ApiResult<Vec<ActivityView>> {
	let caller = identity.require()?;
	let page = parse_page(query)?;

	respond_paged(&state, state.service.list_activities(caller, page).await)
}

async fn list_settings(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
) -> ApiResult<Vec<SettingView>> {
	let caller = identity.require()?;

	respond(&state, state.service.list_settings(caller).await)
}

async fn get_setting(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	Path(key): Path<String>,
) -> ApiResult<SettingView> {
	let caller = identity.require()?;

	respond(&state, state.service.get_setting(caller, &key).await)
}

async fn upsert_setting(
	State(state): State<AppState>,
	Extension(identity): Extension<Identity>,
	Path(key): Path<String>,
	payload: Result<Json<UpsertSettingRequest>, JsonRejection>,
) -> ApiResult<SettingView> {
	let caller = identity.require()?;
	let req = parse_body(payload)?;

	respond(&state, state.service.upsert_setting(caller, &key, req).await)
}

fn respond<T>(state: &AppState, result: legal_service::Result<T>) -> ApiResult<T> {
	result
		.map(|data| Json(Envelope::data(data)))
		.map_err(|err| ApiError::from_service(err, state.is_production()))
}

fn respond_paged<T>(state: &AppState, result: legal_service::Result<Paged<T>>) -> ApiResult<Vec<T>> {
	result
		.map(|paged| Json(Envelope::paged(paged)))
		.map_err(|err| ApiError::from_service(err, state.is_production()))
}

fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
	payload.map(|Json(value)| value).map_err(|rejection| {
		ApiError::validation(vec![FieldError {
			field: "body".to_string(),
			message: rejection.body_text(),
		}])
	})
}

fn parse_page(query: Result<Query<PageRequest>, QueryRejection>) -> Result<PageRequest, ApiError> {
	query.map(|Query(page)| page).map_err(|rejection| {
		ApiError::validation(vec![FieldError {
			field: "query".to_string(),
			message: rejection.body_text(),
		}])
	})
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
	headers
		.get(name)
		.and_then(|value| value.to_str().ok())
		.map(str::trim)
		.filter(|value| !value.is_empty())
}

fn read_bearer_token(headers: &HeaderMap) -> Option<&str> {
	let value = header_str(headers, header::AUTHORIZATION.as_str())?;
	let token = value.strip_prefix("Bearer ")?.trim();

	if token.is_empty() { None } else { Some(token) }
}

fn now_rfc3339() -> String {
	OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default()
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	success: bool,
	error: String,
	error_code: &'static str,
	#[serde(skip_serializing_if = "Option::is_none")]
	details: Option<Vec<FieldError>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	retry_after_seconds: Option<u64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	debug: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: &'static str,
	message: String,
	details: Option<Vec<FieldError>>,
	retry_after_seconds: Option<u64>,
	debug: Option<String>,
}
impl ApiError {
	fn new(status: StatusCode, error_code: &'static str, message: impl Into<String>) -> Self {
		Self {
			status,
			error_code,
			message: message.into(),
			details: None,
			retry_after_seconds: None,
			debug: None,
		}
	}

	fn validation(details: Vec<FieldError>) -> Self {
		Self {
			details: Some(details),
			..Self::new(StatusCode::BAD_REQUEST, "validation_error", "Validation failed")
		}
	}

	/// Maps a service error to its HTTP shape. Storage detail is only exposed outside production.
	pub fn from_service(err: Error, production: bool) -> Self {
		match err {
			Error::Validation { details } => Self::validation(details),
			Error::Unauthorized { message } =>
				Self::new(StatusCode::UNAUTHORIZED, "unauthorized", message),
			Error::Forbidden { message } => Self::new(StatusCode::FORBIDDEN, "forbidden", message),
			Error::NotFound { message } => Self::new(StatusCode::NOT_FOUND, "not_found", message),
			Error::Conflict { message } => Self::new(StatusCode::CONFLICT, "conflict", message),
			Error::RateLimited { retry_after_seconds } => Self {
				retry_after_seconds: Some(retry_after_seconds),
				..Self::new(StatusCode::TOO_MANY_REQUESTS, "rate_limited", err.to_string())
			},
			Error::Ai { .. } =>
				Self::new(StatusCode::INTERNAL_SERVER_ERROR, "ai_service_error", err.to_string()),
			Error::Storage { message } => {
				tracing::error!(error = %message, "Storage failure.");

				Self {
					debug: (!production).then_some(message),
					..Self::new(
						StatusCode::INTERNAL_SERVER_ERROR,
						"internal_error",
						"Internal server error",
					)
				}
			},
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let retry_after = self.retry_after_seconds;
		let body = ErrorBody {
			success: false,
			error: self.message,
			error_code: self.error_code,
			details: self.details,
			retry_after_seconds: self.retry_after_seconds,
			debug: self.debug,
		};
		let mut response = (self.status, Json(body)).into_response();

		if let Some(seconds) = retry_after {
			response.headers_mut().insert(header::RETRY_AFTER, HeaderValue::from(seconds));
		}

		response
	}
}
