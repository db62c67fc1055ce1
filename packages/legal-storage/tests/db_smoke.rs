use time::OffsetDateTime;

use legal_config::Sqlite;
use legal_storage::{
	Error, activities, clients,
	db::Db,
	ids,
	models::{Activity, Client, Page, ResearchQuery, User},
	research, settings, users,
};
use legal_testkit::TestDatabase;

const FIRST_PAGE: Page = Page { limit: 20, offset: 0 };

async fn open(test_db: &TestDatabase) -> Db {
	let cfg = Sqlite { path: test_db.path_str(), pool_max_conns: 2, busy_timeout_ms: 5_000 };
	let db = Db::connect(&cfg).await.expect("Failed to open SQLite database.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	db
}

fn user(email: &str) -> User {
	let now = OffsetDateTime::now_utc();

	User {
		id: ids::new_id(ids::USER),
		name: "Asha Rao".to_string(),
		email: email.to_string(),
		password: None,
		phone: None,
		address: None,
		image: None,
		provider: None,
		role: "lawyer".to_string(),
		is_active: true,
		created_at: now,
		updated_at: now,
	}
}

fn client(owner: &str, name: &str) -> Client {
	let now = OffsetDateTime::now_utc();

	Client {
		id: ids::new_id(ids::CLIENT),
		name: name.to_string(),
		email: None,
		phone: "9876543210".to_string(),
		address: None,
		reference_id: None,
		user_id: owner.to_string(),
		is_active: true,
		created_at: now,
		updated_at: now,
	}
}

fn research_query(user_id: Option<&str>, client_id: Option<&str>, response: &str) -> ResearchQuery {
	let now = OffsetDateTime::now_utc();

	ResearchQuery {
		id: ids::new_id(ids::RESEARCH_QUERY),
		user_id: user_id.map(str::to_string),
		client_id: client_id.map(str::to_string),
		query_text: "Limitation period for recovery suits".to_string(),
		response_text: response.to_string(),
		status: "completed".to_string(),
		model: "deepseek".to_string(),
		confidence: Some(0.85),
		tags: Some(sqlx::types::Json(vec!["limitation".to_string()])),
		created_at: now,
		updated_at: now,
	}
}

#[tokio::test]
async fn schema_bootstrap_is_idempotent_and_seeds_settings() {
	let test_db = TestDatabase::new().expect("Failed to create test database.");
	let db = open(&test_db).await;

	db.ensure_schema().await.expect("Second schema pass failed.");

	let prompt = settings::get_setting_value(&db, "PROMPT_BASE")
		.await
		.expect("Failed to read setting.")
		.expect("PROMPT_BASE must be seeded.");

	assert!(prompt.contains("Indian"));

	let public = settings::list_public_settings(&db).await.expect("Failed to list settings.");

	assert!(public.iter().all(|setting| setting.is_public));
	assert!(public.iter().any(|setting| setting.key == "MAX_FILE_SIZE"));
	assert!(!public.iter().any(|setting| setting.key == "DEEPSEEK_API_KEY"));

	db.pool.close().await;
	test_db.cleanup().expect("Failed to cleanup test database.");
}

#[tokio::test]
async fn research_round_trips_by_id() {
	let test_db = TestDatabase::new().expect("Failed to create test database.");
	let db = open(&test_db).await;
	let record = research_query(None, None, "Article 137 of the Limitation Act applies.");

	research::insert_research_query(&db, &record).await.expect("Failed to insert query.");

	let stored = research::get_research_query(&db, &record.id)
		.await
		.expect("Failed to read query.")
		.expect("Stored query must exist.");

	assert_eq!(stored.query_text, record.query_text);
	assert_eq!(stored.response_text, record.response_text);
	assert_eq!(stored.confidence, Some(0.85));
	assert_eq!(stored.tags.map(|tags| tags.0), Some(vec!["limitation".to_string()]));

	db.pool.close().await;
	test_db.cleanup().expect("Failed to cleanup test database.");
}

#[tokio::test]
async fn completed_research_requires_response_text() {
	let test_db = TestDatabase::new().expect("Failed to create test database.");
	let db = open(&test_db).await;
	let record = research_query(None, None, "   ");
	let result = research::insert_research_query(&db, &record).await;

	assert!(result.is_err(), "Expected CHECK constraint to reject an empty response.");

	db.pool.close().await;
	test_db.cleanup().expect("Failed to cleanup test database.");
}

#[tokio::test]
async fn soft_deleted_client_keeps_research_link() {
	let test_db = TestDatabase::new().expect("Failed to create test database.");
	let db = open(&test_db).await;
	let owner = user("asha@example.com");

	users::insert_user(&db, &owner).await.expect("Failed to insert user.");

	let kept = client(&owner.id, "Kept Client");
	let removed = client(&owner.id, "Removed Client");

	clients::insert_client(&db, &kept).await.expect("Failed to insert client.");
	clients::insert_client(&db, &removed).await.expect("Failed to insert client.");

	let record = research_query(Some(&owner.id), Some(&removed.id), "Answer.");

	research::insert_research_query(&db, &record).await.expect("Failed to insert query.");

	let deactivated = clients::deactivate_client(&db, &removed.id, OffsetDateTime::now_utc())
		.await
		.expect("Failed to deactivate client.");

	assert!(deactivated);

	let (listed, total) = clients::list_clients_by_owner(&db, &owner.id, FIRST_PAGE)
		.await
		.expect("Failed to list clients.");

	assert_eq!(total, 1);
	assert_eq!(listed.len(), 1);
	assert_eq!(listed[0].id, kept.id);

	let stored = research::get_research_query(&db, &record.id)
		.await
		.expect("Failed to read query.")
		.expect("Stored query must exist.");

	assert_eq!(stored.client_id.as_deref(), Some(removed.id.as_str()));

	let (by_client, by_client_total) =
		research::list_research_by_client(&db, &removed.id, FIRST_PAGE)
			.await
			.expect("Failed to list research by client.");

	assert_eq!(by_client_total, 1);
	assert_eq!(by_client[0].id, record.id);

	db.pool.close().await;
	test_db.cleanup().expect("Failed to cleanup test database.");
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
	let test_db = TestDatabase::new().expect("Failed to create test database.");
	let db = open(&test_db).await;

	users::insert_user(&db, &user("dup@example.com")).await.expect("Failed to insert user.");

	let err = users::insert_user(&db, &user("dup@example.com"))
		.await
		.expect_err("Expected unique email conflict.");

	assert!(matches!(err, Error::Conflict(_)), "Unexpected error: {err}");

	db.pool.close().await;
	test_db.cleanup().expect("Failed to cleanup test database.");
}

#[tokio::test]
async fn deactivated_user_is_hidden() {
	let test_db = TestDatabase::new().expect("Failed to create test database.");
	let db = open(&test_db).await;
	let record = user("gone@example.com");

	users::insert_user(&db, &record).await.expect("Failed to insert user.");

	let now = OffsetDateTime::now_utc();

	assert!(users::deactivate_user(&db, &record.id, now).await.expect("Failed to deactivate."));
	assert!(!users::deactivate_user(&db, &record.id, now).await.expect("Failed to deactivate."));
	assert!(
		users::get_active_user(&db, &record.id).await.expect("Failed to read user.").is_none()
	);

	db.pool.close().await;
	test_db.cleanup().expect("Failed to cleanup test database.");
}

#[tokio::test]
async fn activity_for_unknown_user_is_rejected_by_foreign_key() {
	let test_db = TestDatabase::new().expect("Failed to create test database.");
	let db = open(&test_db).await;
	let activity = Activity {
		id: ids::new_id(ids::ACTIVITY),
		r#type: "system".to_string(),
		action: "ping".to_string(),
		description: "Ping".to_string(),
		user_id: "user_missing".to_string(),
		client_id: None,
		case_id: None,
		metadata: None,
		created_at: OffsetDateTime::now_utc(),
	};
	let result = activities::insert_activity(&db, &activity).await;

	assert!(matches!(result, Err(Error::Sqlx(_))));

	db.pool.close().await;
	test_db.cleanup().expect("Failed to cleanup test database.");
}

#[tokio::test]
async fn client_listing_paginates_newest_first() {
	let test_db = TestDatabase::new().expect("Failed to create test database.");
	let db = open(&test_db).await;
	let owner = user("pages@example.com");

	users::insert_user(&db, &owner).await.expect("Failed to insert user.");

	let mut inserted = Vec::new();

	for index in 0..5 {
		let row = client(&owner.id, &format!("Client {index}"));

		clients::insert_client(&db, &row).await.expect("Failed to insert client.");
		inserted.push(row.id);
	}

	let (second_page, total) =
		clients::list_clients_by_owner(&db, &owner.id, Page { limit: 2, offset: 2 })
			.await
			.expect("Failed to list clients.");

	assert_eq!(total, 5);
	assert_eq!(second_page.len(), 2);
	assert_eq!(second_page[0].id, inserted[2]);
	assert_eq!(second_page[1].id, inserted[1]);

	db.pool.close().await;
	test_db.cleanup().expect("Failed to cleanup test database.");
}
