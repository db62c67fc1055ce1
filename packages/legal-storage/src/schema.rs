pub fn render_schema() -> String {
	let init = include_str!("../../../sql/init.sql");

	expand_includes(init)
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"tables/001_users.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_users.sql")),
				"tables/002_clients.sql" =>
					out.push_str(include_str!("../../../sql/tables/002_clients.sql")),
				"tables/003_directories.sql" =>
					out.push_str(include_str!("../../../sql/tables/003_directories.sql")),
				"tables/004_subdirectories.sql" =>
					out.push_str(include_str!("../../../sql/tables/004_subdirectories.sql")),
				"tables/005_research_queries.sql" =>
					out.push_str(include_str!("../../../sql/tables/005_research_queries.sql")),
				"tables/006_documents.sql" =>
					out.push_str(include_str!("../../../sql/tables/006_documents.sql")),
				"tables/007_cases.sql" =>
					out.push_str(include_str!("../../../sql/tables/007_cases.sql")),
				"tables/008_settings.sql" =>
					out.push_str(include_str!("../../../sql/tables/008_settings.sql")),
				"tables/009_activities.sql" =>
					out.push_str(include_str!("../../../sql/tables/009_activities.sql")),
				"010_default_settings.sql" =>
					out.push_str(include_str!("../../../sql/010_default_settings.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}
