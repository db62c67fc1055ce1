//! Prompt-driven assistants: case analysis and drafting, the junior assistant, and property
//! opinions. Every call goes to DeepSeek through the dispatcher.

use serde::{Deserialize, Serialize};
use serde_json::json;
use time::OffsetDateTime;

use crate::{
	ActivityEntry, ActivityKind, Caller, LegalService, ModelPreference, Result,
	validate::FieldChecks,
};

const PRIORITIES: &[&str] = &["low", "medium", "high", "urgent"];
const DETAIL_LEVELS: &[&str] = &["simple", "detailed"];

/// Static picker entry served by the template and task catalogues.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogueEntry {
	pub id: &'static str,
	pub name: &'static str,
	pub description: &'static str,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub category: Option<&'static str>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub property_type: Option<&'static str>,
}
impl CatalogueEntry {
	const fn new(id: &'static str, name: &'static str, description: &'static str) -> Self {
		Self { id, name, description, category: None, property_type: None }
	}

	const fn category(mut self, category: &'static str) -> Self {
		self.category = Some(category);

		self
	}

	const fn property_type(mut self, property_type: &'static str) -> Self {
		self.property_type = Some(property_type);

		self
	}
}

static CASE_TEMPLATES: [CatalogueEntry; 5] = [
	CatalogueEntry::new("plaint", "Plaint (Civil)", "Draft a plaint for civil cases"),
	CatalogueEntry::new(
		"written-statement",
		"Written Statement",
		"Draft a written statement (defense)",
	),
	CatalogueEntry::new("petition", "Writ Petition", "Draft a writ petition"),
	CatalogueEntry::new("bail-application", "Bail Application", "Draft a bail application"),
	CatalogueEntry::new("affidavit", "Affidavit", "Draft an affidavit"),
];

static JUNIOR_TASKS: [CatalogueEntry; 5] = [
	CatalogueEntry::new("legal-research", "Legal Research", "Research case law and legal provisions")
		.category("Research"),
	CatalogueEntry::new("document-review", "Document Review", "Review legal documents for accuracy")
		.category("Documentation"),
	CatalogueEntry::new("case-summary", "Case Summary", "Summarize case facts and judgments")
		.category("Analysis"),
	CatalogueEntry::new("legal-drafting", "Legal Drafting", "Draft legal notices and documents")
		.category("Drafting"),
	CatalogueEntry::new(
		"compliance-check",
		"Compliance Check",
		"Check compliance with legal requirements",
	)
	.category("Compliance"),
];

static PROPERTY_TEMPLATES: [CatalogueEntry; 4] = [
	CatalogueEntry::new("sale-deed", "Sale Deed Review", "Legal review of property sale deed")
		.property_type("Residential"),
	CatalogueEntry::new(
		"title-verification",
		"Title Verification",
		"Verify property title and ownership",
	)
	.property_type("Any"),
	CatalogueEntry::new(
		"boundary-dispute",
		"Boundary Dispute",
		"Legal opinion on property boundary disputes",
	)
	.property_type("Land"),
	CatalogueEntry::new("lease-agreement", "Lease Agreement", "Review and draft lease agreements")
		.property_type("Commercial/Residential"),
];

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Parties {
	pub plaintiff: Option<String>,
	pub defendant: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseAnalysisRequest {
	pub case_title: String,
	pub case_type: String,
	pub description: String,
	#[serde(default)]
	pub parties: Parties,
	pub facts: Option<String>,
	#[serde(default)]
	pub legal_issues: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseAnalysisResponse {
	pub analysis: String,
	pub confidence: f64,
	pub case_title: String,
	pub case_type: String,
	#[serde(with = "crate::time_serde")]
	pub timestamp: OffsetDateTime,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseDraftRequest {
	pub document_type: String,
	pub case_title: String,
	pub parties: Parties,
	pub facts: String,
	pub relief: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseDraftResponse {
	pub document: String,
	pub document_type: String,
	#[serde(with = "crate::time_serde")]
	pub timestamp: OffsetDateTime,
}

#[derive(Clone, Debug, Deserialize)]
pub struct JuniorRequest {
	pub task: String,
	pub context: Option<String>,
	pub priority: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct JuniorResponse {
	pub assistance: String,
	pub confidence: f64,
	pub task: String,
	pub priority: String,
	#[serde(with = "crate::time_serde")]
	pub timestamp: OffsetDateTime,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
	pub document_type: String,
	pub content: String,
	#[serde(default)]
	pub focus_areas: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
	pub review: String,
	pub document_type: String,
	#[serde(with = "crate::time_serde")]
	pub timestamp: OffsetDateTime,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ExplainRequest {
	pub concept: String,
	pub detail: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainResponse {
	pub explanation: String,
	pub concept: String,
	pub detail_level: String,
	#[serde(with = "crate::time_serde")]
	pub timestamp: OffsetDateTime,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyOpinionRequest {
	pub property_type: String,
	pub location: String,
	pub issue: String,
	pub details: Option<String>,
	#[serde(default)]
	pub documents: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyOpinionResponse {
	pub opinion: String,
	pub confidence: f64,
	pub property_type: String,
	pub location: String,
	#[serde(with = "crate::time_serde")]
	pub timestamp: OffsetDateTime,
}

impl LegalService {
	pub fn case_templates(&self) -> &'static [CatalogueEntry] {
		&CASE_TEMPLATES
	}

	pub fn junior_tasks(&self) -> &'static [CatalogueEntry] {
		&JUNIOR_TASKS
	}

	pub fn property_templates(&self) -> &'static [CatalogueEntry] {
		&PROPERTY_TEMPLATES
	}

	pub async fn analyze_case(
		&self,
		caller: Option<&Caller>,
		req: CaseAnalysisRequest,
	) -> Result<CaseAnalysisResponse> {
		let mut checks = FieldChecks::new();

		checks.min_chars("caseTitle", &req.case_title, 1, "Case title is required");
		checks.min_chars("caseType", &req.case_type, 1, "Case type is required");
		checks.min_chars(
			"description",
			&req.description,
			10,
			"Description must be at least 10 characters",
		);
		checks.finish()?;

		let (analysis, confidence) = self
			.draft(caller, ActivityKind::Case, "analyze", &case_analysis_prompt(&req))
			.await?;

		Ok(CaseAnalysisResponse {
			analysis,
			confidence,
			case_title: req.case_title,
			case_type: req.case_type,
			timestamp: OffsetDateTime::now_utc(),
		})
	}

	pub async fn draft_case_document(
		&self,
		caller: Option<&Caller>,
		req: CaseDraftRequest,
	) -> Result<CaseDraftResponse> {
		let mut checks = FieldChecks::new();

		checks.min_chars("documentType", &req.document_type, 1, "Document type is required");
		checks.min_chars("caseTitle", &req.case_title, 1, "Case title is required");
		checks.check(req.parties.plaintiff.is_some(), "parties.plaintiff", "Plaintiff is required");
		checks.check(req.parties.defendant.is_some(), "parties.defendant", "Defendant is required");
		checks.min_chars("facts", &req.facts, 10, "Facts are required");
		checks.finish()?;

		let (document, _) =
			self.draft(caller, ActivityKind::Case, "draft", &case_draft_prompt(&req)).await?;

		Ok(CaseDraftResponse {
			document,
			document_type: req.document_type,
			timestamp: OffsetDateTime::now_utc(),
		})
	}

	pub async fn junior_assist(
		&self,
		caller: Option<&Caller>,
		req: JuniorRequest,
	) -> Result<JuniorResponse> {
		let mut checks = FieldChecks::new();

		checks.min_chars("task", &req.task, 3, "Task description is required");
		checks.one_of("priority", req.priority.as_deref(), PRIORITIES);
		checks.finish()?;

		let priority = req.priority.clone().unwrap_or_else(|| "medium".to_string());
		let (assistance, confidence) = self
			.draft(
				caller,
				ActivityKind::Research,
				"junior_assist",
				&junior_prompt(&req.task, req.context.as_deref(), &priority),
			)
			.await?;

		Ok(JuniorResponse {
			assistance,
			confidence,
			task: req.task,
			priority,
			timestamp: OffsetDateTime::now_utc(),
		})
	}

	pub async fn junior_review(
		&self,
		caller: Option<&Caller>,
		req: ReviewRequest,
	) -> Result<ReviewResponse> {
		let mut checks = FieldChecks::new();

		checks.min_chars("documentType", &req.document_type, 1, "Document type is required");
		checks.min_chars("content", &req.content, 10, "Document content is required");
		checks.finish()?;

		let (review, _) = self
			.draft(caller, ActivityKind::Document, "junior_review", &review_prompt(&req))
			.await?;

		Ok(ReviewResponse {
			review,
			document_type: req.document_type,
			timestamp: OffsetDateTime::now_utc(),
		})
	}

	pub async fn junior_explain(
		&self,
		caller: Option<&Caller>,
		req: ExplainRequest,
	) -> Result<ExplainResponse> {
		let mut checks = FieldChecks::new();

		checks.min_chars("concept", &req.concept, 1, "Legal concept is required");
		checks.one_of("detail", req.detail.as_deref(), DETAIL_LEVELS);
		checks.finish()?;

		let detail = req.detail.unwrap_or_else(|| "simple".to_string());
		let (explanation, _) = self
			.draft(
				caller,
				ActivityKind::Research,
				"junior_explain",
				&explain_prompt(&req.concept, &detail),
			)
			.await?;

		Ok(ExplainResponse {
			explanation,
			concept: req.concept,
			detail_level: detail,
			timestamp: OffsetDateTime::now_utc(),
		})
	}

	pub async fn property_opinion(
		&self,
		caller: Option<&Caller>,
		req: PropertyOpinionRequest,
	) -> Result<PropertyOpinionResponse> {
		let mut checks = FieldChecks::new();

		checks.min_chars("propertyType", &req.property_type, 1, "Property type is required");
		checks.min_chars("location", &req.location, 1, "Location is required");
		checks.min_chars("issue", &req.issue, 1, "Issue description is required");
		checks.finish()?;

		let (opinion, confidence) = self
			.draft(caller, ActivityKind::Research, "property_opinion", &property_prompt(&req))
			.await?;

		Ok(PropertyOpinionResponse {
			opinion,
			confidence,
			property_type: req.property_type,
			location: req.location,
			timestamp: OffsetDateTime::now_utc(),
		})
	}

	async fn draft(
		&self,
		caller: Option<&Caller>,
		kind: ActivityKind,
		action: &str,
		prompt: &str,
	) -> Result<(String, f64)> {
		let dispatched = self.select_and_run(prompt, ModelPreference::DeepSeek).await?;

		if let Some(caller) = caller {
			self.activity.emit(
				ActivityEntry::new(kind, action, format!("Used assistant: {action}"), &caller.user_id)
					.metadata(json!({ "model": dispatched.model.as_str() })),
			);
		}

		Ok((dispatched.completion.text, dispatched.completion.confidence))
	}
}

/// Joins prompt lines, skipping optional lines that were not supplied.
fn render(lines: &[Option<String>]) -> String {
	lines.iter().flatten().map(String::as_str).collect::<Vec<_>>().join("\n")
}

fn labelled(label: &str, value: Option<&str>) -> Option<String> {
	value.map(str::trim).filter(|value| !value.is_empty()).map(|value| format!("{label}: {value}"))
}

fn listed(label: &str, values: &[String]) -> Option<String> {
	if values.is_empty() { None } else { Some(format!("{label}: {}", values.join(", "))) }
}

fn line(text: &str) -> Option<String> {
	Some(text.to_string())
}

pub(crate) fn case_analysis_prompt(req: &CaseAnalysisRequest) -> String {
	render(&[
		line("You are an expert Indian legal case analyst. Analyze the following case:"),
		line(""),
		labelled("Case Title", Some(&req.case_title)),
		labelled("Case Type", Some(&req.case_type)),
		labelled("Description", Some(&req.description)),
		labelled("Facts", req.facts.as_deref()),
		labelled("Plaintiff", req.parties.plaintiff.as_deref()),
		labelled("Defendant", req.parties.defendant.as_deref()),
		listed("Legal Issues", &req.legal_issues),
		line(""),
		line("Provide a comprehensive case analysis including:"),
		line("1. **Legal Framework**: Applicable Indian laws, acts, and sections"),
		line("2. **Case Precedents**: Relevant Supreme Court and High Court judgments"),
		line("3. **Strengths & Weaknesses**: Analysis of legal position"),
		line("4. **Strategy**: Recommended legal strategy and arguments"),
		line("5. **Evidence**: Required evidence and documentation"),
		line("6. **Procedure**: Court procedures and timelines"),
		line("7. **Potential Outcomes**: Likely outcomes and remedies"),
		line("8. **Risk Mitigation**: How to strengthen the case"),
		line(""),
		line("Be thorough, cite specific case law, and provide practical guidance."),
	])
}

pub(crate) fn case_draft_prompt(req: &CaseDraftRequest) -> String {
	render(&[
		Some(format!(
			"You are an expert Indian legal document drafter. Draft a {} for:",
			req.document_type.trim()
		)),
		line(""),
		labelled("Case", Some(&req.case_title)),
		labelled("Plaintiff", req.parties.plaintiff.as_deref()),
		labelled("Defendant", req.parties.defendant.as_deref()),
		labelled("Facts", Some(&req.facts)),
		labelled("Relief Sought", req.relief.as_deref()),
		line(""),
		line(
			"Create a professional, court-ready document following Indian legal format and \
			 standards. Include all necessary sections, legal citations, and proper formatting.",
		),
	])
}

pub(crate) fn junior_prompt(task: &str, context: Option<&str>, priority: &str) -> String {
	render(&[
		line("You are an AI Junior Legal Assistant for Indian law. Help with the following task:"),
		line(""),
		labelled("Task", Some(task)),
		labelled("Context", context),
		labelled("Priority", Some(priority)),
		line(""),
		line("As a junior assistant, provide:"),
		line("1. **Quick Analysis**: Brief understanding of the task"),
		line("2. **Relevant Laws**: Applicable Indian laws and regulations"),
		line("3. **Action Items**: Step-by-step tasks to complete"),
		line("4. **Resources**: Helpful legal resources and references"),
		line("5. **Timeline**: Suggested timeline for completion"),
		line("6. **Notes**: Important points to remember"),
		line(""),
		line("Be concise, practical, and helpful. Focus on Indian legal context."),
	])
}

pub(crate) fn review_prompt(req: &ReviewRequest) -> String {
	render(&[
		Some(format!(
			"You are an AI Junior Legal Assistant reviewing a legal document. Review the following {}:",
			req.document_type.trim()
		)),
		line(""),
		line("Document Content:"),
		Some(req.content.clone()),
		listed("Focus Areas", &req.focus_areas),
		line(""),
		line("Provide a comprehensive review including:"),
		line("1. **Completeness**: Is the document complete?"),
		line("2. **Legal Accuracy**: Are legal provisions correctly cited?"),
		line("3. **Formatting**: Does it follow proper legal formatting?"),
		line("4. **Language**: Is the legal language appropriate?"),
		line("5. **Risks**: Potential legal risks or issues"),
		line("6. **Suggestions**: Specific improvements needed"),
		line("7. **Compliance**: Compliance with Indian legal standards"),
		line(""),
		line("Be thorough and provide specific, actionable feedback."),
	])
}

pub(crate) fn explain_prompt(concept: &str, detail: &str) -> String {
	let depth = if detail == "detailed" {
		"Provide a detailed explanation with legal nuances, case law, and examples."
	} else {
		"Explain in simple, easy-to-understand language suitable for non-lawyers."
	};

	render(&[
		line(
			"You are an AI Junior Legal Assistant explaining Indian law concepts. Explain the \
			 following:",
		),
		line(""),
		labelled("Concept", Some(concept)),
		line(""),
		line(depth),
		line(""),
		line("Include:"),
		line("1. **Definition**: What is it?"),
		line("2. **Legal Basis**: Relevant laws and sections"),
		line("3. **Practical Example**: Real-world example"),
		line("4. **Common Misconceptions**: What people often get wrong"),
		line("5. **Related Concepts**: Related legal terms"),
		line("6. **Key Takeaways**: Important points to remember"),
		line(""),
		line("Make it clear, accurate, and helpful."),
	])
}

pub(crate) fn property_prompt(req: &PropertyOpinionRequest) -> String {
	render(&[
		line(
			"You are an expert Indian property law consultant. Provide a comprehensive legal \
			 opinion for the following property matter:",
		),
		line(""),
		labelled("Property Type", Some(&req.property_type)),
		labelled("Location", Some(&req.location)),
		labelled("Issue", Some(&req.issue)),
		labelled("Additional Details", req.details.as_deref()),
		listed("Documents Available", &req.documents),
		line(""),
		line("Please provide:"),
		line("1. **Legal Analysis**: Applicable property laws, acts, and sections in India"),
		line("2. **Precedents**: Relevant case law and judicial precedents"),
		line("3. **Risk Assessment**: Potential legal risks and liabilities"),
		line("4. **Recommendations**: Step-by-step actionable advice"),
		line("5. **Documentation**: Required documents and procedures"),
		line("6. **Timeline**: Expected timeline for resolution"),
		line(""),
		line(
			"Focus on Indian property laws including Transfer of Property Act 1882, Indian \
			 Registration Act 1908, and relevant state-specific laws.",
		),
	])
}
