/// Request payloads and their validation
///
/// Every mutating operation takes a typed request struct. Validation runs
/// in a single pass and reports every problem at once as a list of
/// [`FieldViolation`]s sorted by field, rather than stopping at the first.
///
/// Length rules are declared with `validator` derives. Presence, blankness
/// and enum membership are checked alongside them in the same pass, and a
/// successful pass yields typed values (`ValidTask`, `TaskPatch`, ...) so
/// services never re-parse strings.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::models::{
    page::{PageRequest, DEFAULT_PAGE, DEFAULT_PAGE_SIZE},
    task::{TaskFilter, TaskPriority, TaskStatus},
};

/// A single rejected field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Accumulates violations across one validation pass
#[derive(Debug, Default)]
pub struct Violations(Vec<FieldViolation>);

impl Violations {
    /// Seeds the pass with the derive-based rules of `request`
    pub fn of(request: &impl Validate) -> Self {
        let mut violations = Self::default();
        if let Err(errors) = request.validate() {
            violations.absorb(&errors);
        }
        violations
    }

    fn absorb(&mut self, errors: &ValidationErrors) {
        for (field, errors) in errors.field_errors() {
            for error in errors.iter() {
                self.push(
                    field.to_string(),
                    error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                );
            }
        }
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldViolation::new(field, message));
    }

    /// True when `field` already has a violation
    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|v| v.field == field)
    }

    /// Records `message` unless the field was already rejected
    fn push_once(&mut self, field: &str, message: &str) {
        if !self.has(field) {
            self.push(field, message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Ends the pass, sorting violations by field
    pub fn into_result(mut self) -> Result<(), Vec<FieldViolation>> {
        if self.0.is_empty() {
            return Ok(());
        }
        self.0.sort_by(|a, b| a.field.cmp(&b.field));
        Err(self.0)
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Blank strings are reported as such instead of as a length error
fn reject_blank(violations: &mut Violations, field: &str, value: Option<&str>, message: &str) {
    if value.is_some_and(is_blank) {
        violations.0.retain(|v| v.field != field);
        violations.push(field, message);
    }
}

/// Parses an enum value that is present and non-blank
fn parse_enum<T>(
    violations: &mut Violations,
    field: &str,
    raw: Option<&str>,
    parse: fn(&str) -> Option<T>,
    message: &str,
) -> Option<T> {
    let raw = raw.filter(|raw| !is_blank(raw))?;
    let parsed = parse(raw);
    if parsed.is_none() {
        violations.push_once(field, message);
    }
    parsed
}

// ---------------------------------------------------------------------------
// Registration and login
// ---------------------------------------------------------------------------

/// `POST /registration` body
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RegistrationRequest {
    #[serde(default)]
    #[validate(length(min = 3, max = 30, message = "Username must be between 3 and 30 characters"))]
    pub username: String,

    #[serde(default)]
    #[validate(length(min = 6, max = 50, message = "Password must be between 6 and 50 characters"))]
    pub password: String,
}

/// Checks username and password shape (not availability)
pub fn validate_registration(req: &RegistrationRequest) -> Result<(), Vec<FieldViolation>> {
    let mut violations = Violations::of(req);
    reject_blank(&mut violations, "username", Some(&req.username), "Username must not be blank");
    reject_blank(&mut violations, "password", Some(&req.password), "Password must not be blank");
    violations.into_result()
}

/// `POST /auth` body
///
/// Credentials are not shape-checked. Anything that does not match a stored
/// user is simply rejected as invalid credentials.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// `POST /tasks` body
///
/// `assignee` is a username.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(
        required(message = "Title is required"),
        length(min = 1, message = "Title must not be empty")
    )]
    pub title: Option<String>,

    #[validate(
        required(message = "Description is required"),
        length(min = 1, message = "Description must not be empty")
    )]
    pub description: Option<String>,

    #[validate(required(message = "Status is required"))]
    pub status: Option<String>,

    #[validate(required(message = "Priority is required"))]
    pub priority: Option<String>,

    #[validate(length(min = 1, message = "Assignee must not be empty"))]
    pub assignee: Option<String>,
}

/// A create request that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidTask {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub assignee: Option<String>,
}

pub fn validate_create_task(req: &CreateTaskRequest) -> Result<ValidTask, Vec<FieldViolation>> {
    let mut violations = Violations::of(req);

    reject_blank(&mut violations, "title", req.title.as_deref(), "Title must not be empty");
    reject_blank(
        &mut violations,
        "description",
        req.description.as_deref(),
        "Description must not be empty",
    );
    reject_blank(&mut violations, "assignee", req.assignee.as_deref(), "Assignee must not be empty");
    reject_blank(&mut violations, "status", req.status.as_deref(), "Status is required");
    reject_blank(&mut violations, "priority", req.priority.as_deref(), "Priority is required");

    let status = parse_enum(
        &mut violations,
        "status",
        req.status.as_deref(),
        TaskStatus::parse,
        "Invalid status value",
    );
    let priority = parse_enum(
        &mut violations,
        "priority",
        req.priority.as_deref(),
        TaskPriority::parse,
        "Invalid priority value",
    );

    violations.into_result()?;

    match (&req.title, &req.description, status, priority) {
        (Some(title), Some(description), Some(status), Some(priority)) => Ok(ValidTask {
            title: title.clone(),
            description: description.clone(),
            status,
            priority,
            assignee: req.assignee.clone(),
        }),
        _ => Err(vec![FieldViolation::new("task", "Incomplete task data")]),
    }
}

/// `PATCH /tasks/{id}` body
///
/// Every key is optional. A JSON `null` is treated as an absent key.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: Option<String>,

    #[validate(length(min = 1, message = "Description must not be empty"))]
    pub description: Option<String>,

    pub status: Option<String>,

    pub priority: Option<String>,

    #[validate(length(min = 1, message = "Assignee must not be empty"))]
    pub assignee: Option<String>,
}

/// The parsed keys of an update request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub assignee: Option<String>,
}

/// Validates the present keys of a patch
///
/// The pass is returned open so the caller can add checks that need the
/// store (assignee resolution) before finishing it.
pub fn validate_task_patch(req: &UpdateTaskRequest) -> (TaskPatch, Violations) {
    let mut violations = Violations::of(req);

    reject_blank(&mut violations, "title", req.title.as_deref(), "Title must not be empty");
    reject_blank(
        &mut violations,
        "description",
        req.description.as_deref(),
        "Description must not be empty",
    );
    reject_blank(&mut violations, "assignee", req.assignee.as_deref(), "Assignee must not be empty");
    reject_blank(&mut violations, "status", req.status.as_deref(), "Status must not be empty");
    reject_blank(&mut violations, "priority", req.priority.as_deref(), "Priority must not be empty");

    let status = parse_enum(
        &mut violations,
        "status",
        req.status.as_deref(),
        TaskStatus::parse,
        "Invalid status value",
    );
    let priority = parse_enum(
        &mut violations,
        "priority",
        req.priority.as_deref(),
        TaskPriority::parse,
        "Invalid priority value",
    );

    let patch = TaskPatch {
        title: req.title.clone(),
        description: req.description.clone(),
        status,
        priority,
        assignee: req.assignee.clone(),
    };

    (patch, violations)
}

/// `PATCH /tasks/{id}/status` body
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct StatusChangeRequest {
    #[validate(required(message = "Status is required"))]
    pub status: Option<String>,
}

pub fn validate_status_change(req: &StatusChangeRequest) -> Result<TaskStatus, Vec<FieldViolation>> {
    let mut violations = Violations::of(req);
    reject_blank(&mut violations, "status", req.status.as_deref(), "Status is required");

    let status = parse_enum(
        &mut violations,
        "status",
        req.status.as_deref(),
        TaskStatus::parse,
        "Invalid status value",
    );

    violations.into_result()?;
    status.ok_or_else(|| vec![FieldViolation::new("status", "Status is required")])
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

/// `POST /tasks/{id}/comments` body
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CommentRequest {
    #[validate(
        required(message = "Content is required"),
        length(
            min = 1,
            max = 140,
            message = "Content must be between 1 and 140 characters"
        )
    )]
    pub content: Option<String>,
}

/// Returns the content to store
pub fn validate_comment(req: &CommentRequest) -> Result<String, Vec<FieldViolation>> {
    let mut violations = Violations::of(req);
    reject_blank(&mut violations, "content", req.content.as_deref(), "Content must not be blank");
    violations.into_result()?;

    req.content
        .clone()
        .ok_or_else(|| vec![FieldViolation::new("content", "Content is required")])
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// Query string of the author/assignee listings
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ListTasksQuery {
    pub page: Option<u32>,

    #[validate(range(min = 1, max = 100, message = "Size must be between 1 and 100"))]
    pub size: Option<u32>,

    pub status: Option<String>,

    pub priority: Option<String>,
}

/// Parses the optional filters and paging of a listing request
///
/// Blank `status` or `priority` values are treated as absent.
pub fn validate_listing_query(
    query: &ListTasksQuery,
) -> Result<(TaskFilter, PageRequest), Vec<FieldViolation>> {
    let mut violations = Violations::of(query);

    let status = parse_enum(
        &mut violations,
        "status",
        query.status.as_deref(),
        TaskStatus::parse,
        "Invalid status value",
    );
    let priority = parse_enum(
        &mut violations,
        "priority",
        query.priority.as_deref(),
        TaskPriority::parse,
        "Invalid priority value",
    );

    violations.into_result()?;

    let page = PageRequest::new(
        query.page.unwrap_or(DEFAULT_PAGE),
        query.size.unwrap_or(DEFAULT_PAGE_SIZE),
    );

    Ok((TaskFilter { status, priority }, page))
}
