/// Service-level tests against the in-memory store
///
/// Users for task and comment tests are seeded straight into the store with
/// a placeholder hash. Only the registration and authentication tests pay
/// for real Argon2 hashing.

use chrono::Duration;
use std::sync::Arc;
use taskboard_shared::auth::jwt::{create_token, Claims, JwtError};
use taskboard_shared::auth::middleware::AuthContext;
use taskboard_shared::models::task::{Task, TaskPriority, TaskStatus};
use taskboard_shared::models::user::CreateUser;
use taskboard_shared::services::{ServiceError, Services, TaskListing, TokenSettings};
use taskboard_shared::store::{memory::InMemoryStore, UserStore};
use taskboard_shared::validation::{
    CommentRequest, CreateTaskRequest, ListTasksQuery, LoginRequest, RegistrationRequest,
    StatusChangeRequest, UpdateTaskRequest,
};

const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

struct Harness {
    store: InMemoryStore,
    services: Services,
}

impl Harness {
    fn new() -> Self {
        Self::with_tokens(TokenSettings::new(SECRET))
    }

    fn with_tokens(tokens: TokenSettings) -> Self {
        let store = InMemoryStore::new();
        let services = Services::new(Arc::new(store.clone()), tokens);
        Self { store, services }
    }

    /// Seeds a user without hashing a password
    async fn user(&self, username: &str) -> AuthContext {
        let user = self
            .store
            .create_user(CreateUser {
                username: username.to_string(),
                password_hash: "unused".to_string(),
            })
            .await
            .unwrap();
        AuthContext::from(&user)
    }

    async fn task(&self, author: &AuthContext, assignee: Option<&str>, status: &str, priority: &str) -> Task {
        self.services
            .tasks
            .create_task(task_request(status, priority, assignee), author)
            .await
            .unwrap()
    }
}

fn task_request(status: &str, priority: &str, assignee: Option<&str>) -> CreateTaskRequest {
    CreateTaskRequest {
        title: Some("T".to_string()),
        description: Some("D".to_string()),
        status: Some(status.to_string()),
        priority: Some(priority.to_string()),
        assignee: assignee.map(str::to_string),
    }
}

fn registration(username: &str, password: &str) -> RegistrationRequest {
    RegistrationRequest {
        username: username.to_string(),
        password: password.to_string(),
    }
}

fn login(username: &str, password: &str) -> LoginRequest {
    LoginRequest {
        username: username.to_string(),
        password: password.to_string(),
    }
}

fn query(status: Option<&str>, priority: Option<&str>) -> ListTasksQuery {
    ListTasksQuery {
        status: status.map(str::to_string),
        priority: priority.map(str::to_string),
        ..Default::default()
    }
}

fn comment(content: String) -> CommentRequest {
    CommentRequest {
        content: Some(content),
    }
}

fn violation_fields(err: ServiceError) -> Vec<String> {
    match err {
        ServiceError::Validation(violations) => violations.into_iter().map(|v| v.field).collect(),
        other => panic!("expected validation error, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Registration and authentication
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_registration_username_length_bounds() {
    let h = Harness::new();
    let registration_service = &h.services.registration;

    let too_long = "a".repeat(31);
    for username in ["ab", too_long.as_str()] {
        let err = registration_service
            .register_new_user(registration(username, "secret1"))
            .await
            .unwrap_err();
        assert_eq!(violation_fields(err), vec!["username"]);
    }

    let longest = "b".repeat(30);
    for username in ["abc", longest.as_str()] {
        let user = registration_service
            .register_new_user(registration(username, "secret1"))
            .await
            .unwrap();
        assert_eq!(user.username, username);
        assert!(user.password_hash.starts_with("$argon2id$"));
    }
}

#[tokio::test]
async fn test_registration_rejects_duplicate_username() {
    let h = Harness::new();
    h.services
        .registration
        .register_new_user(registration("alice", "secret1"))
        .await
        .unwrap();

    let err = h
        .services
        .registration
        .register_new_user(registration("alice", "another1"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::UsernameTaken(name) if name == "alice"));
}

#[tokio::test]
async fn test_registration_reports_both_fields() {
    let h = Harness::new();

    let err = h
        .services
        .registration
        .register_new_user(registration("   ", "123"))
        .await
        .unwrap_err();
    assert_eq!(violation_fields(err), vec!["password", "username"]);
}

#[tokio::test]
async fn test_authenticate_and_verify_round_trip() {
    let h = Harness::new();
    let user = h
        .services
        .registration
        .register_new_user(registration("alice", "secret1"))
        .await
        .unwrap();

    let issued = h
        .services
        .authentication
        .authenticate(login("alice", "secret1"))
        .await
        .unwrap();
    assert_eq!(issued.token_type, "Bearer");
    assert!(issued.expires_at > chrono::Utc::now());

    let auth = h.services.authentication.verify(&issued.token).await.unwrap();
    assert_eq!(auth, AuthContext::new(user.id, "alice"));
}

#[tokio::test]
async fn test_authenticate_rejects_bad_credentials() {
    let h = Harness::new();
    h.services
        .registration
        .register_new_user(registration("alice", "secret1"))
        .await
        .unwrap();

    for (username, password) in [("alice", "wrong-password"), ("nobody", "secret1"), ("", "")] {
        let err = h
            .services
            .authentication
            .authenticate(login(username, password))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidCredentials), "{username}");
    }
}

#[tokio::test]
async fn test_verify_rejects_expired_tampered_and_unknown() {
    let h = Harness::new();
    let alice = h.user("alice").await;

    let expired = create_token(
        &Claims::with_expiration(alice.user_id, "alice", Duration::seconds(-3600)).unwrap(),
        SECRET,
    )
    .unwrap();
    assert!(matches!(
        h.services.authentication.verify(&expired).await,
        Err(ServiceError::Token(JwtError::Expired))
    ));

    let foreign = create_token(&Claims::new(alice.user_id, "alice"), "some-other-secret-of-32-bytes!!").unwrap();
    assert!(matches!(
        h.services.authentication.verify(&foreign).await,
        Err(ServiceError::Token(_))
    ));

    let ghost = create_token(&Claims::new(99, "ghost"), SECRET).unwrap();
    assert!(matches!(
        h.services.authentication.verify(&ghost).await,
        Err(ServiceError::Unauthenticated(_))
    ));

    let mismatched = create_token(&Claims::new(alice.user_id + 1, "alice"), SECRET).unwrap();
    assert!(matches!(
        h.services.authentication.verify(&mismatched).await,
        Err(ServiceError::Unauthenticated(_))
    ));
}

#[tokio::test]
async fn test_unrepresentable_token_lifetime_fails_cleanly() {
    let h = Harness::with_tokens(
        TokenSettings::new(SECRET).with_expiration(Duration::days(365 * 1_000_000)),
    );
    h.services
        .registration
        .register_new_user(registration("alice", "secret1"))
        .await
        .unwrap();

    let err = h
        .services
        .authentication
        .authenticate(login("alice", "secret1"))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Token(JwtError::CreateError(_))));
}

#[tokio::test]
async fn test_configured_token_lifetime() {
    let h = Harness::with_tokens(TokenSettings::new(SECRET).with_expiration(Duration::minutes(5)));
    h.services
        .registration
        .register_new_user(registration("alice", "secret1"))
        .await
        .unwrap();

    let issued = h
        .services
        .authentication
        .authenticate(login("alice", "secret1"))
        .await
        .unwrap();

    let remaining = issued.expires_at - chrono::Utc::now();
    assert!(remaining <= Duration::minutes(5));
    assert!(remaining > Duration::minutes(4));
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_create_task_matches_enums_case_insensitively() {
    let h = Harness::new();
    let alice = h.user("alice").await;

    for status in ["completed", "COMPLETED", "CoMpLeTeD"] {
        let task = h.task(&alice, None, status, "high").await;
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.priority, TaskPriority::High);
        assert_eq!(task.author.username, "alice");
        assert_eq!(task.assignee, None);
    }
}

#[tokio::test]
async fn test_create_task_rejects_unknown_enum_values() {
    let h = Harness::new();
    let alice = h.user("alice").await;

    let err = h
        .services
        .tasks
        .create_task(task_request("done", "low", None), &alice)
        .await
        .unwrap_err();
    assert_eq!(violation_fields(err), vec!["status"]);

    let err = h
        .services
        .tasks
        .create_task(task_request("pending", "urgent", None), &alice)
        .await
        .unwrap_err();
    assert_eq!(violation_fields(err), vec!["priority"]);

    assert!(h.services.tasks.get_all_tasks().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_task_with_assignee() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    let bob = h.user("bob").await;

    let task = h.task(&alice, Some("bob"), "pending", "medium").await;
    assert_eq!(task.assignee.map(|a| a.id), Some(bob.user_id));

    let err = h
        .services
        .tasks
        .create_task(task_request("pending", "medium", Some("carol")), &alice)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::UserNotFound(name) if name == "carol"));
}

#[tokio::test]
async fn test_update_by_non_author_is_denied_and_leaves_task_unchanged() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    let bob = h.user("bob").await;
    let task = h.task(&alice, Some("bob"), "pending", "low").await;

    let err = h
        .services
        .tasks
        .update_task(
            task.id,
            UpdateTaskRequest {
                title: Some("Hijacked".to_string()),
                ..Default::default()
            },
            &bob,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::AccessDenied(_)));

    let stored = h.services.tasks.get_task_by_id(task.id).await.unwrap();
    assert_eq!(stored, task);
}

#[tokio::test]
async fn test_update_with_only_title_keeps_other_fields() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    h.user("bob").await;
    let task = h.task(&alice, Some("bob"), "in_progress", "high").await;

    let updated = h
        .services
        .tasks
        .update_task(
            task.id,
            UpdateTaskRequest {
                title: Some("X".to_string()),
                ..Default::default()
            },
            &alice,
        )
        .await
        .unwrap();

    assert_eq!(updated.title, "X");
    assert_eq!(updated.description, task.description);
    assert_eq!(updated.status, task.status);
    assert_eq!(updated.priority, task.priority);
    assert_eq!(updated.assignee, task.assignee);
    assert_eq!(updated.author, task.author);
}

#[tokio::test]
async fn test_update_applies_every_present_key() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    let carol = h.user("carol").await;
    let task = h.task(&alice, None, "pending", "low").await;

    let updated = h
        .services
        .tasks
        .update_task(
            task.id,
            UpdateTaskRequest {
                title: Some("New title".to_string()),
                description: Some("New description".to_string()),
                status: Some("Completed".to_string()),
                priority: Some("HIGH".to_string()),
                assignee: Some("carol".to_string()),
            },
            &alice,
        )
        .await
        .unwrap();

    assert_eq!(updated.title, "New title");
    assert_eq!(updated.description, "New description");
    assert_eq!(updated.status, TaskStatus::Completed);
    assert_eq!(updated.priority, TaskPriority::High);
    assert_eq!(updated.assignee.map(|a| a.id), Some(carol.user_id));
}

#[tokio::test]
async fn test_update_collects_assignee_and_field_violations() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    let task = h.task(&alice, None, "pending", "low").await;

    let err = h
        .services
        .tasks
        .update_task(
            task.id,
            UpdateTaskRequest {
                description: Some(String::new()),
                assignee: Some("nobody".to_string()),
                ..Default::default()
            },
            &alice,
        )
        .await
        .unwrap_err();

    assert_eq!(violation_fields(err), vec!["assignee", "description"]);
    assert_eq!(h.services.tasks.get_task_by_id(task.id).await.unwrap(), task);
}

#[tokio::test]
async fn test_missing_task_is_not_found() {
    let h = Harness::new();
    let alice = h.user("alice").await;

    assert!(matches!(
        h.services.tasks.get_task_by_id(42).await,
        Err(ServiceError::TaskNotFound(42))
    ));
    assert!(matches!(
        h.services
            .tasks
            .update_task(42, UpdateTaskRequest::default(), &alice)
            .await,
        Err(ServiceError::TaskNotFound(42))
    ));
    assert!(matches!(
        h.services.tasks.delete_task(42, &alice).await,
        Err(ServiceError::TaskNotFound(42))
    ));
    assert!(matches!(
        h.services
            .tasks
            .change_status(42, StatusChangeRequest::default(), &alice)
            .await,
        Err(ServiceError::TaskNotFound(42))
    ));
}

#[tokio::test]
async fn test_delete_task_requires_author_and_removes_comments() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    let bob = h.user("bob").await;
    let task = h.task(&alice, None, "pending", "low").await;
    let note = h
        .services
        .comments
        .add_comment(task.id, comment("note".to_string()), &bob)
        .await
        .unwrap();

    assert!(matches!(
        h.services.tasks.delete_task(task.id, &bob).await,
        Err(ServiceError::AccessDenied(_))
    ));

    h.services.tasks.delete_task(task.id, &alice).await.unwrap();

    assert!(matches!(
        h.services.tasks.get_task_by_id(task.id).await,
        Err(ServiceError::TaskNotFound(_))
    ));
    assert!(matches!(
        h.services.comments.delete_comment(note.id, &bob).await,
        Err(ServiceError::CommentNotFound(_))
    ));
}

#[tokio::test]
async fn test_get_all_tasks_in_creation_order() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    let bob = h.user("bob").await;

    let first = h.task(&alice, None, "pending", "low").await;
    let second = h.task(&bob, None, "completed", "high").await;

    let all = h.services.tasks.get_all_tasks().await.unwrap();
    assert_eq!(all, vec![first, second]);
}

// ---------------------------------------------------------------------------
// Status changes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_change_status_requires_author_who_is_also_assignee() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    let bob = h.user("bob").await;

    let unassigned = h.task(&alice, None, "pending", "low").await;
    let assigned_to_bob = h.task(&alice, Some("bob"), "pending", "low").await;
    let self_assigned = h.task(&alice, Some("alice"), "pending", "low").await;

    let to_completed = || StatusChangeRequest {
        status: Some("completed".to_string()),
    };

    for (task, caller) in [
        (&unassigned, &alice),
        (&assigned_to_bob, &alice),
        (&assigned_to_bob, &bob),
    ] {
        let err = h
            .services
            .tasks
            .change_status(task.id, to_completed(), caller)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::AccessDenied(_)));
    }

    let updated = h
        .services
        .tasks
        .change_status(self_assigned.id, to_completed(), &alice)
        .await
        .unwrap();
    assert_eq!(updated.status, TaskStatus::Completed);
    assert_eq!(updated.title, self_assigned.title);
}

#[tokio::test]
async fn test_change_status_checks_access_before_value() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    let bob = h.user("bob").await;
    let task = h.task(&alice, Some("alice"), "pending", "low").await;

    let invalid = || StatusChangeRequest {
        status: Some("archived".to_string()),
    };

    assert!(matches!(
        h.services.tasks.change_status(task.id, invalid(), &bob).await,
        Err(ServiceError::AccessDenied(_))
    ));

    let err = h
        .services
        .tasks
        .change_status(task.id, invalid(), &alice)
        .await
        .unwrap_err();
    assert_eq!(violation_fields(err), vec!["status"]);
}

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

fn expect_empty(listing: TaskListing) -> String {
    match listing {
        TaskListing::Empty { message } => message,
        TaskListing::Found(page) => panic!("expected empty listing, got {} tasks", page.content.len()),
    }
}

#[tokio::test]
async fn test_author_listing_empty_messages_follow_filters() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    h.task(&alice, None, "pending", "low").await;

    let tasks = &h.services.tasks;

    let message = expect_empty(
        tasks
            .get_tasks_by_author(alice.user_id, query(Some("COMPLETED"), Some("HIGH")))
            .await
            .unwrap(),
    );
    assert_eq!(message, "No tasks found for this author with the given status and priority");

    let message = expect_empty(
        tasks
            .get_tasks_by_author(alice.user_id, query(Some("COMPLETED"), None))
            .await
            .unwrap(),
    );
    assert_eq!(message, "No tasks found for this author with the given status");

    let message = expect_empty(
        tasks
            .get_tasks_by_author(alice.user_id, query(None, Some("high")))
            .await
            .unwrap(),
    );
    assert_eq!(message, "No tasks found for this author with the given priority");
}

#[tokio::test]
async fn test_assignee_listing_without_tasks() {
    let h = Harness::new();
    let bob = h.user("bob").await;

    let message = expect_empty(
        h.services
            .tasks
            .get_tasks_by_assignee(bob.user_id, ListTasksQuery::default())
            .await
            .unwrap(),
    );
    assert_eq!(message, "No tasks found for this assignee");
}

#[tokio::test]
async fn test_listing_for_unknown_user_is_not_found() {
    let h = Harness::new();

    assert!(matches!(
        h.services.tasks.get_tasks_by_author(7, ListTasksQuery::default()).await,
        Err(ServiceError::UserNotFound(_))
    ));
    assert!(matches!(
        h.services.tasks.get_tasks_by_assignee(7, ListTasksQuery::default()).await,
        Err(ServiceError::UserNotFound(_))
    ));
}

#[tokio::test]
async fn test_listing_pages_in_id_order() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    h.user("bob").await;

    let mut high_ids = Vec::new();
    for i in 0..5 {
        let priority = if i % 2 == 0 { "high" } else { "low" };
        let task = h.task(&alice, Some("bob"), "pending", priority).await;
        if priority == "high" {
            high_ids.push(task.id);
        }
    }

    let listing = h
        .services
        .tasks
        .get_tasks_by_author(
            alice.user_id,
            ListTasksQuery {
                page: Some(0),
                size: Some(2),
                priority: Some("HIGH".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let TaskListing::Found(page) = listing else {
        panic!("expected tasks");
    };
    assert_eq!(page.total_elements, 3);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.content.iter().map(|t| t.id).collect::<Vec<_>>(), high_ids[..2].to_vec());

    let past_end = h
        .services
        .tasks
        .get_tasks_by_author(
            alice.user_id,
            ListTasksQuery {
                page: Some(5),
                size: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(past_end.is_empty());
}

#[tokio::test]
async fn test_listing_rejects_invalid_filters() {
    let h = Harness::new();
    let alice = h.user("alice").await;

    let err = h
        .services
        .tasks
        .get_tasks_by_author(alice.user_id, query(Some("finished"), None))
        .await
        .unwrap_err();
    assert_eq!(violation_fields(err), vec!["status"]);
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_comment_length_limits() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    let task = h.task(&alice, None, "pending", "low").await;
    let comments = &h.services.comments;

    let err = comments
        .add_comment(task.id, comment("x".repeat(141)), &alice)
        .await
        .unwrap_err();
    assert_eq!(violation_fields(err), vec!["content"]);

    let err = comments
        .add_comment(task.id, comment(String::new()), &alice)
        .await
        .unwrap_err();
    assert_eq!(violation_fields(err), vec!["content"]);

    let saved = comments
        .add_comment(task.id, comment("x".repeat(140)), &alice)
        .await
        .unwrap();
    assert_eq!(saved.content.chars().count(), 140);
    assert_eq!(saved.author.username, "alice");
    assert_eq!(saved.task_id, task.id);
}

#[tokio::test]
async fn test_comment_on_missing_task() {
    let h = Harness::new();
    let alice = h.user("alice").await;

    assert!(matches!(
        h.services
            .comments
            .add_comment(9, comment("hello".to_string()), &alice)
            .await,
        Err(ServiceError::TaskNotFound(9))
    ));
    assert!(matches!(
        h.services.comments.get_comments_by_task(9).await,
        Err(ServiceError::TaskNotFound(9))
    ));
}

#[tokio::test]
async fn test_comments_listed_in_insertion_order() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    let bob = h.user("bob").await;
    let task = h.task(&alice, None, "pending", "low").await;
    let other = h.task(&alice, None, "pending", "low").await;

    for (author, text) in [(&alice, "first"), (&bob, "second"), (&alice, "third")] {
        h.services
            .comments
            .add_comment(task.id, comment(text.to_string()), author)
            .await
            .unwrap();
    }
    h.services
        .comments
        .add_comment(other.id, comment("elsewhere".to_string()), &bob)
        .await
        .unwrap();

    let listed = h.services.comments.get_comments_by_task(task.id).await.unwrap();
    let contents: Vec<&str> = listed.iter().map(|c| c.content.as_str()).collect();
    assert_eq!(contents, vec!["first", "second", "third"]);
}

#[tokio::test]
async fn test_only_comment_author_may_delete() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    let bob = h.user("bob").await;
    let task = h.task(&alice, None, "pending", "low").await;

    let by_bob = h
        .services
        .comments
        .add_comment(task.id, comment("mine".to_string()), &bob)
        .await
        .unwrap();

    assert!(matches!(
        h.services.comments.delete_comment(by_bob.id, &alice).await,
        Err(ServiceError::AccessDenied(_))
    ));

    h.services.comments.delete_comment(by_bob.id, &bob).await.unwrap();

    assert!(matches!(
        h.services.comments.delete_comment(by_bob.id, &bob).await,
        Err(ServiceError::CommentNotFound(_))
    ));
    assert!(h
        .services
        .comments
        .get_comments_by_task(task.id)
        .await
        .unwrap()
        .is_empty());
}
