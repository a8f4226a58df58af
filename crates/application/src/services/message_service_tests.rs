//! 消息服务单元测试。

use domain::{DomainError, MessageKind};

use crate::error::ApplicationError;
use crate::services::{JoinRequest, PostMessageRequest, DEPARTURE_NOTICE};
use crate::test_support::{backend, TestBackend};

fn post_request(to: &str, text: &str, kind: &str) -> PostMessageRequest {
    PostMessageRequest {
        to: to.into(),
        text: text.into(),
        kind: kind.into(),
    }
}

fn domain_error(err: ApplicationError) -> DomainError {
    match err {
        ApplicationError::Domain(inner) => inner,
        other => panic!("expected domain error, got {other:?}"),
    }
}

async fn join(backend: &TestBackend, name: &str) {
    backend
        .participant_service
        .join(JoinRequest { name: name.into() })
        .await
        .unwrap();
}

#[tokio::test]
async fn post_from_unknown_sender_writes_nothing() {
    let backend = backend();

    let err = backend
        .message_service
        .post("Ana", post_request("Todos", "oi", "message"))
        .await
        .unwrap_err();

    assert!(matches!(
        domain_error(err),
        DomainError::UnknownSender { name } if name == "Ana"
    ));
    assert!(backend
        .message_service
        .list_for("Ana", None)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn post_broadcast_message_visible_to_everyone() {
    let backend = backend();
    join(&backend, "Ana").await;

    let posted = backend
        .message_service
        .post("Ana", post_request("Todos", "oi galera", "message"))
        .await
        .unwrap();
    assert_eq!(posted.kind, MessageKind::Message);
    assert_eq!(posted.time.as_str().len(), 8);

    let seen = backend.message_service.list_for("Bia", None).await.unwrap();
    assert!(seen.iter().any(|m| m.text.as_str() == "oi galera"));
}

#[tokio::test]
async fn public_message_to_named_recipient_still_visible_to_third_party() {
    let backend = backend();
    join(&backend, "Ana").await;

    backend
        .message_service
        .post("Ana", post_request("Carol", "oi", "message"))
        .await
        .unwrap();

    let seen = backend.message_service.list_for("Bob", None).await.unwrap();
    assert!(seen.iter().any(|m| m.text.as_str() == "oi"));
}

#[tokio::test]
async fn private_message_hidden_from_third_parties() {
    let backend = backend();
    join(&backend, "Ana").await;

    backend
        .message_service
        .post("Ana", post_request("Carol", "segredo", "private_message"))
        .await
        .unwrap();

    let for_bob = backend.message_service.list_for("Bob", None).await.unwrap();
    assert!(!for_bob.iter().any(|m| m.text.as_str() == "segredo"));

    let for_carol = backend
        .message_service
        .list_for("Carol", None)
        .await
        .unwrap();
    assert!(for_carol.iter().any(|m| m.text.as_str() == "segredo"));

    let for_ana = backend.message_service.list_for("Ana", None).await.unwrap();
    assert!(for_ana.iter().any(|m| m.text.as_str() == "segredo"));
}

#[tokio::test]
async fn post_sanitizes_recipient_and_text() {
    let backend = backend();
    join(&backend, "Ana").await;

    let posted = backend
        .message_service
        .post(
            "Ana",
            post_request(" <b>Bia</b> ", " <script>oi</script> tudo bem ", "message"),
        )
        .await
        .unwrap();

    assert_eq!(posted.to.as_str(), "Bia");
    assert_eq!(posted.text.as_str(), "oi tudo bem");
}

#[tokio::test]
async fn post_reports_every_violated_field_in_order() {
    let backend = backend();
    join(&backend, "Ana").await;

    let err = backend
        .message_service
        .post("Ana", post_request("", "", "gossip"))
        .await
        .unwrap_err();

    match domain_error(err) {
        DomainError::Validation { errors } => {
            assert_eq!(
                errors,
                vec![
                    "to must not be empty".to_string(),
                    "text must not be empty".to_string(),
                    "type must be one of message, private_message".to_string(),
                ]
            );
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn post_rejects_status_kind_from_users() {
    let backend = backend();
    join(&backend, "Ana").await;

    let err = backend
        .message_service
        .post("Ana", post_request("Todos", "oi", "status"))
        .await
        .unwrap_err();
    assert!(matches!(domain_error(err), DomainError::Validation { .. }));
}

#[tokio::test]
async fn list_for_honors_limit_keeping_most_recent_in_insertion_order() {
    let backend = backend();
    join(&backend, "Ana").await;
    for text in ["um", "dois", "tres"] {
        backend
            .message_service
            .post("Ana", post_request("Todos", text, "message"))
            .await
            .unwrap();
    }

    let limited = backend
        .message_service
        .list_for("Bia", Some("2".into()))
        .await
        .unwrap();

    let texts: Vec<&str> = limited.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["dois", "tres"]);
}

#[tokio::test]
async fn list_for_rejects_non_positive_limit() {
    let backend = backend();
    join(&backend, "Ana").await;

    for raw in ["0", "-1", "abc", "1.5"] {
        let err = backend
            .message_service
            .list_for("Ana", Some(raw.into()))
            .await
            .unwrap_err();
        assert!(matches!(
            domain_error(err),
            DomainError::InvalidLimit { value } if value == raw
        ));
    }
}

#[tokio::test]
async fn anonymous_viewer_sees_only_public_and_broadcast() {
    let backend = backend();
    join(&backend, "Ana").await;
    backend
        .message_service
        .post("Ana", post_request("Todos", "publica", "message"))
        .await
        .unwrap();
    backend
        .message_service
        .post("Ana", post_request("Bia", "privada", "private_message"))
        .await
        .unwrap();

    let seen = backend.message_service.list_for("", None).await.unwrap();
    assert!(seen.iter().any(|m| m.text.as_str() == "publica"));
    assert!(!seen.iter().any(|m| m.text.as_str() == "privada"));
}

#[tokio::test]
async fn edit_replaces_fields_keeping_author_and_time() {
    let backend = backend();
    join(&backend, "Ana").await;
    let posted = backend
        .message_service
        .post("Ana", post_request("Bia", "oi", "private_message"))
        .await
        .unwrap();

    let edited = backend
        .message_service
        .edit(
            posted.id,
            "Ana",
            post_request("Todos", "<b>tchau</b>", "message"),
        )
        .await
        .unwrap();

    assert_eq!(edited.from.as_str(), "Ana");
    assert_eq!(edited.time, posted.time);
    assert_eq!(edited.to.as_str(), "Todos");
    assert_eq!(edited.text.as_str(), "tchau");
    assert_eq!(edited.kind, MessageKind::Message);

    let stored = backend
        .message_service
        .list_for("Ana", None)
        .await
        .unwrap()
        .into_iter()
        .find(|m| m.id == posted.id)
        .unwrap();
    assert_eq!(stored, edited);
}

#[tokio::test]
async fn edit_by_non_author_is_forbidden_and_message_unchanged() {
    let backend = backend();
    join(&backend, "Ana").await;
    join(&backend, "Bia").await;
    let posted = backend
        .message_service
        .post("Ana", post_request("Todos", "oi", "message"))
        .await
        .unwrap();

    let err = backend
        .message_service
        .edit(posted.id, "Bia", post_request("Todos", "hackeada", "message"))
        .await
        .unwrap_err();
    assert!(matches!(domain_error(err), DomainError::Forbidden));

    let stored = backend
        .message_service
        .list_for("Ana", None)
        .await
        .unwrap()
        .into_iter()
        .find(|m| m.id == posted.id)
        .unwrap();
    assert_eq!(stored.text.as_str(), "oi");
}

#[tokio::test]
async fn edit_unknown_message_is_not_found() {
    let backend = backend();
    join(&backend, "Ana").await;

    let missing = domain::MessageId::from(uuid::Uuid::new_v4());
    let err = backend
        .message_service
        .edit(missing, "Ana", post_request("Todos", "oi", "message"))
        .await
        .unwrap_err();
    assert!(matches!(domain_error(err), DomainError::MessageNotFound));
}

#[tokio::test]
async fn edit_by_inactive_caller_is_rejected() {
    let backend = backend();
    join(&backend, "Ana").await;
    let posted = backend
        .message_service
        .post("Ana", post_request("Todos", "oi", "message"))
        .await
        .unwrap();

    let err = backend
        .message_service
        .edit(posted.id, "Carol", post_request("Todos", "oi", "message"))
        .await
        .unwrap_err();
    assert!(matches!(
        domain_error(err),
        DomainError::UnknownSender { name } if name == "Carol"
    ));
}

#[tokio::test]
async fn delete_by_author_removes_message() {
    let backend = backend();
    join(&backend, "Ana").await;
    let posted = backend
        .message_service
        .post("Ana", post_request("Todos", "oi", "message"))
        .await
        .unwrap();

    backend
        .message_service
        .delete(posted.id, "Ana")
        .await
        .unwrap();

    use crate::repository::MessageRepository;
    assert!(backend.messages.find_by_id(posted.id).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_by_non_author_is_forbidden_and_message_kept() {
    let backend = backend();
    join(&backend, "Ana").await;
    let posted = backend
        .message_service
        .post("Ana", post_request("Todos", "oi", "message"))
        .await
        .unwrap();

    let err = backend
        .message_service
        .delete(posted.id, "Bia")
        .await
        .unwrap_err();
    assert!(matches!(domain_error(err), DomainError::Forbidden));

    let remaining = backend.message_service.list_for("Ana", None).await.unwrap();
    assert!(remaining.iter().any(|m| m.id == posted.id));
}

#[tokio::test]
async fn delete_unknown_message_is_not_found() {
    let backend = backend();

    let missing = domain::MessageId::from(uuid::Uuid::new_v4());
    let err = backend
        .message_service
        .delete(missing, "Ana")
        .await
        .unwrap_err();
    assert!(matches!(domain_error(err), DomainError::MessageNotFound));
}

#[tokio::test]
async fn departure_notice_skips_sender_existence_check() {
    let backend = backend();

    let name = domain::ParticipantName::parse("Ana").unwrap();
    let notice = backend
        .message_service
        .post_departure_notice(&name)
        .await
        .unwrap();

    assert_eq!(notice.kind, MessageKind::Status);
    assert!(notice.to.is_broadcast());
    assert_eq!(notice.text.as_str(), DEPARTURE_NOTICE);

    let seen = backend.message_service.list_for("Bia", None).await.unwrap();
    assert!(seen.iter().any(|m| m.id == notice.id));
}
