//! Tests for mailbox API handlers.

use super::*;
use crate::domain::ports::{MockMailboxCommand, MockMailboxQuery, SendOutcome};
use crate::domain::{
    EmailAddress, Error, Folder, MessageId, SenderProfile, TimeBucket, UserId,
};
use crate::inbound::http::state::HttpStatePorts;
use crate::inbound::http::users::login;
use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test};
use chrono::{TimeZone, Utc};
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use std::sync::Arc;

const FIXTURE_ID: &str = "123e4567-e89b-12d3-a456-426614174000";
const MESSAGE_ID: &str = "6f1c6c1e-5c38-4f63-9a55-1d8f3ad0d1b2";

fn email(raw: &str) -> EmailAddress {
    EmailAddress::parse(raw).expect("valid email")
}

#[fixture]
fn stored_message() -> Message {
    Message {
        id: MessageId::from_uuid(MESSAGE_ID.parse().expect("uuid")),
        sender_id: UserId::new(FIXTURE_ID).expect("id"),
        sender_email: email("ada@gmail.com"),
        to: vec![email("grace@outlook.com")],
        subject: "Lunch?".into(),
        content: "Noon works".into(),
        preview: "Noon works...".into(),
        section: TimeBucket::Today,
        read: false,
        pinned: false,
        created_at: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).single().expect("time"),
    }
}

fn test_app(
    ports: HttpStatePorts,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(HttpState::new(ports)))
        .wrap(crate::inbound::http::test_utils::test_session_middleware())
        .service(
            web::scope("/api/v1")
                .service(login)
                .service(send_message)
                .service(list_messages)
                .service(mark_read)
                .service(toggle_pin)
                .service(delete_message),
        )
}

fn with_mailbox(command: MockMailboxCommand, query: MockMailboxQuery) -> HttpStatePorts {
    HttpStatePorts {
        mailbox: Arc::new(command),
        mailbox_query: Arc::new(query),
        ..HttpStatePorts::fixtures()
    }
}

async fn login_cookie(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
) -> Cookie<'static> {
    let res = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({"email": "ada@gmail.com", "password": "password"}))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    res.response()
        .cookies()
        .find(|c| c.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie")
}

#[rstest]
#[actix_web::test]
async fn send_returns_created_with_notification_outcome(stored_message: Message) {
    let mut command = MockMailboxCommand::new();
    command
        .expect_send()
        .withf(|caller, draft| {
            caller.email().as_ref() == "ada@gmail.com"
                && draft.to == vec!["grace@outlook.com".to_owned()]
                && draft.subject == "Lunch?"
        })
        .times(1)
        .returning(move |_, _| {
            Ok(SendOutcome {
                message: stored_message.clone(),
                notification: NotificationOutcome::Failed,
            })
        });
    let app = actix_test::init_service(test_app(with_mailbox(command, MockMailboxQuery::new())))
        .await;
    let cookie = login_cookie(&app).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/messages")
            .cookie(cookie)
            .set_json(json!({
                "to": ["grace@outlook.com"],
                "subject": "Lunch?",
                "content": "Noon works"
            }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["notification"], "failed");
    assert_eq!(body["message"]["id"], MESSAGE_ID);
    assert_eq!(body["message"]["senderEmail"], "ada@gmail.com");
    assert_eq!(body["message"]["to"], json!(["grace@outlook.com"]));
    assert_eq!(body["message"]["section"], "Today");
    assert_eq!(body["message"]["preview"], "Noon works...");
}

#[actix_web::test]
async fn send_requires_a_session() {
    let mut command = MockMailboxCommand::new();
    command.expect_send().never();
    let app = actix_test::init_service(test_app(with_mailbox(command, MockMailboxQuery::new())))
        .await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/messages")
            .set_json(json!({"to": ["grace@outlook.com"], "subject": "s", "content": "c"}))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn send_passes_validation_errors_through() {
    let mut command = MockMailboxCommand::new();
    command.expect_send().returning(|_, _| {
        Err(Error::invalid_request(
            "The following recipients are not registered: nobody@gmail.com",
        )
        .with_details(json!({
            "field": "to",
            "code": "unknown_recipients",
            "addresses": ["nobody@gmail.com"]
        })))
    });
    let app = actix_test::init_service(test_app(with_mailbox(command, MockMailboxQuery::new())))
        .await;
    let cookie = login_cookie(&app).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/messages")
            .cookie(cookie)
            .set_json(json!({"to": ["nobody@gmail.com"], "subject": "s", "content": "c"}))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["details"]["code"], "unknown_recipients");
    assert_eq!(body["details"]["addresses"], json!(["nobody@gmail.com"]));
}

#[rstest]
#[actix_web::test]
async fn list_defaults_to_inbox_and_sets_validators(stored_message: Message) {
    let entry = MailboxEntry {
        message: stored_message,
        sender: SenderProfile {
            display_name: "Ada Lovelace".into(),
            email: email("ada@gmail.com"),
            avatar_url: None,
        },
    };
    let expected_tag =
        mailbox_etag(&email("ada@gmail.com"), Folder::Inbox, std::slice::from_ref(&entry))
            .to_string();
    let mut query = MockMailboxQuery::new();
    query
        .expect_list_mailbox()
        .withf(|caller, folder| caller.email().as_ref() == "ada@gmail.com" && *folder == Folder::Inbox)
        .times(1)
        .returning(move |_, _| Ok(vec![entry.clone()]));
    let app = actix_test::init_service(test_app(with_mailbox(MockMailboxCommand::new(), query)))
        .await;
    let cookie = login_cookie(&app).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/messages")
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()
            .get(header::CACHE_CONTROL)
            .and_then(|v| v.to_str().ok()),
        Some("private, no-cache, must-revalidate")
    );
    assert_eq!(
        res.headers().get(header::ETAG).and_then(|v| v.to_str().ok()),
        Some(expected_tag.as_str())
    );
    let body: Value = actix_test::read_body_json(res).await;
    let first = &body.as_array().expect("array")[0];
    assert_eq!(first["id"], MESSAGE_ID);
    assert_eq!(first["sender"]["displayName"], "Ada Lovelace");
}

#[rstest]
#[actix_web::test]
async fn matching_etag_answers_not_modified_without_body(stored_message: Message) {
    let entry = MailboxEntry {
        message: stored_message,
        sender: SenderProfile {
            display_name: "Ada Lovelace".into(),
            email: email("ada@gmail.com"),
            avatar_url: None,
        },
    };
    let etag = mailbox_etag(&email("ada@gmail.com"), Folder::Sent, std::slice::from_ref(&entry));
    let mut query = MockMailboxQuery::new();
    query
        .expect_list_mailbox()
        .withf(|_, folder| *folder == Folder::Sent)
        .times(1)
        .returning(move |_, _| Ok(vec![entry.clone()]));
    let app = actix_test::init_service(test_app(with_mailbox(MockMailboxCommand::new(), query)))
        .await;
    let cookie = login_cookie(&app).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/messages?folder=sent")
            .cookie(cookie)
            .insert_header((header::IF_NONE_MATCH, etag.to_string()))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::NOT_MODIFIED);
    let body = actix_test::read_body(res).await;
    assert!(body.is_empty());
}

#[actix_web::test]
async fn unknown_folder_is_rejected() {
    let mut query = MockMailboxQuery::new();
    query.expect_list_mailbox().never();
    let app = actix_test::init_service(test_app(with_mailbox(MockMailboxCommand::new(), query)))
        .await;
    let cookie = login_cookie(&app).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/messages?folder=drafts")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn store_failure_is_service_unavailable_not_empty_list() {
    let mut query = MockMailboxQuery::new();
    query
        .expect_list_mailbox()
        .returning(|_, _| Err(Error::service_unavailable("mailbox is temporarily unavailable")));
    let app = actix_test::init_service(test_app(with_mailbox(MockMailboxCommand::new(), query)))
        .await;
    let cookie = login_cookie(&app).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/messages?folder=all")
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["code"], "service_unavailable");
}

#[actix_web::test]
async fn mark_read_reports_read_true() {
    let mut command = MockMailboxCommand::new();
    command
        .expect_mark_read()
        .withf(|_, id| id.to_string() == MESSAGE_ID)
        .times(1)
        .returning(|_, _| Ok(()));
    let app = actix_test::init_service(test_app(with_mailbox(command, MockMailboxQuery::new())))
        .await;
    let cookie = login_cookie(&app).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/messages/{MESSAGE_ID}/read"))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body, json!({"id": MESSAGE_ID, "read": true}));
}

#[rstest]
#[case(true)]
#[case(false)]
#[actix_web::test]
async fn toggle_pin_reports_new_state(#[case] pinned: bool) {
    let mut command = MockMailboxCommand::new();
    command
        .expect_toggle_pin()
        .times(1)
        .returning(move |_, _| Ok(pinned));
    let app = actix_test::init_service(test_app(with_mailbox(command, MockMailboxQuery::new())))
        .await;
    let cookie = login_cookie(&app).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/messages/{MESSAGE_ID}/pin"))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body, json!({"id": MESSAGE_ID, "pinned": pinned}));
}

#[rstest]
#[case(Error::forbidden("not a participant of this message"), StatusCode::FORBIDDEN)]
#[case(Error::not_found("message not found"), StatusCode::NOT_FOUND)]
#[actix_web::test]
async fn delete_maps_authorisation_failures(#[case] error: Error, #[case] status: StatusCode) {
    let mut command = MockMailboxCommand::new();
    command
        .expect_delete()
        .times(1)
        .returning(move |_, _| Err(error.clone()));
    let app = actix_test::init_service(test_app(with_mailbox(command, MockMailboxQuery::new())))
        .await;
    let cookie = login_cookie(&app).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/messages/{MESSAGE_ID}"))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), status);
}

#[actix_web::test]
async fn delete_returns_no_content() {
    let mut command = MockMailboxCommand::new();
    command.expect_delete().times(1).returning(|_, _| Ok(()));
    let app = actix_test::init_service(test_app(with_mailbox(command, MockMailboxQuery::new())))
        .await;
    let cookie = login_cookie(&app).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/messages/{MESSAGE_ID}"))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn malformed_id_never_reaches_the_port() {
    let mut command = MockMailboxCommand::new();
    command.expect_delete().never();
    let app = actix_test::init_service(test_app(with_mailbox(command, MockMailboxQuery::new())))
        .await;
    let cookie = login_cookie(&app).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri("/api/v1/messages/42")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
