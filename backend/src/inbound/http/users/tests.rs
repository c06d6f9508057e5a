//! Tests for account API handlers.

use super::*;
use crate::domain::ports::MockAccountCommand;
use crate::domain::{DisplayName, EmailAddress, Error, UserId};
use crate::inbound::http::state::HttpStatePorts;
use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test};
use rstest::rstest;
use serde_json::{Value, json};
use std::sync::Arc;

const FIXTURE_ID: &str = "123e4567-e89b-12d3-a456-426614174000";

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
                .service(register)
                .service(login)
                .service(logout)
                .service(current_user)
                .service(change_password),
        )
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
            .set_json(json!({"email": "Ada@Gmail.com", "password": "password"}))
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

async fn error_body(res: actix_web::dev::ServiceResponse) -> Value {
    let body = actix_test::read_body(res).await;
    serde_json::from_slice(&body).expect("error payload")
}

#[actix_web::test]
async fn login_returns_profile_and_sets_cookie() {
    let app = actix_test::init_service(test_app(HttpStatePorts::fixtures())).await;
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({"email": "ada@gmail.com", "password": "password"}))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.response().cookies().any(|c| c.name() == "session"));
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["id"], FIXTURE_ID);
    assert_eq!(body["displayName"], "Ada Lovelace");
    assert_eq!(body["email"], "ada@gmail.com");
}

#[rstest]
#[case(json!({"email": "not-an-email", "password": "password"}), "email", "invalid_email")]
#[case(json!({"email": "ada@gmail.com", "password": ""}), "password", "empty_password")]
#[actix_web::test]
async fn login_rejects_malformed_payloads(
    #[case] payload: Value,
    #[case] field: &str,
    #[case] code: &str,
) {
    let app = actix_test::init_service(test_app(HttpStatePorts::fixtures())).await;
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(payload)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = error_body(res).await;
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["details"]["field"], field);
    assert_eq!(body["details"]["code"], code);
}

#[actix_web::test]
async fn wrong_password_is_unauthorised() {
    let app = actix_test::init_service(test_app(HttpStatePorts::fixtures())).await;
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({"email": "ada@gmail.com", "password": "wrong-password"}))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = error_body(res).await;
    assert_eq!(body["message"], "invalid credentials");
    assert_eq!(body["code"], "unauthorized");
}

#[actix_web::test]
async fn current_user_requires_session() {
    let app = actix_test::init_service(test_app(HttpStatePorts::fixtures())).await;
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/users/me")
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn current_user_returns_camel_case_profile() {
    let app = actix_test::init_service(test_app(HttpStatePorts::fixtures())).await;
    let cookie = login_cookie(&app).await;
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/users/me")
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["displayName"], "Ada Lovelace");
    assert!(body.get("display_name").is_none());
    assert!(body.get("passwordHash").is_none());
}

#[actix_web::test]
async fn logout_clears_the_session() {
    let app = actix_test::init_service(test_app(HttpStatePorts::fixtures())).await;
    let cookie = login_cookie(&app).await;
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/logout")
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let removal = res
        .response()
        .cookies()
        .find(|c| c.name() == "session")
        .expect("removal cookie");
    assert_eq!(removal.value(), "");
}

#[actix_web::test]
async fn register_creates_account_and_signs_in() {
    let mut accounts = MockAccountCommand::new();
    accounts
        .expect_register()
        .withf(|draft| {
            draft.email().as_ref() == "grace@outlook.com"
                && draft.display_name().as_ref() == "Grace Hopper"
        })
        .times(1)
        .returning(|draft| {
            Ok(User::new(
                UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("id"),
                DisplayName::new(draft.display_name().to_string()).expect("name"),
                EmailAddress::parse(draft.email().as_ref()).expect("email"),
            ))
        });
    let ports = HttpStatePorts {
        accounts: Arc::new(accounts),
        ..HttpStatePorts::fixtures()
    };
    let app = actix_test::init_service(test_app(ports)).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/register")
            .set_json(json!({
                "firstName": "Grace",
                "lastName": "Hopper",
                "email": "Grace@Outlook.com",
                "password": "cobol-1959"
            }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::CREATED);
    assert!(res.response().cookies().any(|c| c.name() == "session"));
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["email"], "grace@outlook.com");
}

#[actix_web::test]
async fn register_surfaces_duplicate_email_as_conflict() {
    let mut accounts = MockAccountCommand::new();
    accounts
        .expect_register()
        .returning(|_| Err(Error::conflict("an account with this email already exists")));
    let ports = HttpStatePorts {
        accounts: Arc::new(accounts),
        ..HttpStatePorts::fixtures()
    };
    let app = actix_test::init_service(test_app(ports)).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/register")
            .set_json(json!({
                "firstName": "Ada",
                "lastName": "Lovelace",
                "email": "ada@gmail.com",
                "password": "analytical"
            }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert!(!res.response().cookies().any(|c| c.name() == "session"));
}

#[actix_web::test]
async fn register_rejects_short_password_before_calling_port() {
    let mut accounts = MockAccountCommand::new();
    accounts.expect_register().never();
    let ports = HttpStatePorts {
        accounts: Arc::new(accounts),
        ..HttpStatePorts::fixtures()
    };
    let app = actix_test::init_service(test_app(ports)).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/register")
            .set_json(json!({
                "firstName": "Ada",
                "lastName": "Lovelace",
                "email": "ada@gmail.com",
                "password": "short"
            }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = error_body(res).await;
    assert_eq!(body["details"]["code"], "password_too_short");
}

#[actix_web::test]
async fn change_password_delegates_for_the_session_user() {
    let mut accounts = MockAccountCommand::new();
    accounts
        .expect_change_password()
        .withf(|user_id, change| {
            user_id.to_string() == FIXTURE_ID
                && change.current() == "password"
                && change.replacement() == "correct horse battery"
        })
        .times(1)
        .returning(|_, _| Ok(()));
    let ports = HttpStatePorts {
        accounts: Arc::new(accounts),
        ..HttpStatePorts::fixtures()
    };
    let app = actix_test::init_service(test_app(ports)).await;
    let cookie = login_cookie(&app).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri("/api/v1/users/me/password")
            .cookie(cookie)
            .set_json(json!({
                "currentPassword": "password",
                "newPassword": "correct horse battery"
            }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}
