//! Drives the people client against the real router without a socket

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Request},
    Router,
};
use serde_json::json;
use tower::ServiceExt;

use people_service_client::{ClientError, ClientResult, PeopleClient, Transport, TransportResponse};
use people_service_core::core::{create_app_state, Config, Environment};
use people_service_core::types::{Name, Person};
use people_service_core::{Query, Record, UpdateFieldCommand};
use people_service_server::create_router;

/// Sends client requests straight into the router
struct RouterTransport {
    router: Router,
}

#[async_trait]
impl Transport for RouterTransport {
    async fn post(&self, body: Vec<u8>) -> ClientResult<TransportResponse> {
        let request = Request::builder()
            .method("POST")
            .uri("/api/people")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .map_err(ClientError::transport)?;

        let response = self.router.clone().oneshot(request).await.map_err(ClientError::transport)?;
        let status = response.status().as_u16();
        let body = to_bytes(response.into_body(), usize::MAX).await.map_err(ClientError::transport)?;
        Ok(TransportResponse { status, body: body.to_vec() })
    }
}

async fn client_for(environment: Environment) -> PeopleClient<RouterTransport> {
    let mut config = Config::default();
    config.server.environment = environment;
    let state = create_app_state(config).unwrap();
    state.db.connect().await.unwrap();
    PeopleClient::new(RouterTransport { router: create_router(state) })
}

#[tokio::test]
async fn test_crud_through_client() {
    let client = client_for(Environment::Development).await;

    let created = client.create(Record::new().with("account_email", "a@b.co")).await.unwrap();
    let id = created.id().unwrap().to_string();
    assert_eq!(client.read(&id).await.unwrap(), created);

    let updated = client
        .update(&id, vec![UpdateFieldCommand::set("account_email", "bubba.smith@test.co")])
        .await
        .unwrap();
    assert_eq!(updated["account_email"], json!("bubba.smith@test.co"));

    let replaced = client.replace(Record::new().with("_id", id.clone()).with("locale", "ja_JP")).await.unwrap();
    assert_eq!(replaced.get("account_email"), None);

    client.delete(&id).await.unwrap();
    match client.read(&id).await.unwrap_err() {
        ClientError::Server { status, message, stack } => {
            assert_eq!(status, 400);
            assert_eq!(message, "_id is invalid");
            assert!(stack.is_some());
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_production_errors_are_bare_status() {
    let client = client_for(Environment::Production).await;
    assert!(matches!(client.read("missing").await, Err(ClientError::Status(400))));
}

#[tokio::test]
async fn test_people_helpers() {
    let client = client_for(Environment::Test).await;

    let bob = Person {
        account_email: Some("bob@test.co".into()),
        name: Some(Name { given: Some("Bob".into()), family: Some("Smith".into()), additional: None }),
        locale: Some("ja_JP".into()),
        ..Default::default()
    };
    let mut saved = client.save(bob).await.unwrap();
    let id = saved.id.clone().unwrap();
    assert_eq!(saved.full_name().unwrap(), "Smith Bob");

    saved.locale = Some("en_US".into());
    client.save(saved).await.unwrap();

    let fetched = client.get_person(&id).await.unwrap();
    assert_eq!(fetched.full_name().unwrap(), "Bob Smith");

    for n in 0..11 {
        client.create(Record::new().with("account_email", format!("p{}@test.co", n))).await.unwrap();
    }
    assert_eq!(client.get_people().await.unwrap().len(), 10);
    assert_eq!(client.find(Query::default()).await.unwrap().len(), 10);
}
