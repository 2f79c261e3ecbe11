//! People endpoint client
//!
//! Builds request envelopes, posts them through a [`Transport`] and unwraps
//! the response envelope. There are no retries; errors reach the caller
//! unchanged.

use people_service_core::core::config::ClientConfig;
use people_service_core::types::{Conditions, Person};
use people_service_core::{log_debug, log_warn, Data, Query, Record, Request, Response, UpdateFieldCommand};

use crate::error::{ClientError, ClientResult};
use crate::transport::{HttpTransport, Transport, TransportResponse};

/// Client for `POST /api/people`
pub struct PeopleClient<T: Transport> {
    transport: T,
}

impl PeopleClient<HttpTransport> {
    /// HTTP client built from the client configuration section
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        Ok(Self::new(HttpTransport::from_config(config)?))
    }
}

impl<T: Transport> PeopleClient<T> {
    /// Creates a client over any transport
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Post one envelope and unwrap the reply
    pub async fn send(&self, request: &Request) -> ClientResult<Response> {
        let body = serde_json::to_vec(request)?;
        log_debug!(action = %request.action, bytes = body.len(), "posting request");

        let reply = self.transport.post(body).await?;
        unwrap_response(reply).inspect_err(|e| {
            log_warn!(action = %request.action, status = ?e.status(), "request failed: {}", e);
        })
    }

    /// Create a record; the server assigns `_id`
    pub async fn create(&self, obj: Record) -> ClientResult<Record> {
        let response = self.send(&Request::create(obj)).await?;
        expect_record(response)
    }

    /// Read a record by id
    pub async fn read(&self, id: &str) -> ClientResult<Record> {
        let response = self.send(&Request::read(id)).await?;
        expect_record(response)
    }

    /// Overwrite a record that carries an `_id`
    pub async fn replace(&self, obj: Record) -> ClientResult<Record> {
        let response = self.send(&Request::replace(obj)).await?;
        expect_record(response)
    }

    /// Apply field commands to the record with the given id
    pub async fn update(&self, id: &str, updates: Vec<UpdateFieldCommand>) -> ClientResult<Record> {
        let response = self.send(&Request::update(id, updates)).await?;
        expect_record(response)
    }

    /// Delete a record by id
    pub async fn delete(&self, id: &str) -> ClientResult<()> {
        self.send(&Request::delete(id)).await?;
        Ok(())
    }

    /// List records matching a query
    pub async fn find(&self, query: Query) -> ClientResult<Vec<Record>> {
        let response = self.send(&Request::find(query)).await?;
        match response.data {
            Some(Data::Records(records)) => Ok(records),
            other => Err(unexpected("a record list", other)),
        }
    }

    /// First page of all people
    pub async fn get_people(&self) -> ClientResult<Vec<Person>> {
        let records = self.find(Query::with_conditions(Conditions::new())).await?;
        records.into_iter().map(to_person).collect()
    }

    /// One person by id
    pub async fn get_person(&self, id: &str) -> ClientResult<Person> {
        to_person(self.read(id).await?)
    }

    /// Create the person when it has no `_id`, replace it otherwise
    pub async fn save(&self, person: Person) -> ClientResult<Person> {
        let record = person
            .into_record()
            .map_err(|e| ClientError::UnexpectedPayload(e.to_string()))?;

        let saved = if record.has_id() {
            self.replace(record).await?
        } else {
            self.create(record).await?
        };
        to_person(saved)
    }
}

/// Turn a raw reply into a response envelope or an error
fn unwrap_response(reply: TransportResponse) -> ClientResult<Response> {
    let success = (200..300).contains(&reply.status);

    if reply.body.is_empty() {
        return if success { Ok(Response::empty()) } else { Err(ClientError::Status(reply.status)) };
    }

    let envelope: Response = match serde_json::from_slice(&reply.body) {
        Ok(envelope) => envelope,
        Err(_) if !success => return Err(ClientError::Status(reply.status)),
        Err(e) => return Err(e.into()),
    };

    if let Some(error) = envelope.error {
        return Err(ClientError::Server {
            status: reply.status,
            message: error.message,
            stack: error.stack,
        });
    }
    if !success {
        return Err(ClientError::Status(reply.status));
    }
    Ok(envelope)
}

fn expect_record(response: Response) -> ClientResult<Record> {
    match response.data {
        Some(Data::Record(record)) => Ok(record),
        other => Err(unexpected("a record", other)),
    }
}

fn unexpected(wanted: &str, got: Option<Data>) -> ClientError {
    let got = match got {
        Some(Data::Record(_)) => "a record",
        Some(Data::Records(_)) => "a record list",
        None => "no data",
    };
    ClientError::UnexpectedPayload(format!("expected {}, got {}", wanted, got))
}

fn to_person(record: Record) -> ClientResult<Person> {
    Person::from_record(record).map_err(|e| ClientError::UnexpectedPayload(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    /// Replays canned replies and records what was posted
    struct MockTransport {
        replies: Mutex<Vec<TransportResponse>>,
        posted: Mutex<Vec<Value>>,
    }

    impl MockTransport {
        fn new(replies: Vec<(u16, Value)>) -> Self {
            let replies = replies
                .into_iter()
                .rev()
                .map(|(status, body)| TransportResponse {
                    status,
                    body: if body.is_null() { Vec::new() } else { body.to_string().into_bytes() },
                })
                .collect();
            Self { replies: Mutex::new(replies), posted: Mutex::new(Vec::new()) }
        }

        fn posted(&self) -> Vec<Value> {
            self.posted.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn post(&self, body: Vec<u8>) -> ClientResult<TransportResponse> {
            self.posted.lock().unwrap().push(serde_json::from_slice(&body).unwrap());
            self.replies
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| ClientError::transport("no more replies"))
        }
    }

    fn client(replies: Vec<(u16, Value)>) -> PeopleClient<MockTransport> {
        PeopleClient::new(MockTransport::new(replies))
    }

    #[tokio::test]
    async fn test_create_posts_envelope_and_unwraps_data() {
        let client = client(vec![(200, json!({"data": {"_id": "abc", "account_email": "a@b.co"}}))]);

        let created = client.create(Record::new().with("account_email", "a@b.co")).await.unwrap();
        assert_eq!(created.id(), Some("abc"));
        assert_eq!(
            client.transport().posted(),
            vec![json!({"action": "create", "obj": {"account_email": "a@b.co"}})]
        );
    }

    #[tokio::test]
    async fn test_error_envelope_becomes_server_error() {
        let client = client(vec![(400, json!({"error": {"message": "_id is invalid", "stack": "Error: _id is invalid"}}))]);

        match client.read("nope").await.unwrap_err() {
            ClientError::Server { status, message, stack } => {
                assert_eq!(status, 400);
                assert_eq!(message, "_id is invalid");
                assert_eq!(stack.as_deref(), Some("Error: _id is invalid"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(client.transport().posted()[0], json!({"action": "read", "query": {"ids": ["nope"]}}));
    }

    #[tokio::test]
    async fn test_bare_failure_status() {
        let client = client(vec![(400, Value::Null), (500, Value::Null)]);

        assert!(matches!(client.read("x").await, Err(ClientError::Status(400))));
        assert!(matches!(client.find(Query::default()).await, Err(ClientError::Status(500))));
    }

    #[tokio::test]
    async fn test_delete_accepts_empty_object() {
        let client = client(vec![(200, json!({}))]);
        client.delete("abc").await.unwrap();
        assert_eq!(client.transport().posted()[0], json!({"action": "delete", "query": {"ids": ["abc"]}}));
    }

    #[tokio::test]
    async fn test_find_requires_list() {
        let client = client(vec![(200, json!({"data": [{"_id": "a"}, {"_id": "b"}]})), (200, json!({"data": {"_id": "a"}}))]);

        let records = client.find(Query::default()).await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(matches!(client.find(Query::default()).await, Err(ClientError::UnexpectedPayload(_))));
    }

    #[tokio::test]
    async fn test_update_wire_shape() {
        let client = client(vec![(200, json!({"data": {"_id": "abc", "locale": "fr_FR"}}))]);

        let updated = client.update("abc", vec![UpdateFieldCommand::set("locale", "fr_FR")]).await.unwrap();
        assert_eq!(updated["locale"], json!("fr_FR"));
        assert_eq!(
            client.transport().posted()[0],
            json!({
                "action": "update",
                "query": {"conditions": {"_id": "abc"}},
                "updates": [{"cmd": "set", "field": "locale", "value": "fr_FR"}]
            })
        );
    }

    #[tokio::test]
    async fn test_get_people_finds_with_empty_conditions() {
        let client = client(vec![(200, json!({"data": [{"_id": "a", "name": {"given": "Bob"}}]}))]);

        let people = client.get_people().await.unwrap();
        assert_eq!(people[0].id.as_deref(), Some("a"));
        assert_eq!(client.transport().posted()[0], json!({"action": "find", "query": {"conditions": {}}}));
    }

    #[tokio::test]
    async fn test_save_picks_create_or_replace() {
        let client = client(vec![
            (200, json!({"data": {"_id": "new", "account_email": "a@b.co"}})),
            (200, json!({"data": {"_id": "new", "account_email": "c@d.co"}})),
        ]);

        let person = Person { account_email: Some("a@b.co".into()), ..Default::default() };
        let mut saved = client.save(person).await.unwrap();
        assert_eq!(saved.id.as_deref(), Some("new"));

        saved.account_email = Some("c@d.co".into());
        client.save(saved).await.unwrap();

        let posted = client.transport().posted();
        assert_eq!(posted[0]["action"], json!("create"));
        assert_eq!(posted[1]["action"], json!("replace"));
        assert_eq!(posted[1]["obj"]["_id"], json!("new"));
    }

    #[tokio::test]
    async fn test_transport_errors_pass_through() {
        let client = client(Vec::new());
        assert!(matches!(client.read("x").await, Err(ClientError::Transport(_))));
    }
}
