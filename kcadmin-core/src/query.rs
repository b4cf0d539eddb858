//! Read operations against the admin API.

use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::client::{AuthorizingClient, RequestOptions};
use crate::criteria::Criteria;
use crate::error::{KcAdminError, Result};
use crate::http::Method;
use crate::path::{PathParams, render_path};

/// A read against a path template, decoded into `T`.
///
/// `T` selects how the response body is interpreted: a single
/// representation, a [`Collection`](crate::representation::Collection), or
/// `Vec<serde_json::Value>` for endpoints returning untyped arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct Query<T> {
    path: String,
    params: PathParams,
    criteria: Option<Criteria>,
    _result: PhantomData<fn() -> T>,
}

impl<T> Query<T> {
    pub fn new(path: impl Into<String>, params: PathParams) -> Self {
        Self {
            path: path.into(),
            params,
            criteria: None,
            _result: PhantomData,
        }
    }

    /// Append criteria as the query string. `None` leaves it unset.
    pub fn with_criteria(mut self, criteria: impl Into<Option<Criteria>>) -> Self {
        self.criteria = criteria.into();
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn params(&self) -> &PathParams {
        &self.params
    }

    pub fn criteria(&self) -> Option<&Criteria> {
        self.criteria.as_ref()
    }
}

/// Sends [`Query`]s through an [`AuthorizingClient`] and decodes the result.
#[derive(Debug, Clone)]
pub struct QueryExecutor {
    client: Arc<AuthorizingClient>,
}

impl QueryExecutor {
    pub fn new(client: Arc<AuthorizingClient>) -> Self {
        Self { client }
    }

    /// GET the rendered path and decode the JSON body as `T`.
    ///
    /// # Errors
    ///
    /// - [`KcAdminError::MissingPathParam`] if the template cannot be rendered
    /// - [`KcAdminError::DeserializationFailed`] if the body does not match `T`
    /// - Any error of [`AuthorizingClient::request`]
    pub async fn execute_query<T: DeserializeOwned>(&self, query: Query<T>) -> Result<T> {
        let path = render_path(&query.path, &query.params)?;

        let mut options = RequestOptions::new().header("Accept", "application/json");
        if let Some(criteria) = query.criteria {
            options = options.query(criteria);
        }

        tracing::debug!("Executing query GET {}", path);

        let response = self.client.request(Method::Get, &path, options).await?;

        response
            .json::<T>()
            .map_err(|source| KcAdminError::DeserializationFailed {
                target: std::any::type_name::<T>(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grant::Password;
    use crate::representation::{Collection, UserRepresentation};
    use crate::store::{MemoryTokenStorage, TokenStorage};
    use crate::test_support::{MockTransport, fresh_jwt, token_body};
    use crate::token::Credential;

    fn executor(authorized: bool) -> (Arc<MockTransport>, QueryExecutor) {
        let transport = Arc::new(MockTransport::new());
        let storage = Arc::new(MemoryTokenStorage::new());
        if authorized {
            storage.store_access_token(Credential::parse(fresh_jwt("a")).unwrap());
        }
        let client = AuthorizingClient::new(
            "http://kc.test",
            "master",
            transport.clone(),
            storage,
            Arc::new(Password::new("admin", "admin")),
        );
        (transport, QueryExecutor::new(Arc::new(client)))
    }

    #[tokio::test]
    async fn test_single_representation() {
        let (transport, executor) = executor(true);
        transport.respond(200, r#"{"id":"42","username":"jane","enabled":true}"#);

        let query: Query<UserRepresentation> = Query::new(
            "/admin/realms/{realm}/users/{userId}",
            PathParams::new().with("realm", "demo").with("userId", "42"),
        );
        let user = executor.execute_query(query).await.unwrap();

        assert_eq!(user.id.as_deref(), Some("42"));
        assert_eq!(user.username.as_deref(), Some("jane"));
        let request = &transport.requests()[0];
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.url, "http://kc.test/admin/realms/demo/users/42");
    }

    #[tokio::test]
    async fn test_collection_keeps_order_and_criteria() {
        let (transport, executor) = executor(true);
        transport.respond(200, r#"[{"username":"b"},{"username":"a"}]"#);

        let query: Query<Collection<UserRepresentation>> = Query::new(
            "/admin/realms/{realm}/users",
            PathParams::new().with("realm", "demo"),
        )
        .with_criteria(Criteria::new().with("max", 2));
        let users = executor.execute_query(query).await.unwrap();

        let names: Vec<_> = users.iter().filter_map(|u| u.username.as_deref()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(
            transport.requests()[0].url,
            "http://kc.test/admin/realms/demo/users?max=2"
        );
    }

    #[tokio::test]
    async fn test_raw_array() {
        let (transport, executor) = executor(true);
        transport.respond(200, r#"[{"id":"s1","start":1},{"id":"s2"}]"#);

        let query: Query<Vec<serde_json::Value>> =
            Query::new("/admin/realms/demo/sessions", PathParams::new());
        let sessions = executor.execute_query(query).await.unwrap();

        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0]["id"], "s1");
    }

    #[tokio::test]
    async fn test_undecodable_body() {
        let (transport, executor) = executor(true);
        transport.respond(200, r#"{"not":"an array"}"#);

        let query: Query<Collection<UserRepresentation>> =
            Query::new("/admin/realms/demo/users", PathParams::new());
        let result = executor.execute_query(query).await;

        match result {
            Err(KcAdminError::DeserializationFailed { target, .. }) => {
                assert!(target.contains("Collection"));
            }
            other => panic!("expected DeserializationFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unauthorized_query_fetches_token_first() {
        let (transport, executor) = executor(false);
        let access = fresh_jwt("new");
        transport.respond(200, token_body(&access, None));
        transport.respond(200, "[]");

        let query: Query<Vec<serde_json::Value>> = Query::new("/admin/realms", PathParams::new());
        executor.execute_query(query).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].url.ends_with("/protocol/openid-connect/token"));
        assert_eq!(
            requests[1].header("Authorization"),
            Some(format!("Bearer {}", access).as_str())
        );
    }
}
