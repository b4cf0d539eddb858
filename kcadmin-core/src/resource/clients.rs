use serde_json::Value;

use crate::command::Command;
use crate::criteria::Criteria;
use crate::error::{KcAdminError, Result};
use crate::http::{HttpResponse, Method};
use crate::path::PathParams;
use crate::query::Query;
use crate::representation::{
    ClientRepresentation, Collection, CredentialRepresentation, RoleRepresentation,
    UserRepresentation,
};

use super::Resource;

const CLIENTS: &str = "/admin/realms/{realm}/clients";
const CLIENT: &str = "/admin/realms/{realm}/clients/{clientUuid}";
const CLIENT_USER_SESSIONS: &str = "/admin/realms/{realm}/clients/{clientUuid}/user-sessions";
const CLIENT_SECRET: &str = "/admin/realms/{realm}/clients/{clientUuid}/client-secret";
const CLIENT_ROLES: &str = "/admin/realms/{realm}/clients/{clientUuid}/roles";
const CLIENT_SERVICE_ACCOUNT: &str =
    "/admin/realms/{realm}/clients/{clientUuid}/service-account-user";

/// Clients registered in a realm, addressed by their server-assigned UUID.
#[derive(Debug, Clone)]
pub struct Clients {
    resource: Resource,
}

impl Clients {
    pub(crate) fn new(resource: Resource) -> Self {
        Self { resource }
    }

    /// Default realm of this facade.
    pub fn realm(&self) -> &str {
        self.resource.realm()
    }

    /// List clients; `clientId` and `search` criteria narrow the result.
    pub async fn all(
        &self,
        criteria: Option<Criteria>,
        realm: Option<&str>,
    ) -> Result<Collection<ClientRepresentation>> {
        let query = Query::new(CLIENTS, self.resource.realm_params(realm)).with_criteria(criteria);
        self.resource.queries.execute_query(query).await
    }

    pub async fn get(
        &self,
        client_uuid: &str,
        realm: Option<&str>,
    ) -> Result<ClientRepresentation> {
        let query = Query::new(CLIENT, self.client_params(client_uuid, realm));
        self.resource.queries.execute_query(query).await
    }

    pub async fn create(
        &self,
        client: &ClientRepresentation,
        realm: Option<&str>,
    ) -> Result<HttpResponse> {
        let command = Command::new(CLIENTS, Method::Post, self.resource.realm_params(realm))
            .with_payload(client)?;
        self.resource.commands.execute_command(command).await
    }

    /// Create a client and fetch it back as stored by the server.
    ///
    /// The client is looked up by its `id` when one is given, otherwise by
    /// the UUID in the `Location` header of the creation response.
    pub async fn import(
        &self,
        client: &ClientRepresentation,
        realm: Option<&str>,
    ) -> Result<ClientRepresentation> {
        let response = self.create(client, realm).await?;

        let client_uuid = match client.id.as_deref() {
            Some(id) => id.to_string(),
            None => created_id(&response).ok_or_else(|| KcAdminError::InvalidPayload {
                message: "client has no id and the server returned no Location".to_string(),
            })?,
        };

        self.get(&client_uuid, realm).await
    }

    pub async fn update(
        &self,
        client_uuid: &str,
        client: &ClientRepresentation,
        realm: Option<&str>,
    ) -> Result<HttpResponse> {
        let command = Command::new(CLIENT, Method::Put, self.client_params(client_uuid, realm))
            .with_payload(client)?;
        self.resource.commands.execute_command(command).await
    }

    pub async fn delete(&self, client_uuid: &str, realm: Option<&str>) -> Result<HttpResponse> {
        let command = Command::new(CLIENT, Method::Delete, self.client_params(client_uuid, realm));
        self.resource.commands.execute_command(command).await
    }

    /// Active user sessions of the client, as untyped objects.
    pub async fn user_sessions(
        &self,
        client_uuid: &str,
        criteria: Option<Criteria>,
        realm: Option<&str>,
    ) -> Result<Vec<Value>> {
        let query = Query::new(CLIENT_USER_SESSIONS, self.client_params(client_uuid, realm))
            .with_criteria(criteria);
        self.resource.queries.execute_query(query).await
    }

    pub async fn client_secret(
        &self,
        client_uuid: &str,
        realm: Option<&str>,
    ) -> Result<CredentialRepresentation> {
        let query = Query::new(CLIENT_SECRET, self.client_params(client_uuid, realm));
        self.resource.queries.execute_query(query).await
    }

    pub async fn roles(
        &self,
        client_uuid: &str,
        realm: Option<&str>,
    ) -> Result<Collection<RoleRepresentation>> {
        let query = Query::new(CLIENT_ROLES, self.client_params(client_uuid, realm));
        self.resource.queries.execute_query(query).await
    }

    /// The user backing the client's service account.
    pub async fn service_account_user(
        &self,
        client_uuid: &str,
        realm: Option<&str>,
    ) -> Result<UserRepresentation> {
        let query = Query::new(CLIENT_SERVICE_ACCOUNT, self.client_params(client_uuid, realm));
        self.resource.queries.execute_query(query).await
    }

    fn client_params(&self, client_uuid: &str, realm: Option<&str>) -> PathParams {
        self.resource
            .realm_params(realm)
            .with("clientUuid", client_uuid)
    }
}

/// Last path segment of the `Location` header of a 201 response.
fn created_id(response: &HttpResponse) -> Option<String> {
    let location = response.header("Location")?;
    location
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}
