use crate::command::Command;
use crate::criteria::Criteria;
use crate::error::Result;
use crate::http::{HttpResponse, Method};
use crate::path::PathParams;
use crate::query::Query;
use crate::representation::{
    Collection, CredentialRepresentation, GroupRepresentation, RoleRepresentation,
    UserRepresentation,
};

use super::Resource;

const USERS: &str = "/admin/realms/{realm}/users";
const USER: &str = "/admin/realms/{realm}/users/{userId}";
const USER_GROUP: &str = "/admin/realms/{realm}/users/{userId}/groups/{groupId}";
const USER_GROUPS: &str = "/admin/realms/{realm}/users/{userId}/groups";
const USER_REALM_ROLES: &str = "/admin/realms/{realm}/users/{userId}/role-mappings/realm";
const USER_AVAILABLE_REALM_ROLES: &str =
    "/admin/realms/{realm}/users/{userId}/role-mappings/realm/available";
const USER_ACTIONS_EMAIL: &str = "/admin/realms/{realm}/users/{userId}/execute-actions-email";
const USER_CREDENTIALS: &str = "/admin/realms/{realm}/users/{userId}/credentials";

/// Realm users.
#[derive(Debug, Clone)]
pub struct Users {
    resource: Resource,
}

impl Users {
    pub(crate) fn new(resource: Resource) -> Self {
        Self { resource }
    }

    /// Default realm of this facade.
    pub fn realm(&self) -> &str {
        self.resource.realm()
    }

    /// List users, optionally filtered.
    pub async fn all(
        &self,
        criteria: Option<Criteria>,
        realm: Option<&str>,
    ) -> Result<Collection<UserRepresentation>> {
        let query = Query::new(USERS, self.resource.realm_params(realm)).with_criteria(criteria);
        self.resource.queries.execute_query(query).await
    }

    /// Search users by `search`, `username`, `email` and similar criteria.
    pub async fn search(
        &self,
        criteria: Option<Criteria>,
        realm: Option<&str>,
    ) -> Result<Collection<UserRepresentation>> {
        self.all(criteria, realm).await
    }

    pub async fn get(&self, user_id: &str, realm: Option<&str>) -> Result<UserRepresentation> {
        let query = Query::new(USER, self.user_params(user_id, realm));
        self.resource.queries.execute_query(query).await
    }

    pub async fn create(
        &self,
        user: &UserRepresentation,
        realm: Option<&str>,
    ) -> Result<HttpResponse> {
        let command = Command::new(USERS, Method::Post, self.resource.realm_params(realm))
            .with_payload(user)?;
        self.resource.commands.execute_command(command).await
    }

    pub async fn update(
        &self,
        user_id: &str,
        user: &UserRepresentation,
        realm: Option<&str>,
    ) -> Result<HttpResponse> {
        let command = Command::new(USER, Method::Put, self.user_params(user_id, realm))
            .with_payload(user)?;
        self.resource.commands.execute_command(command).await
    }

    pub async fn delete(&self, user_id: &str, realm: Option<&str>) -> Result<HttpResponse> {
        let command = Command::new(USER, Method::Delete, self.user_params(user_id, realm));
        self.resource.commands.execute_command(command).await
    }

    /// Add the user to a group.
    pub async fn join_group(
        &self,
        user_id: &str,
        group_id: &str,
        realm: Option<&str>,
    ) -> Result<HttpResponse> {
        let params = self.user_params(user_id, realm).with("groupId", group_id);
        let command = Command::new(USER_GROUP, Method::Put, params);
        self.resource.commands.execute_command(command).await
    }

    /// Remove the user from a group.
    pub async fn leave_group(
        &self,
        user_id: &str,
        group_id: &str,
        realm: Option<&str>,
    ) -> Result<HttpResponse> {
        let params = self.user_params(user_id, realm).with("groupId", group_id);
        let command = Command::new(USER_GROUP, Method::Delete, params);
        self.resource.commands.execute_command(command).await
    }

    /// Groups the user is a member of.
    pub async fn groups(
        &self,
        user_id: &str,
        criteria: Option<Criteria>,
        realm: Option<&str>,
    ) -> Result<Collection<GroupRepresentation>> {
        let query =
            Query::new(USER_GROUPS, self.user_params(user_id, realm)).with_criteria(criteria);
        self.resource.queries.execute_query(query).await
    }

    /// Realm roles mapped to the user.
    pub async fn realm_roles(
        &self,
        user_id: &str,
        realm: Option<&str>,
    ) -> Result<Collection<RoleRepresentation>> {
        let query = Query::new(USER_REALM_ROLES, self.user_params(user_id, realm));
        self.resource.queries.execute_query(query).await
    }

    /// Realm roles that can still be mapped to the user.
    pub async fn available_realm_roles(
        &self,
        user_id: &str,
        realm: Option<&str>,
    ) -> Result<Collection<RoleRepresentation>> {
        let query = Query::new(USER_AVAILABLE_REALM_ROLES, self.user_params(user_id, realm));
        self.resource.queries.execute_query(query).await
    }

    pub async fn add_realm_roles(
        &self,
        user_id: &str,
        roles: &[RoleRepresentation],
        realm: Option<&str>,
    ) -> Result<HttpResponse> {
        let command = Command::new(USER_REALM_ROLES, Method::Post, self.user_params(user_id, realm))
            .with_payload(roles)?;
        self.resource.commands.execute_command(command).await
    }

    pub async fn remove_realm_roles(
        &self,
        user_id: &str,
        roles: &[RoleRepresentation],
        realm: Option<&str>,
    ) -> Result<HttpResponse> {
        let command =
            Command::new(USER_REALM_ROLES, Method::Delete, self.user_params(user_id, realm))
                .with_payload(roles)?;
        self.resource.commands.execute_command(command).await
    }

    /// Email the user a link to perform the given required actions
    /// (`UPDATE_PASSWORD`, `VERIFY_EMAIL`, ...).
    ///
    /// `criteria` carries `client_id`, `lifespan` and `redirect_uri`.
    pub async fn execute_actions_email(
        &self,
        user_id: &str,
        actions: Option<&[&str]>,
        criteria: Option<Criteria>,
        realm: Option<&str>,
    ) -> Result<HttpResponse> {
        let mut command =
            Command::new(USER_ACTIONS_EMAIL, Method::Put, self.user_params(user_id, realm));
        if let Some(actions) = actions {
            command = command.with_payload(actions)?;
        }
        if let Some(criteria) = criteria {
            command = command.with_criteria(criteria);
        }
        self.resource.commands.execute_command(command).await
    }

    pub async fn credentials(
        &self,
        user_id: &str,
        realm: Option<&str>,
    ) -> Result<Collection<CredentialRepresentation>> {
        let query = Query::new(USER_CREDENTIALS, self.user_params(user_id, realm));
        self.resource.queries.execute_query(query).await
    }

    fn user_params(&self, user_id: &str, realm: Option<&str>) -> PathParams {
        self.resource.realm_params(realm).with("userId", user_id)
    }
}
