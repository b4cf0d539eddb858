use crate::criteria::Criteria;
use crate::error::Result;
use crate::query::Query;
use crate::representation::{Collection, IdentityProviderRepresentation};

use super::Resource;

const INSTANCES: &str = "/admin/realms/{realm}/identity-provider/instances";
const INSTANCE: &str = "/admin/realms/{realm}/identity-provider/instances/{alias}";

/// Identity providers brokered by a realm.
#[derive(Debug, Clone)]
pub struct IdentityProviders {
    resource: Resource,
}

impl IdentityProviders {
    pub(crate) fn new(resource: Resource) -> Self {
        Self { resource }
    }

    pub fn realm(&self) -> &str {
        self.resource.realm()
    }

    pub async fn all(
        &self,
        criteria: Option<Criteria>,
        realm: Option<&str>,
    ) -> Result<Collection<IdentityProviderRepresentation>> {
        let query =
            Query::new(INSTANCES, self.resource.realm_params(realm)).with_criteria(criteria);
        self.resource.queries.execute_query(query).await
    }

    pub async fn get(
        &self,
        alias: &str,
        realm: Option<&str>,
    ) -> Result<IdentityProviderRepresentation> {
        let params = self.resource.realm_params(realm).with("alias", alias);
        self.resource.queries.execute_query(Query::new(INSTANCE, params)).await
    }
}
