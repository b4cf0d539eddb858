//! Mutating operations against the admin API.
//!
//! A [`Command`] describes one write (path template, method, parameters,
//! payload and how to encode it); [`CommandExecutor`] renders it and sends
//! it through the [`AuthorizingClient`].

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::client::{AuthorizingClient, RequestOptions};
use crate::criteria::Criteria;
use crate::error::{KcAdminError, Result};
use crate::http::{HttpResponse, Method, RequestBody};
use crate::path::{PathParams, render_path};

/// How a command payload is encoded on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContentType {
    /// `application/json` body.
    #[default]
    Json,

    /// `application/x-www-form-urlencoded` body.
    FormParams,
}

impl ContentType {
    /// MIME type sent in the `Content-Type` header.
    pub fn mime(&self) -> &'static str {
        match self {
            ContentType::Json => "application/json",
            ContentType::FormParams => "application/x-www-form-urlencoded",
        }
    }
}

/// Body of a command before encoding.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Payload {
    #[default]
    None,

    /// Structured value, serialized according to the content type.
    Json(Value),

    /// Pre-encoded text, sent verbatim.
    Raw(String),

    /// Form fields, in order.
    Form(Vec<(String, String)>),
}

/// A write operation against a path template.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    path: String,
    method: Method,
    params: PathParams,
    payload: Payload,
    content_type: ContentType,
    criteria: Option<Criteria>,
}

impl Command {
    /// Create a command with no payload.
    pub fn new(path: impl Into<String>, method: Method, params: PathParams) -> Self {
        Self {
            path: path.into(),
            method,
            params,
            payload: Payload::None,
            content_type: ContentType::Json,
            criteria: None,
        }
    }

    /// Attach a serializable payload, sent as JSON.
    pub fn with_payload<P: Serialize + ?Sized>(mut self, payload: &P) -> Result<Self> {
        let value = serde_json::to_value(payload).map_err(KcAdminError::Serialization)?;
        self.payload = Payload::Json(value);
        Ok(self)
    }

    /// Attach pre-encoded text, sent verbatim as JSON.
    pub fn with_raw_payload(mut self, body: impl Into<String>) -> Self {
        self.payload = Payload::Raw(body.into());
        self
    }

    /// Attach form fields and switch to form encoding.
    pub fn with_form(mut self, fields: Vec<(String, String)>) -> Self {
        self.payload = Payload::Form(fields);
        self.content_type = ContentType::FormParams;
        self
    }

    /// Override the content type.
    pub fn with_content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }

    /// Append criteria as the query string.
    pub fn with_criteria(mut self, criteria: Criteria) -> Self {
        self.criteria = Some(criteria);
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn params(&self) -> &PathParams {
        &self.params
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn criteria(&self) -> Option<&Criteria> {
        self.criteria.as_ref()
    }

    /// Encode the payload into a request body.
    fn encode_body(&self) -> Result<RequestBody> {
        match self.content_type {
            ContentType::Json => match &self.payload {
                Payload::None => Ok(RequestBody::Empty),
                Payload::Raw(text) => Ok(RequestBody::Raw(text.clone())),
                Payload::Json(value) => serde_json::to_string(value)
                    .map(RequestBody::Raw)
                    .map_err(KcAdminError::Serialization),
                Payload::Form(fields) => {
                    let object: serde_json::Map<String, Value> = fields
                        .iter()
                        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                        .collect();
                    serde_json::to_string(&object)
                        .map(RequestBody::Raw)
                        .map_err(KcAdminError::Serialization)
                }
            },
            ContentType::FormParams => match &self.payload {
                Payload::None => Ok(RequestBody::Form(Vec::new())),
                Payload::Form(fields) => Ok(RequestBody::Form(fields.clone())),
                Payload::Json(Value::Object(map)) => Ok(RequestBody::Form(
                    map.iter()
                        .map(|(k, v)| (k.clone(), form_value(v)))
                        .collect(),
                )),
                Payload::Json(other) => Err(KcAdminError::InvalidPayload {
                    message: format!(
                        "form encoding needs an object payload, got {}",
                        json_kind(other)
                    ),
                }),
                Payload::Raw(_) => Err(KcAdminError::InvalidPayload {
                    message: "a raw payload cannot be form encoded".to_string(),
                }),
            },
        }
    }
}

fn form_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Sends [`Command`]s through an [`AuthorizingClient`].
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    client: Arc<AuthorizingClient>,
}

impl CommandExecutor {
    pub fn new(client: Arc<AuthorizingClient>) -> Self {
        Self { client }
    }

    /// Render and send a command, returning the raw response.
    ///
    /// # Errors
    ///
    /// - [`KcAdminError::MissingPathParam`] if the template cannot be rendered
    /// - [`KcAdminError::InvalidPayload`] if the payload does not fit the content type
    /// - Any error of [`AuthorizingClient::request`]
    pub async fn execute_command(&self, command: Command) -> Result<HttpResponse> {
        let path = render_path(&command.path, &command.params)?;
        let body = command.encode_body()?;

        let mut options = RequestOptions::new();
        if body != RequestBody::Empty || command.content_type == ContentType::FormParams {
            options = options.header("Content-Type", command.content_type.mime());
        }
        options.body = body;
        if let Some(criteria) = command.criteria {
            options = options.query(criteria);
        }

        tracing::debug!("Executing command {} {}", command.method, path);

        self.client.request(command.method, &path, options).await
    }
}
