//! Data models returned by, or shared across, Azure DevOps API calls.

use serde::{Deserialize, Deserializer, Serialize};

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;

/// Identifier of an Azure Repos git repository (a GUID).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepositoryId(String);

impl RepositoryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a pipeline (build definition).
///
/// The API returns numbers, but older endpoints and hand written fixtures use
/// numeric strings, so both are accepted when deserializing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PipelineId(u64);

impl PipelineId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for PipelineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PipelineId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl<'de> Deserialize<'de> for PipelineId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(u64),
            Text(String),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Number(n) => Ok(Self(n)),
            RawId::Text(s) => s
                .parse::<u64>()
                .map(Self)
                .map_err(|e| serde::de::Error::custom(format!("invalid pipeline id '{s}': {e}"))),
        }
    }
}

/// Outcome of a create call against an API that has no atomic create-if-absent.
///
/// Callers branch on the variant instead of probing the response body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CreateOutcome<T> {
    /// The resource was created and the API returned its identifier.
    Created(T),

    /// The API reported a name collision (HTTP 409).
    AlreadyExists,

    /// Any other answer, carrying the HTTP status. A success status whose body
    /// has no identifier also ends up here.
    Failed(u16),
}

impl<T> CreateOutcome<T> {
    /// The identifier of the created resource, if there is one.
    pub fn created(&self) -> Option<&T> {
        match self {
            CreateOutcome::Created(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, CreateOutcome::Created(_))
    }
}

/// A git repository as returned by the repositories API.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub id: RepositoryId,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_url: Option<String>,
}

/// A pipeline as returned by the pipelines API.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Pipeline {
    pub id: PipelineId,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
}

/// Reference to an uploaded pull-request attachment.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Attachment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// The `{ "count": n, "value": [...] }` envelope used by list endpoints.
#[derive(Clone, Debug, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default)]
    pub count: Option<u64>,

    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
}

/// Minimal body used to pull an identifier out of a create response.
#[derive(Debug, Deserialize)]
pub(crate) struct IdOnly<T> {
    pub id: T,
}
