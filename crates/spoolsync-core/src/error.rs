//! Errors surfaced by the sync service.
//!
//! Every public operation returns `SpoolmanResult<T>`. Callers that only care
//! about success can test `.is_ok()`; everyone else gets the failing entity,
//! id and field through the variant and `ErrorKind` for coarse dispatch.

use thiserror::Error;

use crate::api::ApiError;
use crate::models::EntityKind;

pub type SpoolmanResult<T> = Result<T, SpoolmanError>;

/// Coarse classification of a `SpoolmanError`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Parse,
    Referential,
    NotFound,
    Preset,
}

#[derive(Error, Debug)]
pub enum SpoolmanError {
    #[error("Failed to build Spoolman client: {message}")]
    ClientInit { message: String },

    #[error("Request to '{endpoint}' failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: ApiError,
    },

    #[error("{entity} {} is missing required field '{field}'", fmt_id(.id))]
    MissingField {
        entity: EntityKind,
        id: Option<i64>,
        field: &'static str,
    },

    #[error("Failed to parse {entity} {}: {message}", fmt_id(.id))]
    Parse {
        entity: EntityKind,
        id: Option<i64>,
        message: String,
    },

    #[error("{entity} {id} references unknown {parent} {parent_id}")]
    Referential {
        entity: EntityKind,
        id: i64,
        parent: EntityKind,
        parent_id: i64,
    },

    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: i64 },

    #[error("Preset '{preset}' is not linked to a spool")]
    NotLinked { preset: String },

    #[error("A preset named '{name}' already exists")]
    DuplicatePreset { name: String },
}

fn fmt_id(id: &Option<i64>) -> String {
    match id {
        Some(id) => id.to_string(),
        None => "<unknown id>".to_string(),
    }
}

impl SpoolmanError {
    pub fn transport(endpoint: impl Into<String>, source: ApiError) -> Self {
        SpoolmanError::Transport {
            endpoint: endpoint.into(),
            source,
        }
    }

    pub fn parse(entity: EntityKind, id: Option<i64>, message: impl Into<String>) -> Self {
        SpoolmanError::Parse {
            entity,
            id,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            // A 404 on an entity endpoint is reported as `NotFound` before it
            // gets here; on a list endpoint it means a wrong host or path.
            SpoolmanError::Transport { source, .. } => match source {
                ApiError::MalformedBody(_) => ErrorKind::Parse,
                _ => ErrorKind::Transport,
            },
            SpoolmanError::ClientInit { .. } => ErrorKind::Transport,
            SpoolmanError::MissingField { .. } | SpoolmanError::Parse { .. } => ErrorKind::Parse,
            SpoolmanError::Referential { .. } => ErrorKind::Referential,
            SpoolmanError::NotFound { .. } => ErrorKind::NotFound,
            SpoolmanError::NotLinked { .. } | SpoolmanError::DuplicatePreset { .. } => {
                ErrorKind::Preset
            }
        }
    }
}
