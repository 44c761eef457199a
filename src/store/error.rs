use uuid::Uuid;

/// Closed error taxonomy at the store boundary. Shapeless error payloads
/// from the remote service are normalized into one of these four kinds
/// before they leave this module.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("validation failed: {message}")]
    Validation { message: String },

    #[error("task {id} not found")]
    NotFound { id: Uuid },

    #[error("not authenticated: {reason}")]
    Auth { reason: String },

    #[error("request failed: {message}")]
    Network { message: String },
}

impl StoreError {
    pub fn missing_token() -> Self {
        StoreError::Auth {
            reason: "no bearer token configured".to_string(),
        }
    }

    /// User-facing one-liner for footer notices and dialog titles.
    pub fn headline(&self) -> &'static str {
        match self {
            StoreError::Validation { .. } => "Validation failed",
            StoreError::NotFound { .. } => "Task no longer exists",
            StoreError::Auth { .. } => "Not signed in",
            StoreError::Network { .. } => "Request failed",
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Network {
            message: err.to_string(),
        }
    }
}

/// Maps a non-2xx status plus the service's error body (`{"message": ...}`
/// when present) into the taxonomy. 401/403 are auth failures regardless
/// of body; everything unclassified is a network error.
pub fn classify_status(status: u16, body: &str, id: Option<Uuid>) -> StoreError {
    let message = extract_message(body).unwrap_or_else(|| format!("HTTP {status}"));
    match status {
        400 | 422 => StoreError::Validation { message },
        401 | 403 => StoreError::Auth { reason: message },
        404 => match id {
            Some(id) => StoreError::NotFound { id },
            None => StoreError::Network { message },
        },
        _ => StoreError::Network { message },
    }
}

fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let message = value
        .get("message")
        .or_else(|| value.get("detail"))
        .and_then(|field| field.as_str())?;
    let trimmed = message.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
