use thiserror::Error;

/// The single way a lookup can fail. City not found, network trouble and
/// malformed payloads all end up here; `source` keeps the cause for logs.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("city not found or API error")]
    LookupFailed {
        #[source]
        source: anyhow::Error,
    },
}

impl LookupError {
    pub fn failed(source: anyhow::Error) -> Self {
        Self::LookupFailed { source }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not access store file {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("store contents are not valid JSON")]
    Format(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn lookup_failed_hides_cause_in_display_but_keeps_source() {
        let err = LookupError::failed(anyhow::anyhow!("status 404 Not Found"));
        assert_eq!(err.to_string(), "city not found or API error");
        let source = err.source().expect("cause should be attached");
        assert!(source.to_string().contains("404"));
    }
}
