use std::fmt;

use thiserror::Error;

use crate::domain::InputError;

/// Which remote service a failure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Geocoding,
    StaticMap,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Service::Geocoding => f.write_str("Geocoding"),
            Service::StaticMap => f.write_str("Static map"),
        }
    }
}

/// Everything that can go wrong turning an address into a map.
///
/// The `Display` text of each variant is the message shown to the user.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error(transparent)]
    InvalidInput(#[from] InputError),

    /// DNS, connection, or timeout failure
    #[error("{service} request failed: {source}")]
    Transport {
        service: Service,
        #[source]
        source: reqwest::Error,
    },

    /// Non-success HTTP status, or an error code in the API's status block
    #[error("{service} service returned error status: {status}")]
    Status { service: Service, status: String },

    #[error("Location not found: {0}")]
    NotFound(String),

    /// Body that could not be parsed as JSON or decoded as an image
    #[error("{service} service sent an unreadable response: {reason}")]
    Malformed { service: Service, reason: String },
}

impl LookupError {
    pub(crate) fn transport(service: Service, source: reqwest::Error) -> Self {
        LookupError::Transport { service, source }
    }

    pub(crate) fn malformed(service: Service, reason: impl fmt::Display) -> Self {
        LookupError::Malformed {
            service,
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_service() {
        let err = LookupError::Status {
            service: Service::StaticMap,
            status: "403 Forbidden".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Static map service returned error status: 403 Forbidden"
        );

        let err = LookupError::malformed(Service::Geocoding, "missing field `latLng`");
        assert_eq!(
            err.to_string(),
            "Geocoding service sent an unreadable response: missing field `latLng`"
        );
    }

    #[test]
    fn test_input_errors_pass_through() {
        let err = LookupError::from(InputError::EmptyQuery);
        assert_eq!(err.to_string(), "Please enter a location");
    }
}
