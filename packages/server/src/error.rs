//! Resolver error taxonomy and its GraphQL surface.

use std::time::Duration;

use async_graphql::ErrorExtensions;
use parcel_gis_database::DbError;
use parcel_gis_parcel_models::ValidationError;
use thiserror::Error;

/// Message shown to clients for any store-side failure.
const STORE_FAILURE_MESSAGE: &str = "internal error while querying the spatial store";

/// Why a resolver could not produce a result.
#[derive(Debug, Error)]
pub enum GisError {
    /// The request arguments violate a constraint. Raised before any I/O.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The referenced parcel does not exist.
    #[error("parcel '{parcel_id}' not found")]
    NotFound {
        /// The identifier that did not resolve.
        parcel_id: String,
    },

    /// The parcel exists but has no boundary to measure.
    #[error("parcel '{parcel_id}' has no boundary geometry")]
    MissingBoundary {
        /// The parcel without a boundary.
        parcel_id: String,
    },

    /// The spatial store call failed.
    #[error("spatial store error: {0}")]
    Store(#[from] DbError),

    /// The spatial store call did not finish in time.
    #[error("spatial store query timed out after {0:?}")]
    Timeout(Duration),
}

impl GisError {
    /// The `extensions.code` reported to GraphQL clients.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "BAD_USER_INPUT",
            Self::NotFound { .. } | Self::MissingBoundary { .. } => "NOT_FOUND",
            Self::Store(_) | Self::Timeout(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// The message reported to GraphQL clients. Store failures are reduced
    /// to a generic message; their detail only goes to the server log.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            Self::Store(_) | Self::Timeout(_) => STORE_FAILURE_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

impl ErrorExtensions for GisError {
    fn extend(&self) -> async_graphql::Error {
        let code = self.code();
        async_graphql::Error::new(self.client_message()).extend_with(|_, e| e.set("code", code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_keep_their_message() {
        let err = GisError::from(ValidationError::EmptyParcelId);
        assert_eq!(err.code(), "BAD_USER_INPUT");
        assert_eq!(err.client_message(), "id must not be empty");
    }

    #[test]
    fn store_errors_do_not_leak_detail() {
        let err = GisError::from(DbError::Connection {
            message: "password authentication failed for user \"gis\"".to_string(),
        });
        assert_eq!(err.code(), "INTERNAL_SERVER_ERROR");
        assert_eq!(err.client_message(), STORE_FAILURE_MESSAGE);
        assert!(err.to_string().contains("password authentication failed"));

        let err = GisError::Timeout(Duration::from_secs(30));
        assert_eq!(err.client_message(), STORE_FAILURE_MESSAGE);
    }

    #[test]
    fn not_found_is_distinct_from_validation() {
        let err = GisError::NotFound {
            parcel_id: "nope".to_string(),
        };
        assert_eq!(err.code(), "NOT_FOUND");
        assert_eq!(err.client_message(), "parcel 'nope' not found");
    }

    #[test]
    fn graphql_error_carries_code_extension() {
        let gql = GisError::NotFound {
            parcel_id: "nope".to_string(),
        }
        .extend();

        assert_eq!(gql.message, "parcel 'nope' not found");
        let json = serde_json::to_value(gql.extensions.unwrap()).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
    }
}
