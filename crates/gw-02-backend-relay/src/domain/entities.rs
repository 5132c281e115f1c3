//! # Relay Entities

/// What the backend answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body, unmodified.
    pub body: String,
}

impl BackendResponse {
    /// Whether the body should be relayed back to the device.
    ///
    /// Only a plain `200 OK` qualifies.
    #[must_use]
    pub fn is_deliverable(&self) -> bool {
        self.status == 200
    }
}
