use std::sync::Arc;

use grantline_core::{AppError, AppResult, SessionIdentity, identity};
use tracing::warn;

use crate::warehouse_ports::{Statement, WarehouseClient};

const IDENTITY_QUERY: &str =
    "SELECT CURRENT_USER() AS USER_NAME, CURRENT_ROLE() AS ROLE_NAME";

/// Resolves the principal behind the current warehouse session.
#[derive(Clone)]
pub struct SessionService {
    client: Arc<dyn WarehouseClient>,
}

impl SessionService {
    /// Creates a service over the given client.
    #[must_use]
    pub fn new(client: Arc<dyn WarehouseClient>) -> Self {
        Self { client }
    }

    /// Returns the session identity, falling back to the `UNKNOWN_USER` /
    /// `UNKNOWN_ROLE` sentinels instead of raising.
    pub async fn current_identity(&self) -> SessionIdentity {
        match self.fetch_identity().await {
            Ok(identity) => identity,
            Err(error) => {
                warn!(%error, "session identity unresolved, using sentinels");
                SessionIdentity::unknown()
            }
        }
    }

    /// Returns the acting user name, or the `UNKNOWN_USER` sentinel.
    pub async fn current_user(&self) -> String {
        self.current_identity().await.user().to_owned()
    }

    /// Returns the acting role name, or the `UNKNOWN_ROLE` sentinel.
    pub async fn current_role(&self) -> String {
        self.current_identity().await.role().to_owned()
    }

    /// Verifies the session at startup. Any failure is fatal: the process
    /// must not come up without a working warehouse session.
    pub async fn probe(&self) -> AppResult<SessionIdentity> {
        self.fetch_identity()
            .await
            .map_err(|error| AppError::SessionUnavailable(error.to_string()))
    }

    async fn fetch_identity(&self) -> AppResult<SessionIdentity> {
        let rows = self.client.execute(Statement::new(IDENTITY_QUERY)).await?;
        let row = rows.first().ok_or_else(|| {
            AppError::Query("identity query returned no rows".to_owned())
        })?;

        let user = row
            .optional_text("USER_NAME")?
            .unwrap_or_else(|| identity::UNKNOWN_USER.to_owned());
        let role = row
            .optional_text("ROLE_NAME")?
            .unwrap_or_else(|| identity::UNKNOWN_ROLE.to_owned());

        Ok(SessionIdentity::new(user, role))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use grantline_core::AppError;

    use crate::test_support::{FakeWarehouseClient, row};
    use crate::warehouse_ports::ScalarValue;

    use super::SessionService;

    #[tokio::test]
    async fn identity_falls_back_to_sentinels_on_failure() {
        let client = Arc::new(FakeWarehouseClient::new());
        client
            .push_error(AppError::Query("session expired".to_owned()))
            .await;

        let service = SessionService::new(client);
        let identity = service.current_identity().await;

        assert_eq!(identity.user(), "UNKNOWN_USER");
        assert_eq!(identity.role(), "UNKNOWN_ROLE");
    }

    #[tokio::test]
    async fn identity_reads_session_values() {
        let client = Arc::new(FakeWarehouseClient::new());
        client
            .push_rows(vec![row(&[
                ("USER_NAME", ScalarValue::Text("OPS_ADMIN".to_owned())),
                ("ROLE_NAME", ScalarValue::Text("SECURITYADMIN".to_owned())),
            ])])
            .await;

        let service = SessionService::new(client);
        let identity = service.current_identity().await;

        assert_eq!(identity.user(), "OPS_ADMIN");
        assert_eq!(identity.role(), "SECURITYADMIN");
    }

    #[tokio::test]
    async fn probe_converts_failures_to_session_unavailable() {
        let client = Arc::new(FakeWarehouseClient::new());
        client
            .push_error(AppError::Query("connect refused".to_owned()))
            .await;

        let service = SessionService::new(client);

        assert!(matches!(
            service.probe().await,
            Err(AppError::SessionUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn probe_fails_on_empty_result() {
        let client = Arc::new(FakeWarehouseClient::new());
        client.push_rows(Vec::new()).await;

        let service = SessionService::new(client);

        assert!(matches!(
            service.probe().await,
            Err(AppError::SessionUnavailable(_))
        ));
    }
}
