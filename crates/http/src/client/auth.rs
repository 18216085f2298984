//! Authentication endpoints

use super::{
    API_PREFIX,
    error::ClientError,
    typed::{AuthenticatedClient, PublicClient},
};
use crate::types::{CurrentUser, HealthResponse, LoginRequest, LoginResponse};
use reqwest::Method;

impl PublicClient {
    /// Exchange credentials for a bearer token
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ClientError> {
        let req = self
            .request(Method::POST, &format!("{API_PREFIX}/auth/login"))
            .json(request);
        self.execute(req).await
    }

    /// Backend liveness probe
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let req = self.request(Method::GET, &format!("{API_PREFIX}/health"));
        self.execute(req).await
    }
}

impl AuthenticatedClient {
    /// Get current user info (requires authentication)
    pub async fn me(&self) -> Result<CurrentUser, ClientError> {
        let req = self.request(Method::GET, &format!("{API_PREFIX}/auth/me"));
        self.execute(req).await
    }
}
