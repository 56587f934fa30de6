//! Session endpoints. The server answers sign-in with a `session-id` cookie
//! that the transport's cookie store replays on later calls.

use crate::client::ApiClient;
use crate::endpoints;
use crate::error::Result;
use crate::transport::Transport;
use crate::types::{MessageResponse, SignInRequest, SignInResponse, UserProfile};

impl<T: Transport> ApiClient<T> {
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<UserProfile> {
        let request = SignInRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response: SignInResponse = self.post(endpoints::AUTH_SIGN_IN, &request).await?;
        Ok(response.user)
    }

    pub async fn me(&self) -> Result<UserProfile> {
        self.get(endpoints::AUTH_ME, None).await
    }

    pub async fn logout(&self) -> Result<MessageResponse> {
        self.post(endpoints::AUTH_LOGOUT, &()).await
    }
}
