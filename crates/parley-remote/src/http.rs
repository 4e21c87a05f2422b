//! HTTP adapter for the chat service.

use async_trait::async_trait;
use parley_core::{
    Channel, ChannelId, Credentials, Message, OutgoingMessage, Registration, RemoteError, Token,
    User,
};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::debug;

use crate::{Endpoints, RemoteClient};

/// `{ "token": ... }` body returned by sign-in and sign-up.
#[derive(Deserialize)]
struct TokenResponse {
    token: Token,
}

/// [`RemoteClient`] over HTTP with bearer authentication.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: reqwest::Client,
    endpoints: Endpoints,
}

impl HttpRemote {
    /// Build a client for `endpoints`.
    pub fn new(endpoints: Endpoints) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(endpoints.request_timeout())
            .build()
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        Ok(Self { client, endpoints })
    }

    /// Configured endpoints.
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &'static str,
    ) -> Result<T, RemoteError> {
        let response = request.send().await.map_err(|e| RemoteError::Network(e.to_string()))?;
        debug!(request = what, status = response.status().as_u16(), "chat service responded");
        read_json(response).await
    }
}

/// Map a response to a decoded body or a classified error.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, RemoteError> {
    let status = response.status();

    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                RemoteError::Auth { status: status.as_u16(), message }
            },
            _ => RemoteError::Rejected { status: status.as_u16(), message },
        });
    }

    let body = response.bytes().await.map_err(|e| RemoteError::Network(e.to_string()))?;
    serde_json::from_slice(&body).map_err(|e| RemoteError::Decode(e.to_string()))
}

#[async_trait]
impl RemoteClient for HttpRemote {
    async fn sign_up(&self, registration: &Registration) -> Result<Token, RemoteError> {
        let request = self.client.post(self.endpoints.chat_url("/signup")).json(registration);
        let body: TokenResponse = self.execute(request, "signup").await?;
        Ok(body.token)
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Token, RemoteError> {
        let request = self.client.post(self.endpoints.chat_url("/signin")).json(credentials);
        let body: TokenResponse = self.execute(request, "signin").await?;
        Ok(body.token)
    }

    async fn list_users(&self, token: &Token) -> Result<Vec<User>, RemoteError> {
        let request =
            self.client.get(self.endpoints.chat_url("/users")).bearer_auth(token.as_str());
        self.execute(request, "list_users").await
    }

    async fn list_channels(&self, token: &Token) -> Result<Vec<Channel>, RemoteError> {
        let request =
            self.client.get(self.endpoints.chat_url("/chats")).bearer_auth(token.as_str());
        self.execute(request, "list_channels").await
    }

    async fn list_messages(
        &self,
        token: &Token,
        channel_id: ChannelId,
    ) -> Result<Vec<Message>, RemoteError> {
        let url = self.endpoints.chat_url(&format!("/chats/{channel_id}/messages"));
        let request = self.client.get(url).bearer_auth(token.as_str());
        self.execute(request, "list_messages").await
    }

    async fn send_message(
        &self,
        token: &Token,
        channel_id: ChannelId,
        message: &OutgoingMessage,
    ) -> Result<Message, RemoteError> {
        let url = self.endpoints.chat_url(&format!("/chats/{channel_id}"));
        let request = self.client.post(url).bearer_auth(token.as_str()).json(message);
        self.execute(request, "send_message").await
    }
}
