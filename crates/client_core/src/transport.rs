use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::{Board, Disc},
    protocol::{decode_reply, GameRequest, PlayResponse, RecommendResponse},
};
use tracing::debug;
use url::Url;

use crate::{
    config::Settings,
    error::{ClientError, ConfigError},
    session::MoveReply,
};

#[async_trait]
pub trait GameServer: Send + Sync {
    async fn next(
        &self,
        current_player: Disc,
        board: &Board,
        column: i64,
    ) -> Result<PlayResponse, ClientError>;
    async fn recommend(
        &self,
        current_player: Disc,
        board: &Board,
    ) -> Result<RecommendResponse, ClientError>;
    async fn warm(&self) -> Result<(), ClientError>;
}

/// Sends a session request and wraps the reply for [`crate::session::GameSession::on_reply`].
pub async fn dispatch(
    server: &dyn GameServer,
    request: GameRequest,
) -> Result<MoveReply, ClientError> {
    match request {
        GameRequest::Next {
            current_player,
            board,
            column,
        } => server
            .next(current_player, &board, column)
            .await
            .map(MoveReply::Play),
        GameRequest::Recommend {
            current_player,
            board,
        } => server
            .recommend(current_player, &board)
            .await
            .map(MoveReply::Recommend),
        GameRequest::Warm => Err(ClientError::Unexpected(
            "warm-up requests carry no move".into(),
        )),
    }
}

pub struct HttpGameServer {
    http: Client,
    endpoint: Url,
}

impl HttpGameServer {
    pub fn new(endpoint: Url) -> Self {
        Self {
            http: Client::new(),
            endpoint,
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        Ok(Self::new(settings.endpoint()?))
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn post(&self, request: &GameRequest) -> Result<serde_json::Value, ClientError> {
        debug!(action = request.action(), endpoint = %self.endpoint, "posting game request");
        let res = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let body = res.text().await?;
        serde_json::from_str(&body).map_err(ClientError::Malformed)
    }
}

#[async_trait]
impl GameServer for HttpGameServer {
    async fn next(
        &self,
        current_player: Disc,
        board: &Board,
        column: i64,
    ) -> Result<PlayResponse, ClientError> {
        let value = self
            .post(&GameRequest::Next {
                current_player,
                board: board.clone(),
                column,
            })
            .await?;
        Ok(decode_reply(value)?)
    }

    async fn recommend(
        &self,
        current_player: Disc,
        board: &Board,
    ) -> Result<RecommendResponse, ClientError> {
        let value = self
            .post(&GameRequest::Recommend {
                current_player,
                board: board.clone(),
            })
            .await?;
        Ok(decode_reply(value)?)
    }

    async fn warm(&self) -> Result<(), ClientError> {
        let res = self
            .http
            .post(self.endpoint.clone())
            .json(&GameRequest::Warm)
            .send()
            .await?;
        let status = res.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: res.text().await.unwrap_or_default(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
