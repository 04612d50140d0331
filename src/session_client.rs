use crate::{
    error::{
        Result,
        SessionError,
    },
    session::{
        Action,
        ActionResult,
        AdminCommand,
        GameListDto,
        GameSnapshot,
        GameSummary,
        SessionId,
    },
};
use serde::{
    Serialize,
    de::DeserializeOwned,
};
use std::{
    fmt,
    future::Future,
};
use tracing::warn;

/// Request/response boundary to the remote session.
pub trait SessionApi: Send + Sync + 'static {
    /// `GET /api/game/{id}/state`
    fn fetch_state(
        &self,
        session: &SessionId,
    ) -> impl Future<Output = Result<GameSnapshot>> + Send;

    /// `POST /api/game/{id}/action` with the action name merged into the payload
    fn send_action(
        &self,
        session: &SessionId,
        action: &Action,
    ) -> impl Future<Output = Result<ActionResult>> + Send;

    /// `POST /api/game/{id}/{message|terminate|reset}`; the reply body is not interpreted
    fn send_admin(
        &self,
        session: &SessionId,
        command: &AdminCommand,
    ) -> impl Future<Output = Result<()>> + Send;

    /// `POST /api/game/{id}/undo`
    fn undo(&self, session: &SessionId) -> impl Future<Output = Result<ActionResult>> + Send;

    /// `GET /api/games`
    fn list_games(&self) -> impl Future<Output = Result<Vec<GameSummary>>> + Send;
}

#[derive(Clone)]
pub struct SessionClient {
    base_url: String,
    http: reqwest::Client,
}

#[derive(Serialize)]
struct MessageBody<'a> {
    message: &'a str,
}

impl SessionClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = reqwest::Client::builder().build()?;
        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn game_url(&self, session: &SessionId, endpoint: &str) -> String {
        format!("{}/api/game/{}/{}", self.base_url, session, endpoint)
    }

    /// Decodes a structured `{success, message}` reply.
    ///
    /// The session answers rejected actions with a decodable body even on error
    /// statuses, so the status is only consulted once decoding has failed.
    async fn read_action_result(res: reqwest::Response) -> Result<ActionResult> {
        let status = res.status();
        let bytes = res.bytes().await?;
        match serde_json::from_slice::<ActionResult>(&bytes) {
            Ok(result) => Ok(result),
            Err(_) if !status.is_success() => Err(SessionError::Status {
                status,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            }),
            Err(err) => Err(err.into()),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T> {
        let res = self.http.get(url).send().await?;
        let status = res.status();
        let bytes = res.bytes().await?;
        if !status.is_success() {
            return Err(SessionError::Status {
                status,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl SessionApi for SessionClient {
    async fn fetch_state(&self, session: &SessionId) -> Result<GameSnapshot> {
        self.get_json(self.game_url(session, "state")).await
    }

    async fn send_action(
        &self,
        session: &SessionId,
        action: &Action,
    ) -> Result<ActionResult> {
        let res = self
            .http
            .post(self.game_url(session, "action"))
            .json(action)
            .send()
            .await?;
        Self::read_action_result(res).await
    }

    async fn send_admin(&self, session: &SessionId, command: &AdminCommand) -> Result<()> {
        let url = self.game_url(session, command.endpoint());
        let request = match command {
            AdminCommand::Message(message) => self.http.post(url).json(&MessageBody { message }),
            _ => self.http.post(url),
        };
        let res = request.send().await?;
        let status = res.status();
        if !status.is_success() {
            warn!(%status, endpoint = command.endpoint(), "admin request not accepted");
        }
        Ok(())
    }

    async fn undo(&self, session: &SessionId) -> Result<ActionResult> {
        let res = self.http.post(self.game_url(session, "undo")).send().await?;
        Self::read_action_result(res).await
    }

    async fn list_games(&self) -> Result<Vec<GameSummary>> {
        let url = format!("{}/api/games", self.base_url);
        let dto: GameListDto = self.get_json(url).await?;
        Ok(dto.games)
    }
}

impl fmt::Display for SessionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base_url)
    }
}
