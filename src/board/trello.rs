use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::api::{ApiError, BoardApi};
use super::{BoardSummary, Card, List};

const DEFAULT_TRELLO_API_URL: &str = "https://api.trello.com/1";
const REQUEST_TIMEOUT_SECS: u64 = 12;

#[derive(Clone, PartialEq, Eq)]
pub struct TrelloConfig {
    pub api_url: String,
    pub api_key: String,
    pub token: String,
}

impl fmt::Debug for TrelloConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrelloConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"<redacted>")
            .field("token", &"<redacted>")
            .finish()
    }
}

impl TrelloConfig {
    pub fn new(api_key: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_TRELLO_API_URL.to_owned(),
            api_key: api_key.into().trim().to_owned(),
            token: token.into().trim().to_owned(),
        }
    }

    pub fn can_auth(&self) -> bool {
        !self.api_key.is_empty() && !self.token.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct RawBoard {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawList {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCard {
    id: String,
    #[serde(default)]
    id_list: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    desc: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    short_url: String,
}

impl RawCard {
    fn into_card(self, list_names: &HashMap<String, String>) -> Card {
        let list_name = list_names.get(&self.id_list).cloned().unwrap_or_default();
        Card {
            id: self.id,
            list_id: self.id_list,
            list_name,
            name: self.name,
            desc: self.desc,
            url: self.url,
            short_url: self.short_url,
        }
    }
}

impl From<RawList> for List {
    fn from(raw: RawList) -> Self {
        List { id: raw.id, name: raw.name }
    }
}

/// Trello REST client. Credentials travel as `key`/`token` parameters on every call.
#[derive(Clone)]
pub struct TrelloClient {
    config: TrelloConfig,
    client: Client,
}

impl TrelloClient {
    pub fn new(config: TrelloConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|error| ApiError::Client(error.to_string()))?;
        Ok(Self { config, client })
    }

    fn endpoint(&self, path: &str) -> String {
        let base = self.config.api_url.trim_end_matches('/');
        let suffix = path.trim_start_matches('/');
        format!("{base}/{suffix}")
    }

    fn auth(&self) -> Result<[(&'static str, &str); 2], ApiError> {
        if !self.config.can_auth() {
            return Err(ApiError::MissingCredentials);
        }
        Ok([("key", self.config.api_key.as_str()), ("token", self.config.token.as_str())])
    }

    fn get(&self, path: &str, fields: &str) -> Result<RequestBuilder, ApiError> {
        Ok(self
            .client
            .get(self.endpoint(path))
            .query(&self.auth()?)
            .query(&[("fields", fields), ("filter", "open")]))
    }

    fn put_form(&self, path: &str, form: &[(&str, &str)]) -> Result<RequestBuilder, ApiError> {
        let mut params: Vec<(&str, &str)> = form.to_vec();
        params.extend(self.auth()?);
        Ok(self.client.put(self.endpoint(path)).form(&params))
    }

    fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Result<RequestBuilder, ApiError> {
        let mut params: Vec<(&str, &str)> = form.to_vec();
        params.extend(self.auth()?);
        Ok(self.client.post(self.endpoint(path)).form(&params))
    }

    async fn request_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let body = Self::send(request).await?;
        serde_json::from_str(&body).map_err(|error| ApiError::Decode(error.to_string()))
    }

    async fn request_status_only(&self, request: RequestBuilder) -> Result<(), ApiError> {
        Self::send(request).await.map(|_| ())
    }

    async fn send(request: RequestBuilder) -> Result<String, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|error| ApiError::Transport(error.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| ApiError::Transport(format!("response read failed: {error}")))?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.to_string(),
                body: body.trim().to_owned(),
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl BoardApi for TrelloClient {
    async fn list_boards(&self) -> Result<Vec<BoardSummary>, ApiError> {
        let raw: Vec<RawBoard> = self
            .request_json(self.get("/members/me/boards", "id,name")?)
            .await?;
        Ok(raw
            .into_iter()
            .map(|b| BoardSummary { id: b.id, name: b.name })
            .collect())
    }

    async fn list_lists(&self, board_id: &str) -> Result<Vec<List>, ApiError> {
        if board_id.is_empty() {
            return Err(ApiError::MissingBoardId);
        }
        let raw: Vec<RawList> = self
            .request_json(self.get(&format!("/boards/{board_id}/lists"), "id,name")?)
            .await?;
        Ok(raw.into_iter().map(List::from).collect())
    }

    async fn list_cards(&self, board_id: &str) -> Result<Vec<Card>, ApiError> {
        let lists = self.list_lists(board_id).await?;
        let names: HashMap<String, String> =
            lists.into_iter().map(|l| (l.id, l.name)).collect();

        let raw: Vec<RawCard> = self
            .request_json(self.get(
                &format!("/boards/{board_id}/cards"),
                "id,name,desc,idList,url,shortUrl",
            )?)
            .await?;
        Ok(raw.into_iter().map(|c| c.into_card(&names)).collect())
    }

    async fn move_card(&self, card_id: &str, list_id: &str) -> Result<(), ApiError> {
        self.request_status_only(self.put_form(&format!("/cards/{card_id}"), &[("idList", list_id)])?)
            .await
    }

    async fn update_card(
        &self,
        card_id: &str,
        name: Option<&str>,
        desc: Option<&str>,
    ) -> Result<(), ApiError> {
        let mut form = Vec::with_capacity(2);
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            form.push(("name", name));
        }
        if let Some(desc) = desc.filter(|d| !d.is_empty()) {
            form.push(("desc", desc));
        }
        self.request_status_only(self.put_form(&format!("/cards/{card_id}"), &form)?)
            .await
    }

    async fn add_comment(&self, card_id: &str, text: &str) -> Result<(), ApiError> {
        self.request_status_only(
            self.post_form(&format!("/cards/{card_id}/actions/comments"), &[("text", text)])?,
        )
        .await
    }

    async fn archive_card(&self, card_id: &str) -> Result<(), ApiError> {
        self.request_status_only(self.put_form(&format!("/cards/{card_id}"), &[("closed", "true")])?)
            .await
    }

    async fn create_card(&self, list_id: &str, name: &str) -> Result<Card, ApiError> {
        let raw: RawCard = self
            .request_json(self.post_form(&format!("/lists/{list_id}/cards"), &[("name", name)])?)
            .await?;
        Ok(raw.into_card(&HashMap::new()))
    }

    async fn create_list(&self, board_id: &str, name: &str) -> Result<List, ApiError> {
        if board_id.is_empty() {
            return Err(ApiError::MissingBoardId);
        }
        let raw: RawList = self
            .request_json(self.post_form(&format!("/boards/{board_id}/lists"), &[("name", name)])?)
            .await?;
        Ok(raw.into())
    }

    async fn archive_list(&self, list_id: &str) -> Result<(), ApiError> {
        self.request_status_only(
            self.put_form(&format!("/lists/{list_id}/closed"), &[("value", "true")])?,
        )
        .await
    }
}
