//! HTTP client for the story service
//!
//! Provides the [`StoryApi`] seam and its reqwest implementation

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;

use crate::config::ApiConfig;
use crate::credential::Credential;
use crate::error::{ApiError, ApiResult};
use crate::models::{
    LoginRequest, LoginResponse, MessageResponse, NewStory, RegisterRequest, StoriesResponse,
    StoryDetailResponse, StoryQuery,
};

/// Remote story service.
///
/// Responses are returned as received; a body flagged with `error: true`
/// is still `Ok` and callers decide how to surface it
/// (see [`ApiEnvelope::into_checked`](crate::ApiEnvelope::into_checked)).
#[async_trait]
pub trait StoryApi: Send + Sync {
    /// `GET /stories`
    async fn list_stories(
        &self,
        credential: &Credential,
        query: StoryQuery,
    ) -> ApiResult<StoriesResponse>;

    /// `GET /stories/{id}`
    async fn story_detail(
        &self,
        credential: &Credential,
        id: &str,
    ) -> ApiResult<StoryDetailResponse>;

    /// `POST /stories`; rejects the guest credential without sending anything
    async fn add_story(&self, credential: &Credential, story: NewStory)
        -> ApiResult<MessageResponse>;

    /// `POST /stories/guest`, never authenticated
    async fn add_story_as_guest(&self, story: NewStory) -> ApiResult<MessageResponse>;

    /// `POST /login`
    async fn login(&self, request: LoginRequest) -> ApiResult<LoginResponse>;

    /// `POST /register`
    async fn register(&self, request: RegisterRequest) -> ApiResult<MessageResponse>;
}

pub struct HttpStoryApi {
    client: Client,
    base_url: String,
}

impl HttpStoryApi {
    pub fn new(config: &ApiConfig) -> ApiResult<Self> {
        let client = Client::builder()
            .connect_timeout(config.timeout())
            .timeout(config.timeout())
            .build()
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// `{base}/stories/{id}` with `id` escaped as a single path segment
    fn story_url(&self, id: &str) -> ApiResult<Url> {
        if id.is_empty() || id == "." || id == ".." {
            return Err(ApiError::InvalidRequest(format!("Invalid story id: {:?}", id)));
        }

        let mut url = Url::parse(&self.url("stories"))
            .map_err(|e| ApiError::InvalidRequest(format!("Invalid base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidRequest("Base URL cannot carry a path".to_string()))?
            .push(id);
        Ok(url)
    }

    fn authorize(builder: RequestBuilder, credential: &Credential) -> RequestBuilder {
        match credential.bearer_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn story_form(story: NewStory) -> ApiResult<Form> {
        let photo = Part::bytes(story.photo)
            .file_name(story.file_name)
            .mime_str(&story.mime_type)
            .map_err(|e| ApiError::InvalidRequest(format!("Invalid photo mime type: {}", e)))?;

        let mut form = Form::new()
            .text("description", story.description)
            .part("photo", photo);
        if let (Some(lat), Some(lon)) = (story.lat, story.lon) {
            form = form.text("lat", lat.to_string()).text("lon", lon.to_string());
        }
        Ok(form)
    }

    async fn read<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let message = serde_json::from_str::<MessageResponse>(&body)
                .map(|envelope| envelope.message)
                .unwrap_or(body);
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response.json::<T>().await.map_err(ApiError::from)
    }
}

#[async_trait]
impl StoryApi for HttpStoryApi {
    async fn list_stories(
        &self,
        credential: &Credential,
        query: StoryQuery,
    ) -> ApiResult<StoriesResponse> {
        debug!(
            page = ?query.page,
            size = ?query.size,
            location = ?query.location,
            guest = credential.is_guest(),
            "GET /stories"
        );

        let request = self.client.get(self.url("stories")).query(&query.to_params());
        let response = Self::authorize(request, credential).send().await?;
        Self::read(response).await
    }

    async fn story_detail(
        &self,
        credential: &Credential,
        id: &str,
    ) -> ApiResult<StoryDetailResponse> {
        debug!(story_id = id, "GET /stories/{{id}}");

        let request = self.client.get(self.story_url(id)?);
        let response = Self::authorize(request, credential).send().await?;
        Self::read(response).await
    }

    async fn add_story(
        &self,
        credential: &Credential,
        story: NewStory,
    ) -> ApiResult<MessageResponse> {
        let Some(token) = credential.bearer_token() else {
            return Err(ApiError::Unauthorized(
                "Story upload requires a logged-in session".to_string(),
            ));
        };
        debug!(photo_bytes = story.photo.len(), "POST /stories");

        let form = Self::story_form(story)?;
        let response = self
            .client
            .post(self.url("stories"))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;
        Self::read(response).await
    }

    async fn add_story_as_guest(&self, story: NewStory) -> ApiResult<MessageResponse> {
        debug!(photo_bytes = story.photo.len(), "POST /stories/guest");

        let form = Self::story_form(story)?;
        let response = self
            .client
            .post(self.url("stories/guest"))
            .multipart(form)
            .send()
            .await?;
        Self::read(response).await
    }

    async fn login(&self, request: LoginRequest) -> ApiResult<LoginResponse> {
        info!(email = %request.email, "POST /login");

        let response = self
            .client
            .post(self.url("login"))
            .json(&request)
            .send()
            .await?;
        Self::read(response).await
    }

    async fn register(&self, request: RegisterRequest) -> ApiResult<MessageResponse> {
        info!(email = %request.email, "POST /register");

        let response = self
            .client
            .post(self.url("register"))
            .json(&request)
            .send()
            .await?;
        Self::read(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation_trims_base_url() {
        let api = HttpStoryApi::new(&ApiConfig::new("http://localhost:8080/v1/")).unwrap();
        assert_eq!(api.base_url(), "http://localhost:8080/v1");
        assert_eq!(api.url("stories"), "http://localhost:8080/v1/stories");
    }

    #[test]
    fn test_story_url_escapes_id() {
        let api = HttpStoryApi::new(&ApiConfig::new("http://localhost:8080/v1")).unwrap();
        assert_eq!(
            api.story_url("story-1").unwrap().as_str(),
            "http://localhost:8080/v1/stories/story-1"
        );
        assert_eq!(
            api.story_url("x/../../login?a=1#f").unwrap().path(),
            "/v1/stories/x%2F..%2F..%2Flogin%3Fa=1%23f"
        );
        assert!(matches!(api.story_url(".."), Err(ApiError::InvalidRequest(_))));
        assert!(matches!(api.story_url(""), Err(ApiError::InvalidRequest(_))));
    }

    #[test]
    fn test_story_form_rejects_bad_mime() {
        let mut story = NewStory::new("hello", vec![1, 2, 3], "photo.jpg");
        story.mime_type = "not a mime".to_string();
        assert!(matches!(
            HttpStoryApi::story_form(story),
            Err(ApiError::InvalidRequest(_))
        ));
    }
}
