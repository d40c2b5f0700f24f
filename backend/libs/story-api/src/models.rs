//! Wire models for the story service

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

/// A published story. Identity is `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: String,
    pub name: String,
    pub description: String,
    pub photo_url: String,
    /// ISO-8601 timestamp as sent by the server
    pub created_at: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

impl Story {
    pub fn has_location(&self) -> bool {
        self.lat.is_some() && self.lon.is_some()
    }
}

/// Common `{ error, message }` envelope of every response
pub trait ApiEnvelope: Sized {
    fn is_error(&self) -> bool;
    fn message(&self) -> &str;

    /// Turn a response flagged with `error: true` into [`ApiError::Business`]
    fn into_checked(self) -> ApiResult<Self> {
        if self.is_error() {
            Err(ApiError::Business(self.message().to_string()))
        } else {
            Ok(self)
        }
    }
}

macro_rules! impl_envelope {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ApiEnvelope for $ty {
                fn is_error(&self) -> bool {
                    self.error
                }

                fn message(&self) -> &str {
                    &self.message
                }
            }
        )+
    };
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoriesResponse {
    pub error: bool,
    pub message: String,
    #[serde(default)]
    pub list_story: Vec<Story>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryDetailResponse {
    pub error: bool,
    pub message: String,
    #[serde(default)]
    pub story: Option<Story>,
}

/// Response carrying only the envelope (register, story upload)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub error: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub error: bool,
    pub message: String,
    #[serde(default)]
    pub login_result: Option<LoginResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResult {
    pub user_id: String,
    pub name: String,
    pub token: String,
}

impl_envelope!(StoriesResponse, StoryDetailResponse, MessageResponse, LoginResponse);

/// `location` query parameter of `GET /stories`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationFilter {
    /// All stories
    Any,
    /// Only stories that carry coordinates
    WithLocation,
}

impl LocationFilter {
    pub fn as_param(self) -> u8 {
        match self {
            LocationFilter::Any => 0,
            LocationFilter::WithLocation => 1,
        }
    }
}

/// Query for `GET /stories`; unset fields are left to server defaults
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoryQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub location: Option<LocationFilter>,
}

impl StoryQuery {
    pub fn page(page: u32, size: u32) -> Self {
        Self {
            page: Some(page),
            size: Some(size),
            location: None,
        }
    }

    pub fn with_location(mut self) -> Self {
        self.location = Some(LocationFilter::WithLocation);
        self
    }

    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(3);
        if let Some(page) = self.page {
            params.push(("page", page.to_string()));
        }
        if let Some(size) = self.size {
            params.push(("size", size.to_string()));
        }
        if let Some(location) = self.location {
            params.push(("location", location.as_param().to_string()));
        }
        params
    }
}

/// Story upload payload; the photo is sent as the `photo` multipart part
#[derive(Clone, PartialEq)]
pub struct NewStory {
    pub description: String,
    pub photo: Vec<u8>,
    pub file_name: String,
    pub mime_type: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl NewStory {
    pub fn new(description: impl Into<String>, photo: Vec<u8>, file_name: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            photo,
            file_name: file_name.into(),
            mime_type: "image/jpeg".to_string(),
            lat: None,
            lon: None,
        }
    }

    pub fn with_location(mut self, lat: f64, lon: f64) -> Self {
        self.lat = Some(lat);
        self.lon = Some(lon);
        self
    }
}

impl std::fmt::Debug for NewStory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewStory")
            .field("description", &self.description)
            .field("photo_bytes", &self.photo.len())
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("lat", &self.lat)
            .field("lon", &self.lon)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stories_response_from_wire() {
        let body = r#"{
            "error": false,
            "message": "Stories fetched successfully",
            "listStory": [
                {
                    "id": "story-FvU4u0Vp2S3PMsFg",
                    "name": "Dimas",
                    "description": "Lorem Ipsum",
                    "photoUrl": "https://story-api.dicoding.dev/images/stories/photos-1641623658595_dummy-pic.png",
                    "createdAt": "2022-01-08T06:34:18.598Z",
                    "lat": -10.212,
                    "lon": -16.002
                },
                {
                    "id": "story-2",
                    "name": "Guest",
                    "description": "no location",
                    "photoUrl": "https://example.com/2.png",
                    "createdAt": "2022-01-09T06:34:18.598Z",
                    "lat": null,
                    "lon": null
                }
            ]
        }"#;

        let response: StoriesResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.list_story.len(), 2);
        assert_eq!(response.list_story[0].lat, Some(-10.212));
        assert!(response.list_story[0].has_location());
        assert!(!response.list_story[1].has_location());
    }

    #[test]
    fn test_error_envelope_becomes_business_error() {
        let body = r#"{"error": true, "message": "Missing authentication"}"#;
        let response: StoriesResponse = serde_json::from_str(body).unwrap();
        assert!(response.list_story.is_empty());
        assert_eq!(
            response.into_checked(),
            Err(ApiError::Business("Missing authentication".to_string()))
        );
    }

    #[test]
    fn test_login_response_from_wire() {
        let body = r#"{
            "error": false,
            "message": "success",
            "loginResult": {"userId": "user-yj5pc_LARC_AgK61", "name": "Arif Faizin", "token": "eyJhbGciOi"}
        }"#;
        let response: LoginResponse = serde_json::from_str(body).unwrap();
        let result = response.into_checked().unwrap().login_result.unwrap();
        assert_eq!(result.user_id, "user-yj5pc_LARC_AgK61");
        assert_eq!(result.token, "eyJhbGciOi");
    }

    #[test]
    fn test_query_params() {
        assert_eq!(
            StoryQuery::page(2, 20).to_params(),
            vec![("page", "2".to_string()), ("size", "20".to_string())]
        );
        assert_eq!(
            StoryQuery::default().with_location().to_params(),
            vec![("location", "1".to_string())]
        );
    }
}
