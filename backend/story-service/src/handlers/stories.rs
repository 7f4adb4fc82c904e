/// Story handlers - HTTP endpoints for story operations
use crate::error::{AppError, Result};
use crate::services::{BoostService, StoryService};
use actix_web::{web, HttpResponse};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ListStoriesQuery {
    pub tag: Option<String>,
    /// Kept as text so a bad value gets our 400 body instead of actix's
    pub limit: Option<String>,
}

impl ListStoriesQuery {
    fn limit(&self) -> Result<Option<usize>> {
        match self.limit.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw.parse().map(Some).map_err(|_| {
                AppError::ValidationError("limit must be a non-negative integer.".into())
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SubmitStoryRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub title: Option<String>,
    pub tag: Option<String>,
    pub story: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub email: Option<String>,
}

/// List stories, newest first
pub async fn list_stories(
    service: web::Data<StoryService>,
    query: web::Query<ListStoriesQuery>,
) -> Result<HttpResponse> {
    let limit = query.limit()?;
    let stories = service.list(query.tag.as_deref(), limit).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "stories": stories })))
}

/// Get a story
pub async fn get_story(
    service: web::Data<StoryService>,
    story_id: web::Path<String>,
) -> Result<HttpResponse> {
    let story = service.get(&story_id).await?;
    Ok(HttpResponse::Ok().json(story))
}

/// Submit a new story
pub async fn submit_story(
    service: web::Data<StoryService>,
    req: web::Json<SubmitStoryRequest>,
) -> Result<HttpResponse> {
    let field = |value: &Option<String>| value.clone().unwrap_or_default();

    let story = service
        .submit(
            &field(&req.name),
            &field(&req.email),
            &field(&req.title),
            &field(&req.tag),
            &field(&req.story),
        )
        .await?;

    Ok(HttpResponse::Created().json(story))
}

/// Vote for a story, once per email
pub async fn vote_story(
    service: web::Data<StoryService>,
    story_id: web::Path<String>,
    req: web::Json<VoteRequest>,
) -> Result<HttpResponse> {
    let new_count = service.vote(&story_id, req.email.as_deref()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "newVoteCount": new_count,
    })))
}

/// Client-side payment configuration. Only the publishable key leaves the
/// server.
pub async fn public_config(boost: web::Data<BoostService>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "stripePublishableKey": boost.publishable_key(),
    }))
}
