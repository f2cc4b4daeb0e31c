use std::sync::Arc;

use reqwest::{multipart::Form, Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use session_store::SessionStore;
use shared::{
    domain::{CaseStatus, WorkId},
    error::ApiError,
    protocol::{
        CreateCasePayload, CreateCaseResponse, EditCaseRequest, EditCaseResponse,
        InstagramEmbedRequest, InstagramEmbedResponse, LoginRequest, LoginResponse, Profile,
        SignupRequest, UpdateStatusRequest, VenueSuggestion, Work, WorkListResponse,
    },
};
use tokio::sync::broadcast;
use tracing::{info, warn};
use url::Url;

pub mod draft;
pub mod error;
pub mod lookup;
pub mod scope;
mod upload;

pub use draft::{AudioAttachment, CaseDraft, TrackSource};
pub use error::{ClientError, Result};
pub use lookup::{VenueLookup, VENUE_QUERY_QUIET_PERIOD};
pub use scope::RequestScope;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Where to send the user after a successful login, derived from the
/// server's profile-completeness flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostLoginDestination {
    ProfileSetup,
    Dashboard,
}

/// Status filter for the case list. `All` omits the status parameter
/// entirely so the server returns every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(CaseStatus),
}

impl StatusFilter {
    fn as_query(&self) -> Option<CaseStatus> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Only(status) => Some(*status),
        }
    }
}

/// Destructive operations must be acknowledged explicitly; the unconfirmed
/// variant never reaches the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteConfirmation {
    Unconfirmed,
    Confirmed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Declined,
}

#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// Emitted once by the gateway whenever any request comes back 401.
    SessionExpired,
    UploadProgress {
        percent: u8,
    },
    CasesRefreshed {
        count: usize,
    },
    Error(String),
}

#[derive(Serialize)]
struct ListWorksQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<CaseStatus>,
    page: u32,
    limit: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchWorksQuery {
    title: String,
    artist_name: String,
    iswc: String,
    page: u32,
    limit: u32,
}

#[derive(Serialize)]
struct VenueSearchQuery {
    query: String,
}

/// Client engine for the case management API.
///
/// Owns the HTTP client, the base URL and the injected session store; all
/// page-level flows go through it. There is deliberately no cross-flow
/// cache: every listing re-fetches and every mutation reconciles from the
/// server's response.
pub struct CaseClient {
    http: Client,
    base_url: String,
    session: Arc<dyn SessionStore>,
    events: broadcast::Sender<ClientEvent>,
}

impl CaseClient {
    pub fn new(base_url: impl Into<String>, session: Arc<dyn SessionStore>) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    pub(crate) fn send_event(&self, event: ClientEvent) {
        let _ = self.events.send(event);
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn bearer_token(&self) -> Result<String> {
        self.session
            .load()
            .map_err(ClientError::Store)?
            .ok_or(ClientError::Unauthorized)
    }

    /// Single choke point for authorized traffic: attaches the bearer token
    /// and funnels the response through the 401 interceptor.
    async fn send_authorized(&self, builder: RequestBuilder) -> Result<Response> {
        let token = self.bearer_token()?;
        let response = builder.bearer_auth(token).send().await?;
        self.ensure_success(response).await
    }

    async fn send_public(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        self.ensure_success(response).await
    }

    /// Global unauthorized handling: any 401, from any flow, clears the
    /// persisted session exactly once here and notifies subscribers.
    async fn ensure_success(&self, response: Response) -> Result<Response> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            if let Err(err) = self.session.clear() {
                warn!("failed to clear session after 401: {err}");
            }
            self.send_event(ClientEvent::SessionExpired);
            return Err(ClientError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|api| api.message)
                .unwrap_or_else(|_| {
                    if body.is_empty() {
                        status
                            .canonical_reason()
                            .unwrap_or("request failed")
                            .to_string()
                    } else {
                        body
                    }
                });
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }

    pub async fn signup(&self, email: &str, password: &str) -> Result<()> {
        self.send_public(self.http.post(self.endpoint("/auth/signup")).json(
            &SignupRequest {
                email: email.to_string(),
                password: password.to_string(),
            },
        ))
        .await?;
        info!("signup accepted for {email}");
        Ok(())
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<PostLoginDestination> {
        let response = self
            .send_public(self.http.post(self.endpoint("/auth/login")).json(
                &LoginRequest {
                    email: email.to_string(),
                    password: password.to_string(),
                },
            ))
            .await?;
        let body: LoginResponse = response.json().await?;

        self.session
            .store(&body.token)
            .map_err(ClientError::Store)?;
        info!(
            profile_complete = body.profile_complete,
            "login succeeded, session persisted"
        );

        Ok(if body.profile_complete {
            PostLoginDestination::Dashboard
        } else {
            PostLoginDestination::ProfileSetup
        })
    }

    pub fn logout(&self) -> Result<()> {
        self.session.clear().map_err(ClientError::Store)?;
        info!("session cleared");
        Ok(())
    }

    pub async fn fetch_profile(&self) -> Result<Profile> {
        let response = self
            .send_authorized(self.http.get(self.endpoint("/auth/profile")))
            .await?;
        Ok(response.json().await?)
    }

    /// Full-record replace; the server's response is the new local truth.
    pub async fn replace_profile(&self, profile: &Profile) -> Result<Profile> {
        let response = self
            .send_authorized(self.http.put(self.endpoint("/auth/profile")).json(profile))
            .await?;
        Ok(response.json().await?)
    }

    pub async fn list_works(
        &self,
        filter: StatusFilter,
        page: u32,
        limit: u32,
    ) -> Result<Vec<Work>> {
        let response = self
            .send_authorized(self.http.get(self.endpoint("/works")).query(
                &ListWorksQuery {
                    status: filter.as_query(),
                    page,
                    limit,
                },
            ))
            .await?;
        let list: WorkListResponse = response.json().await?;
        self.send_event(ClientEvent::CasesRefreshed {
            count: list.works.len(),
        });
        Ok(list.works)
    }

    pub async fn search_works(
        &self,
        title: &str,
        artist_name: &str,
        iswc: &str,
    ) -> Result<Vec<Work>> {
        let response = self
            .send_authorized(self.http.get(self.endpoint("/works/search")).query(
                &SearchWorksQuery {
                    title: title.trim().to_string(),
                    artist_name: artist_name.trim().to_string(),
                    iswc: iswc.trim().to_string(),
                    page: DEFAULT_PAGE,
                    limit: DEFAULT_PAGE_SIZE,
                },
            ))
            .await?;
        let list: WorkListResponse = response.json().await?;
        Ok(list.works)
    }

    pub async fn fetch_work(&self, id: &WorkId) -> Result<Work> {
        let response = self
            .send_authorized(self.http.get(self.endpoint(&format!("/works/{id}"))))
            .await?;
        Ok(response.json().await?)
    }

    /// Validates locally first: an incomplete draft costs zero network
    /// calls. A failed submission leaves the draft intact for retry; a
    /// successful one resets it.
    pub async fn submit_case(&self, draft: &mut CaseDraft) -> Result<Work> {
        if let Err(problems) = draft.validate() {
            return Err(ClientError::Validation(problems));
        }

        let work_number = draft.work_number();
        let result = match &draft.track {
            TrackSource::New { audio, .. } => {
                self.submit_multipart(draft, &audio.clone(), &work_number).await
            }
            TrackSource::Existing(_) => self.submit_json(draft, &work_number).await,
            TrackSource::Unset => {
                return Err(ClientError::Validation(vec![
                    "select an existing track or attach a new recording".to_string(),
                ]))
            }
        };

        let work = result?;
        draft.reset();
        Ok(work)
    }

    async fn submit_multipart(
        &self,
        draft: &CaseDraft,
        audio: &AudioAttachment,
        work_number: &str,
    ) -> Result<Work> {
        let mut form = Form::new()
            .text("title", draft.title().to_string())
            .text("artistName", draft.artist_name().to_string())
            .text("iswc", draft.iswc().to_string())
            .text("venue", draft.venue.clone())
            .text("instagramEmbedCode", draft.instagram_url.clone())
            .text("djName", draft.dj_name.clone())
            .text("workNumber", work_number.to_string())
            .part("audioFile", upload::progress_part(audio, self.events.clone())?);
        if let Some(date) = draft.video_date {
            form = form.text("videoDate", date.to_string());
        }

        let outcome = self
            .send_authorized(
                self.http
                    .post(self.endpoint("/works/create-case"))
                    .multipart(form),
            )
            .await;
        // Progress resets whether the upload landed or not.
        self.send_event(ClientEvent::UploadProgress { percent: 0 });

        let created: CreateCaseResponse = outcome?.json().await?;
        Ok(created.work)
    }

    async fn submit_json(&self, draft: &CaseDraft, work_number: &str) -> Result<Work> {
        let payload = CreateCasePayload {
            title: draft.title().to_string(),
            artist_name: draft.artist_name().to_string(),
            iswc: draft.iswc().to_string(),
            venue: draft.venue.clone(),
            instagram_embed_code: draft.instagram_url.clone(),
            video_date: draft.video_date,
            dj_name: draft.dj_name.clone(),
            work_number: work_number.to_string(),
        };
        let response = self
            .send_authorized(
                self.http
                    .post(self.endpoint("/works/create-case"))
                    .json(&payload),
            )
            .await?;
        let created: CreateCaseResponse = response.json().await?;
        Ok(created.work)
    }

    /// Full-record update; callers replace their local copy with the
    /// returned work rather than patching fields themselves.
    pub async fn edit_case(&self, id: &WorkId, edit: &EditCaseRequest) -> Result<Work> {
        let response = self
            .send_authorized(
                self.http
                    .put(self.endpoint(&format!("/works/{id}/edit-case")))
                    .json(edit),
            )
            .await?;
        let updated: EditCaseResponse = response.json().await?;
        Ok(updated.work)
    }

    /// Transition the review status, then re-fetch the list under the
    /// current filter. Re-fetching instead of patching in place is a
    /// deliberate trade: the server stays the single source of truth.
    pub async fn update_status(
        &self,
        id: &WorkId,
        status: CaseStatus,
        filter: StatusFilter,
    ) -> Result<Vec<Work>> {
        self.send_authorized(
            self.http
                .put(self.endpoint(&format!("/works/{id}/update-status")))
                .json(&UpdateStatusRequest { status }),
        )
        .await?;
        info!(work_id = %id, status = %status, "case status updated");

        self.list_works(filter, DEFAULT_PAGE, DEFAULT_PAGE_SIZE).await
    }

    pub async fn delete_case(
        &self,
        id: &WorkId,
        confirmation: DeleteConfirmation,
    ) -> Result<DeleteOutcome> {
        if confirmation == DeleteConfirmation::Unconfirmed {
            return Ok(DeleteOutcome::Declined);
        }

        self.send_authorized(self.http.delete(self.endpoint(&format!("/works/{id}"))))
            .await?;
        info!(work_id = %id, "case deleted");
        Ok(DeleteOutcome::Deleted)
    }

    /// Resolve embeddable markup for an Instagram reference. Anything that
    /// is not an instagram.com URL is skipped without a request.
    pub async fn fetch_instagram_embed(&self, url: &str) -> Result<Option<String>> {
        if !is_instagram_url(url) {
            return Ok(None);
        }

        let response = self
            .send_authorized(
                self.http
                    .post(self.endpoint("/works/instagram-embed"))
                    .json(&InstagramEmbedRequest {
                        instagram_url: url.to_string(),
                    }),
            )
            .await?;
        let embed: InstagramEmbedResponse = response.json().await?;
        Ok(Some(embed.embed_html))
    }

    /// Raw venue lookup; interactive callers go through [`VenueLookup`]
    /// for debouncing and stale-response protection.
    pub async fn search_venues(&self, query: &str) -> Result<Vec<VenueSuggestion>> {
        let response = self
            .send_authorized(self.http.get(self.endpoint("/venues/search")).query(
                &VenueSearchQuery {
                    query: query.to_string(),
                },
            ))
            .await?;
        Ok(response.json().await?)
    }
}

fn is_instagram_url(raw: &str) -> bool {
    Url::parse(raw).is_ok_and(|url| {
        url.scheme() == "https" && url.host_str() == Some("www.instagram.com")
    })
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "tests/lookup_tests.rs"]
mod lookup_tests;
