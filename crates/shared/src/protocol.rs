use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{CaseStatus, VenueId, WorkId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub profile_complete: bool,
}

/// One account record. Replaced wholesale on edit; the backend keeps no
/// partial-update endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub real_name: String,
    pub artist_name: String,
    #[serde(default)]
    pub collecting_society: String,
    #[serde(rename = "memberID", default)]
    pub member_id: String,
    #[serde(default)]
    pub social_media_links: String,
    #[serde(default)]
    pub genres: String,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Work {
    #[serde(rename = "_id")]
    pub id: WorkId,
    pub title: String,
    pub artist_name: String,
    #[serde(default)]
    pub iswc: String,
    #[serde(default)]
    pub venue: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_date: Option<NaiveDate>,
    #[serde(default)]
    pub dj_name: String,
    #[serde(default)]
    pub instagram_embed_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_file: Option<String>,
    pub status: CaseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkListResponse {
    pub works: Vec<Work>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

/// JSON submission shape used when the case reuses an already-registered
/// track. New-track submissions go out as multipart with the same field
/// names plus the binary `audioFile` part.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCasePayload {
    pub title: String,
    pub artist_name: String,
    pub iswc: String,
    pub venue: String,
    pub instagram_embed_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_date: Option<NaiveDate>,
    pub dj_name: String,
    pub work_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCaseResponse {
    pub work: Work,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditCaseRequest {
    pub title: String,
    pub artist_name: String,
    pub venue: String,
    pub instagram_embed_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_date: Option<NaiveDate>,
    pub dj_name: String,
}

impl From<&Work> for EditCaseRequest {
    fn from(work: &Work) -> Self {
        Self {
            title: work.title.clone(),
            artist_name: work.artist_name.clone(),
            venue: work.venue.clone(),
            instagram_embed_code: work.instagram_embed_code.clone(),
            video_date: work.video_date,
            dj_name: work.dj_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditCaseResponse {
    pub work: Work,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: CaseStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueSuggestion {
    #[serde(rename = "_id")]
    pub id: VenueId,
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstagramEmbedRequest {
    pub instagram_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstagramEmbedResponse {
    pub embed_html: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn work_decodes_backend_field_names() {
        let raw = r#"{
            "_id": "64f0c2",
            "title": "Gaga",
            "artistName": "Lee Burton",
            "iswc": "T-123.456.789-0",
            "venue": "Caprices Festival",
            "videoDate": "2024-01-01",
            "djName": "Raresh",
            "instagramEmbedCode": "https://www.instagram.com/p/abc/",
            "audioFile": "uploads/gaga.mp3",
            "status": "In Review"
        }"#;
        let work: Work = serde_json::from_str(raw).expect("decode");
        assert_eq!(work.id.as_str(), "64f0c2");
        assert_eq!(work.artist_name, "Lee Burton");
        assert_eq!(work.status, CaseStatus::InReview);
        assert_eq!(
            work.video_date,
            Some(NaiveDate::from_ymd_opt(2024, 1, 1).expect("date"))
        );
    }

    #[test]
    fn profile_keeps_member_id_casing() {
        let profile = Profile {
            real_name: "Maria Ionescu".into(),
            artist_name: "Raresh".into(),
            member_id: "GEMA-991".into(),
            ..Profile::default()
        };
        let encoded = serde_json::to_value(&profile).expect("encode");
        assert!(encoded.get("memberID").is_some());
        assert!(encoded.get("realName").is_some());
    }
}
