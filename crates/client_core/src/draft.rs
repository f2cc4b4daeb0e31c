use chrono::{NaiveDate, Utc};
use shared::protocol::{VenueSuggestion, Work};

/// Where the case's track comes from: picked from the existing catalogue via
/// search, or registered fresh alongside an audio upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum TrackSource {
    #[default]
    Unset,
    Existing(Work),
    New {
        audio: AudioAttachment,
        title: String,
        artist_name: String,
        iswc: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AudioAttachment {
    pub filename: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Local draft of a case submission. Lives entirely on the client until
/// `CaseClient::submit_case` ships it; a failed submission leaves the draft
/// untouched so the user can retry, a successful one resets it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaseDraft {
    pub track: TrackSource,
    pub instagram_url: String,
    pub venue: String,
    pub selected_venue: Option<VenueSuggestion>,
    pub video_date: Option<NaiveDate>,
    pub dj_name: String,
}

impl CaseDraft {
    pub fn select_existing_track(&mut self, work: Work) {
        self.track = TrackSource::Existing(work);
    }

    pub fn attach_new_track(
        &mut self,
        audio: AudioAttachment,
        title: impl Into<String>,
        artist_name: impl Into<String>,
        iswc: impl Into<String>,
    ) {
        self.track = TrackSource::New {
            audio,
            title: title.into(),
            artist_name: artist_name.into(),
            iswc: iswc.into(),
        };
    }

    pub fn title(&self) -> &str {
        match &self.track {
            TrackSource::Unset => "",
            TrackSource::Existing(work) => &work.title,
            TrackSource::New { title, .. } => title,
        }
    }

    pub fn artist_name(&self) -> &str {
        match &self.track {
            TrackSource::Unset => "",
            TrackSource::Existing(work) => &work.artist_name,
            TrackSource::New { artist_name, .. } => artist_name,
        }
    }

    pub fn iswc(&self) -> &str {
        match &self.track {
            TrackSource::Unset => "",
            TrackSource::Existing(work) => &work.iswc,
            TrackSource::New { iswc, .. } => iswc,
        }
    }

    /// Client-side defense in depth; the server remains authoritative.
    /// Returns every problem at once so forms can show them inline.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut problems = Vec::new();

        match &self.track {
            TrackSource::Unset => {
                problems
                    .push("select an existing track or attach a new recording".to_string());
            }
            TrackSource::New {
                audio,
                title,
                artist_name,
                iswc,
            } => {
                if audio.bytes.is_empty() {
                    problems.push("attached audio file is empty".to_string());
                }
                if title.trim().is_empty() {
                    problems.push("track title is required for a new track".to_string());
                }
                if artist_name.trim().is_empty() {
                    problems.push("artist name is required for a new track".to_string());
                }
                if iswc.trim().is_empty() {
                    problems.push("ISWC is required for a new track".to_string());
                }
            }
            TrackSource::Existing(_) => {}
        }

        if self.instagram_url.trim().is_empty() {
            problems.push("Instagram URL is required".to_string());
        }
        if self.venue.trim().is_empty() {
            problems.push("venue is required".to_string());
        }
        if self.video_date.is_none() {
            problems.push("video date is required".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems)
        }
    }

    /// Stable reference for the submitted work: the catalogue id when a
    /// track is reused, otherwise an artist-title-timestamp surrogate.
    pub fn work_number(&self) -> String {
        match &self.track {
            TrackSource::Existing(work) => work.id.0.clone(),
            _ => format!(
                "{}-{}-{}",
                self.artist_name(),
                self.title(),
                Utc::now().timestamp_millis()
            ),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use shared::domain::{CaseStatus, WorkId};

    use super::*;

    fn sample_work() -> Work {
        Work {
            id: WorkId::new("64f0c2"),
            title: "Gaga".into(),
            artist_name: "Lee Burton".into(),
            iswc: "T-123.456.789-0".into(),
            venue: String::new(),
            video_date: None,
            dj_name: String::new(),
            instagram_embed_code: String::new(),
            audio_file: Some("uploads/gaga.mp3".into()),
            status: CaseStatus::Approved,
            work_number: None,
        }
    }

    fn complete_draft() -> CaseDraft {
        let mut draft = CaseDraft::default();
        draft.select_existing_track(sample_work());
        draft.instagram_url = "https://www.instagram.com/p/abc/".into();
        draft.venue = "Caprices Festival".into();
        draft.video_date = NaiveDate::from_ymd_opt(2024, 1, 1);
        draft
    }

    #[test]
    fn empty_draft_reports_every_missing_field() {
        let problems = CaseDraft::default().validate().expect_err("must fail");
        assert!(problems.iter().any(|p| p.contains("existing track")));
        assert!(problems.iter().any(|p| p.contains("Instagram URL")));
        assert!(problems.iter().any(|p| p.contains("video date")));
    }

    #[test]
    fn reused_track_needs_no_new_track_metadata() {
        assert!(complete_draft().validate().is_ok());
    }

    #[test]
    fn new_track_requires_title_artist_and_iswc() {
        let mut draft = complete_draft();
        draft.attach_new_track(
            AudioAttachment {
                filename: "set.mp3".into(),
                mime_type: None,
                bytes: vec![1, 2, 3],
            },
            "",
            "",
            "",
        );
        let problems = draft.validate().expect_err("must fail");
        assert_eq!(
            problems
                .iter()
                .filter(|p| p.contains("new track"))
                .count(),
            3
        );
    }

    #[test]
    fn work_number_reuses_catalogue_id_for_existing_tracks() {
        assert_eq!(complete_draft().work_number(), "64f0c2");
    }

    #[test]
    fn work_number_derives_surrogate_for_new_tracks() {
        let mut draft = complete_draft();
        draft.attach_new_track(
            AudioAttachment {
                filename: "set.mp3".into(),
                mime_type: None,
                bytes: vec![1],
            },
            "Night Drive",
            "Amira",
            "T-000.000.001-0",
        );
        assert!(draft.work_number().starts_with("Amira-Night Drive-"));
    }

    #[test]
    fn reset_returns_draft_to_pristine_state() {
        let mut draft = complete_draft();
        draft.reset();
        assert_eq!(draft, CaseDraft::default());
    }
}
