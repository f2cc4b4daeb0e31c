use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use client_core::{
    AudioAttachment, CaseClient, CaseDraft, ClientError, ClientEvent, DeleteConfirmation,
    DeleteOutcome, PostLoginDestination, RequestScope, StatusFilter, DEFAULT_PAGE,
    DEFAULT_PAGE_SIZE,
};
use session_store::FileSessionStore;
use shared::{
    domain::{CaseStatus, WorkId},
    protocol::{EditCaseRequest, Profile, Work},
};

mod config;

#[derive(Parser, Debug)]
#[command(name = "caseworks", about = "Performance case management console")]
struct Args {
    /// Override the API base URL from config.
    #[arg(long)]
    api_url: Option<String>,
    /// Override the session file path from config.
    #[arg(long)]
    session_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register a new account.
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Log in and persist the session token.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Drop the persisted session.
    Logout,
    /// Print the signed-in profile.
    Profile,
    /// Update profile fields; unspecified fields keep their current value.
    ProfileSetup {
        #[arg(long)]
        real_name: Option<String>,
        #[arg(long)]
        artist_name: Option<String>,
        #[arg(long)]
        collecting_society: Option<String>,
        #[arg(long)]
        member_id: Option<String>,
        #[arg(long)]
        social_media_links: Option<String>,
        #[arg(long)]
        genres: Option<String>,
    },
    /// List cases, optionally narrowed to one review status.
    Cases {
        #[arg(long)]
        status: Option<CaseStatus>,
        #[arg(long, default_value_t = DEFAULT_PAGE)]
        page: u32,
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        limit: u32,
    },
    /// Search the registered works catalogue.
    Search {
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        artist: String,
        #[arg(long, default_value = "")]
        iswc: String,
    },
    /// Show one case, optionally resolving its Instagram embed markup.
    Show {
        id: String,
        #[arg(long)]
        embed: bool,
    },
    /// Submit a new performance case.
    Submit {
        /// Reuse a registered track by its catalogue id.
        #[arg(long, conflicts_with = "audio")]
        track_id: Option<String>,
        /// Attach a new recording from disk.
        #[arg(long)]
        audio: Option<PathBuf>,
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        artist: String,
        #[arg(long, default_value = "")]
        iswc: String,
        #[arg(long)]
        instagram_url: String,
        #[arg(long)]
        venue: String,
        #[arg(long)]
        video_date: NaiveDate,
        #[arg(long, default_value = "")]
        dj_name: String,
    },
    /// Edit a case; unspecified fields keep their current value.
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        artist: Option<String>,
        #[arg(long)]
        venue: Option<String>,
        #[arg(long)]
        instagram_url: Option<String>,
        #[arg(long)]
        video_date: Option<NaiveDate>,
        #[arg(long)]
        dj_name: Option<String>,
    },
    /// Transition a case to a new review status.
    SetStatus { id: String, status: CaseStatus },
    /// Delete a case. Refuses to act without --yes.
    Delete {
        id: String,
        #[arg(long)]
        yes: bool,
    },
    /// Look up registered venues by name fragment.
    Venues { query: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let mut settings = config::load_settings();
    if let Some(url) = args.api_url {
        settings.api_url = url;
    }
    if let Some(path) = args.session_file {
        settings.session_file = path;
    }

    let session = Arc::new(FileSessionStore::new(settings.session_file));
    let client = CaseClient::new(settings.api_url, session);

    match args.command {
        Command::Signup { email, password } => {
            client.signup(&email, &password).await?;
            println!("Account created for {email}; log in to continue.");
        }
        Command::Login { email, password } => {
            match client.login(&email, &password).await? {
                PostLoginDestination::ProfileSetup => {
                    println!("Logged in. Complete your profile with `profile-setup`.");
                }
                PostLoginDestination::Dashboard => println!("Logged in."),
            }
        }
        Command::Logout => {
            client.logout()?;
            println!("Logged out.");
        }
        Command::Profile => {
            print_profile(&client.fetch_profile().await?);
        }
        Command::ProfileSetup {
            real_name,
            artist_name,
            collecting_society,
            member_id,
            social_media_links,
            genres,
        } => {
            let mut profile = client.fetch_profile().await?;
            apply(&mut profile.real_name, real_name);
            apply(&mut profile.artist_name, artist_name);
            apply(&mut profile.collecting_society, collecting_society);
            apply(&mut profile.member_id, member_id);
            apply(&mut profile.social_media_links, social_media_links);
            apply(&mut profile.genres, genres);
            let saved = client.replace_profile(&profile).await?;
            println!("Profile saved.");
            print_profile(&saved);
        }
        Command::Cases {
            status,
            page,
            limit,
        } => {
            let filter = status.map_or(StatusFilter::All, StatusFilter::Only);
            let works = client.list_works(filter, page, limit).await?;
            if works.is_empty() {
                println!("No cases.");
            }
            for work in &works {
                print_work_row(work);
            }
        }
        Command::Search {
            title,
            artist,
            iswc,
        } => {
            let works = client.search_works(&title, &artist, &iswc).await?;
            if works.is_empty() {
                println!("No matching works.");
            }
            for work in &works {
                print_work_row(work);
            }
        }
        Command::Show { id, embed } => {
            let work = client.fetch_work(&WorkId::new(id)).await?;
            print_work(&work);
            if embed {
                match client
                    .fetch_instagram_embed(&work.instagram_embed_code)
                    .await?
                {
                    Some(html) => println!("embed:\n{html}"),
                    None => println!("embed: not an Instagram URL, skipped"),
                }
            }
        }
        Command::Submit {
            track_id,
            audio,
            title,
            artist,
            iswc,
            instagram_url,
            venue,
            video_date,
            dj_name,
        } => {
            let mut draft = CaseDraft {
                instagram_url,
                venue,
                video_date: Some(video_date),
                dj_name,
                ..CaseDraft::default()
            };

            match (track_id, audio) {
                (Some(id), _) => {
                    let work = client.fetch_work(&WorkId::new(id)).await?;
                    println!("Reusing track '{}' by {}", work.title, work.artist_name);
                    draft.select_existing_track(work);
                }
                (None, Some(path)) => {
                    let bytes = tokio::fs::read(&path)
                        .await
                        .with_context(|| format!("failed to read '{}'", path.display()))?;
                    let filename = path
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_else(|| "audio".to_string());
                    let mime_type = guess_audio_mime(&path).map(str::to_string);
                    draft.attach_new_track(
                        AudioAttachment {
                            filename,
                            mime_type,
                            bytes,
                        },
                        title,
                        artist,
                        iswc,
                    );
                }
                (None, None) => bail!("either --track-id or --audio is required"),
            }

            let scope = RequestScope::new();
            let mut events = client.subscribe_events();
            scope.spawn(async move {
                loop {
                    match events.recv().await {
                        Ok(ClientEvent::UploadProgress { percent }) => {
                            eprintln!("upload {percent}%");
                        }
                        Ok(_) => {}
                        Err(_) => break,
                    }
                }
            });

            match client.submit_case(&mut draft).await {
                Ok(work) => {
                    println!("Case submitted.");
                    print_work(&work);
                }
                Err(ClientError::Validation(problems)) => {
                    for problem in &problems {
                        eprintln!("  - {problem}");
                    }
                    bail!("draft is incomplete");
                }
                Err(err) => return Err(err.into()),
            }
        }
        Command::Edit {
            id,
            title,
            artist,
            venue,
            instagram_url,
            video_date,
            dj_name,
        } => {
            let work_id = WorkId::new(id);
            let current = client.fetch_work(&work_id).await?;
            let mut edit = EditCaseRequest::from(&current);
            apply(&mut edit.title, title);
            apply(&mut edit.artist_name, artist);
            apply(&mut edit.venue, venue);
            apply(&mut edit.instagram_embed_code, instagram_url);
            if video_date.is_some() {
                edit.video_date = video_date;
            }
            apply(&mut edit.dj_name, dj_name);
            let updated = client.edit_case(&work_id, &edit).await?;
            println!("Case updated.");
            print_work(&updated);
        }
        Command::SetStatus { id, status } => {
            let works = client
                .update_status(&WorkId::new(id), status, StatusFilter::All)
                .await?;
            println!("Status set to {status}.");
            for work in &works {
                print_work_row(work);
            }
        }
        Command::Delete { id, yes } => {
            let confirmation = if yes {
                DeleteConfirmation::Confirmed
            } else {
                DeleteConfirmation::Unconfirmed
            };
            match client.delete_case(&WorkId::new(id), confirmation).await? {
                DeleteOutcome::Deleted => println!("Case deleted."),
                DeleteOutcome::Declined => {
                    println!("Refusing to delete without --yes.");
                }
            }
        }
        Command::Venues { query } => {
            let venues = client.search_venues(&query).await?;
            if venues.is_empty() {
                println!("No matching venues.");
            }
            for venue in &venues {
                println!("{}  {}", venue.id, venue.display_name);
            }
        }
    }

    Ok(())
}

fn apply(field: &mut String, value: Option<String>) {
    if let Some(value) = value {
        *field = value;
    }
}

fn guess_audio_mime(path: &std::path::Path) -> Option<&'static str> {
    match path
        .extension()
        .and_then(|ext| ext.to_str())?
        .to_ascii_lowercase()
        .as_str()
    {
        "mp3" => Some("audio/mpeg"),
        "wav" => Some("audio/wav"),
        "m4a" => Some("audio/mp4"),
        "flac" => Some("audio/flac"),
        "ogg" => Some("audio/ogg"),
        _ => None,
    }
}

fn print_profile(profile: &Profile) {
    println!("real name:          {}", profile.real_name);
    println!("artist name:        {}", profile.artist_name);
    println!("collecting society: {}", profile.collecting_society);
    println!("member id:          {}", profile.member_id);
    println!("social media:       {}", profile.social_media_links);
    println!("genres:             {}", profile.genres);
    if profile.is_admin {
        println!("role:               admin");
    }
}

fn print_work_row(work: &Work) {
    println!(
        "{}  [{}]  {} - {}",
        work.id, work.status, work.artist_name, work.title
    );
}

fn print_work(work: &Work) {
    print_work_row(work);
    println!("  iswc:       {}", work.iswc);
    println!("  venue:      {}", work.venue);
    if let Some(date) = work.video_date {
        println!("  video date: {date}");
    }
    if !work.dj_name.is_empty() {
        println!("  dj:         {}", work.dj_name);
    }
    if !work.instagram_embed_code.is_empty() {
        println!("  instagram:  {}", work.instagram_embed_code);
    }
    if let Some(audio) = &work.audio_file {
        println!("  audio:      {audio}");
    }
    if let Some(number) = &work.work_number {
        println!("  work no:    {number}");
    }
}
