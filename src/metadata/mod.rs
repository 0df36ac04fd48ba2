//! Publish-time attributes of a video.
//!
//! [`Metadata`] is the raw, caller-facing bag of fields (what a JSON batch file
//! or the CLI produces). [`MetadataRecord`] is the same data after validation;
//! it is the only form the upload session accepts and it cannot be mutated.

pub mod commit;

use std::fmt;
use std::ops::Deref;
use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::{MAX_DESCRIPTION_LEN, MAX_TAGS_LEN, MAX_TITLE_LEN};
use crate::error::MetadataError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[value(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Privacy {
    #[default]
    Private,
    Unlisted,
    Public,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[value(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    FilmAnimation,
    AutosVehicles,
    Music,
    PetsAnimals,
    Sports,
    TravelEvents,
    Gaming,
    PeopleBlogs,
    Comedy,
    Entertainment,
    NewsPolitics,
    HowtoStyle,
    Education,
    ScienceTech,
    NonprofitsActivism,
}

impl Category {
    /// Numeric category id used by the host.
    pub fn id(self) -> u32 {
        match self {
            Category::FilmAnimation => 1,
            Category::AutosVehicles => 2,
            Category::Music => 10,
            Category::PetsAnimals => 15,
            Category::Sports => 17,
            Category::TravelEvents => 19,
            Category::Gaming => 20,
            Category::PeopleBlogs => 22,
            Category::Comedy => 23,
            Category::Entertainment => 24,
            Category::NewsPolitics => 25,
            Category::HowtoStyle => 26,
            Category::Education => 27,
            Category::ScienceTech => 28,
            Category::NonprofitsActivism => 29,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[value(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum License {
    Standard,
    CreativeCommons,
}

/// Comment moderation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[value(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommentMode {
    All,
    HoldInappropriate,
    HoldInappropriateStrict,
    HoldAll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[value(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommentSortOrder {
    Top,
    Newest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[value(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PremiereTheme {
    Classic,
    Alternative,
    Ambient,
    Bright,
    Calm,
    Cinematic,
    Contemporary,
    Dramatic,
    Funky,
    Gentle,
    Happy,
    Inspirational,
    Kids,
    SciFi,
    Sports,
}

/// Premiere countdown length: one to five whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct PremiereCountdown(u32);

impl PremiereCountdown {
    pub const ALLOWED: [u32; 5] = [60, 120, 180, 240, 300];

    pub fn seconds(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for PremiereCountdown {
    type Error = MetadataError;

    fn try_from(secs: u32) -> Result<Self, Self::Error> {
        if Self::ALLOWED.contains(&secs) {
            Ok(Self(secs))
        } else {
            Err(MetadataError::PremiereCountdown(secs))
        }
    }
}

impl From<PremiereCountdown> for u32 {
    fn from(c: PremiereCountdown) -> u32 {
        c.0
    }
}

impl std::str::FromStr for PremiereCountdown {
    type Err = MetadataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let secs = s
            .trim()
            .parse::<u32>()
            .map_err(|_| MetadataError::PremiereCountdown(0))?;
        Self::try_from(secs)
    }
}

/// BCP-47 style language tag such as `en`, `pt-BR` or `zh-Hant`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LanguageTag(String);

impl LanguageTag {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for LanguageTag {
    type Error = MetadataError;

    fn try_from(tag: String) -> Result<Self, Self::Error> {
        let mut parts = tag.split('-');
        let primary = parts.next().unwrap_or_default();
        let primary_ok =
            (2..=3).contains(&primary.len()) && primary.chars().all(|c| c.is_ascii_lowercase());
        let rest_ok = parts.all(|p| (2..=8).contains(&p.len()) && p.chars().all(|c| c.is_ascii_alphanumeric()));
        if primary_ok && rest_ok {
            Ok(Self(tag))
        } else {
            Err(MetadataError::Language(tag))
        }
    }
}

impl From<LanguageTag> for String {
    fn from(t: LanguageTag) -> String {
        t.0
    }
}

impl std::str::FromStr for LanguageTag {
    type Err = MetadataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_string())
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parse an ISO 8601 timestamp.
///
/// Accepts RFC 3339, an explicit offset with or without a colon, fractional
/// seconds, a naive date-time (taken as UTC) and a bare date (midnight UTC).
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, String> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    let with_offset = ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z", "%Y-%m-%dT%H:%M%z"]
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok());
    if let Some(dt) = with_offset {
        return Ok(dt.with_timezone(&Utc));
    }
    let naive = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ]
    .iter()
    .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    .or_else(|| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    });
    naive
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("not an ISO 8601 timestamp: {s}"))
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|s| parse_timestamp(&s).map_err(serde::de::Error::custom))
        .transpose()
}

/// Raw publish attributes as supplied by a caller. Validate with
/// [`MetadataRecord::new`] before uploading.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Metadata {
    pub title: String,
    pub description: String,
    pub privacy: Privacy,
    /// Comments are disabled for made-for-kids videos.
    pub made_for_kids: bool,
    pub tags: Vec<String>,
    /// Publication time. The video stays private until then, unless it is a premiere.
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub scheduled_upload: Option<DateTime<Utc>>,
    pub premiere_countdown_duration: Option<PremiereCountdown>,
    pub premiere_theme: Option<PremiereTheme>,
    pub playlist_ids: Vec<String>,
    pub thumbnail: Option<PathBuf>,
    pub publish_to_feed: Option<bool>,
    pub category: Option<Category>,
    pub auto_chapter: Option<bool>,
    pub auto_places: Option<bool>,
    pub auto_concepts: Option<bool>,
    pub has_product_placement: Option<bool>,
    pub show_product_placement_overlay: Option<bool>,
    pub recorded_date: Option<NaiveDate>,
    pub restricted_to_over_18: Option<bool>,
    pub audio_language: Option<LanguageTag>,
    pub license: Option<License>,
    pub allow_comments: Option<bool>,
    pub allow_comments_mode: Option<CommentMode>,
    pub can_view_ratings: Option<bool>,
    pub comments_sort_order: Option<CommentSortOrder>,
    pub allow_embedding: Option<bool>,
}

impl Metadata {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Whether the record asks for a premiere: a schedule plus both premiere fields.
    pub fn is_premiere(&self) -> bool {
        self.scheduled_upload.is_some()
            && self.premiere_countdown_duration.is_some()
            && self.premiere_theme.is_some()
    }

    /// Privacy to apply when the metadata is first committed. Scheduled videos
    /// stay private until the scheduling step runs.
    pub fn initial_privacy(&self) -> Privacy {
        if self.scheduled_upload.is_some() {
            Privacy::Private
        } else {
            self.privacy
        }
    }

    fn validate(&self) -> Result<(), MetadataError> {
        let title_len = self.title.chars().count();
        if self.title.trim().is_empty() {
            return Err(MetadataError::EmptyTitle);
        }
        if title_len > MAX_TITLE_LEN {
            return Err(MetadataError::TooLong {
                field: "title",
                len: title_len,
                max: MAX_TITLE_LEN,
            });
        }
        if self.title.contains(['<', '>']) {
            return Err(MetadataError::AngleBrackets("title"));
        }

        let description_len = self.description.chars().count();
        if description_len > MAX_DESCRIPTION_LEN {
            return Err(MetadataError::TooLong {
                field: "description",
                len: description_len,
                max: MAX_DESCRIPTION_LEN,
            });
        }
        if self.description.contains(['<', '>']) {
            return Err(MetadataError::AngleBrackets("description"));
        }

        let tags_len = tags_length(&self.tags);
        if tags_len > MAX_TAGS_LEN {
            return Err(MetadataError::TooLong {
                field: "tags",
                len: tags_len,
                max: MAX_TAGS_LEN,
            });
        }

        Ok(())
    }
}

/// Length of the tag list as the host counts it: separating commas are
/// included and tags containing spaces are counted with surrounding quotes.
pub fn tags_length(tags: &[String]) -> usize {
    let chars: usize = tags
        .iter()
        .map(|t| t.chars().count() + if t.contains(' ') { 2 } else { 0 })
        .sum();
    chars + tags.len().saturating_sub(1)
}

/// Validated, read-only metadata.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "Metadata")]
pub struct MetadataRecord(Metadata);

impl MetadataRecord {
    pub fn new(metadata: Metadata) -> Result<Self, MetadataError> {
        metadata.validate()?;
        Ok(Self(metadata))
    }

    pub fn into_inner(self) -> Metadata {
        self.0
    }
}

impl TryFrom<Metadata> for MetadataRecord {
    type Error = MetadataError;

    fn try_from(metadata: Metadata) -> Result<Self, Self::Error> {
        Self::new(metadata)
    }
}

impl Deref for MetadataRecord {
    type Target = Metadata;

    fn deref(&self) -> &Metadata {
        &self.0
    }
}
