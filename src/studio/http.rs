use log::debug;
use regex::Regex;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde_json::{json, Map, Value};

use super::{InitialVideo, MetadataUpdate, Schedule, StudioApi, StudioContext, UploadSlot};
use crate::config::{self, UploaderConfig};
use crate::cookies::Session;
use crate::error::ApiError;
use crate::metadata::{CommentMode, CommentSortOrder, License, PremiereTheme, Privacy};

const CLIENT_NAME_CREATOR: u32 = 62;
const DEFAULT_CLIENT_VERSION: &str = "1.20240101.00.00";

/// [`StudioApi`] over the studio's internal JSON and resumable upload endpoints.
pub struct HttpStudio {
    client: Client,
    api_key_re: Regex,
    channel_id_re: Regex,
    delegated_re: Regex,
    client_version_re: Regex,
}

impl HttpStudio {
    pub fn new(cfg: &UploaderConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(cfg.user_agent.as_str())
            .timeout(cfg.request_timeout)
            .build()
            .map_err(network)?;
        let re = |field: &str| {
            Regex::new(&format!(r#""{field}"\s*:\s*"([^"]+)""#))
                .map_err(|e| ApiError::Protocol(e.to_string()))
        };
        Ok(Self {
            client,
            api_key_re: re("INNERTUBE_API_KEY")?,
            channel_id_re: re("CHANNEL_ID")?,
            delegated_re: re("DELEGATED_SESSION_ID")?,
            client_version_re: re("INNERTUBE_CLIENT_VERSION")?,
        })
    }

    fn signed(&self, req: RequestBuilder, session: &Session) -> RequestBuilder {
        req.header("Cookie", session.cookie_header())
            .header("Authorization", session.authorization(config::STUDIO_ORIGIN))
            .header("Origin", config::STUDIO_ORIGIN)
            .header("X-Origin", config::STUDIO_ORIGIN)
            .header("X-Goog-AuthUser", "0")
    }

    fn innertube_url(&self, path: &str, context: &StudioContext) -> String {
        format!(
            "{}/{path}?alt=json&key={}",
            config::INNERTUBE_BASE,
            context.api_key
        )
    }

    fn post_json(
        &self,
        session: &Session,
        url: &str,
        body: &Value,
    ) -> Result<Value, ApiError> {
        let resp = self
            .signed(self.client.post(url), session)
            .json(body)
            .send()
            .map_err(network)?;
        let resp = check_status(resp)?;
        resp.json::<Value>()
            .map_err(|e| ApiError::Protocol(format!("invalid JSON from {url}: {e}")))
    }

    fn capture(&self, re: &Regex, page: &str) -> Option<String> {
        re.captures(page).map(|c| c[1].to_string())
    }
}

impl StudioApi for HttpStudio {
    fn bootstrap(&self, session: &Session) -> Result<StudioContext, ApiError> {
        let resp = self
            .client
            .get(config::STUDIO_ORIGIN)
            .header("Cookie", session.cookie_header())
            .send()
            .map_err(network)?;
        if resp.url().host_str() == Some("accounts.google.com") {
            return Err(ApiError::Rejected {
                status: 401,
                reason: "studio redirected to sign-in; cookies are expired or signed out".into(),
            });
        }
        let page = check_status(resp)?.text().map_err(network)?;

        let missing = |what: &str| ApiError::Rejected {
            status: 401,
            reason: format!("studio page has no {what}; cookies are not signed in"),
        };
        let context = StudioContext {
            api_key: self
                .capture(&self.api_key_re, &page)
                .ok_or_else(|| missing("API key"))?,
            channel_id: self
                .capture(&self.channel_id_re, &page)
                .ok_or_else(|| missing("channel id"))?,
            delegated_session_id: self.capture(&self.delegated_re, &page),
            client_version: self
                .capture(&self.client_version_re, &page)
                .unwrap_or_else(|| DEFAULT_CLIENT_VERSION.to_string()),
        };
        debug!("studio bootstrap: channel {}", context.channel_id);
        Ok(context)
    }

    fn start_upload(
        &self,
        session: &Session,
        file_name: &str,
        size: u64,
        frontend_upload_id: &str,
    ) -> Result<UploadSlot, ApiError> {
        let resp = self
            .signed(self.client.post(config::UPLOAD_ENDPOINT), session)
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Header-Content-Length", size.to_string())
            .header("X-Goog-Upload-File-Name", file_name)
            .json(&json!({ "frontendUploadId": frontend_upload_id }))
            .send()
            .map_err(network)?;
        let resp = check_status(resp)?;

        let upload_url = header(&resp, "x-goog-upload-url")
            .ok_or_else(|| ApiError::Protocol("no upload URL in start response".into()))?;
        let resource_id = header(&resp, "x-goog-upload-header-scotty-resource-id")
            .ok_or_else(|| ApiError::Protocol("no resource id in start response".into()))?;
        Ok(UploadSlot {
            upload_url,
            resource_id,
        })
    }

    fn upload_chunk(
        &self,
        session: &Session,
        slot: &UploadSlot,
        offset: u64,
        data: &[u8],
        finalize: bool,
    ) -> Result<u64, ApiError> {
        let command = if finalize { "upload, finalize" } else { "upload" };
        let resp = self
            .signed(self.client.post(&slot.upload_url), session)
            .header("X-Goog-Upload-Command", command)
            .header("X-Goog-Upload-Offset", offset.to_string())
            .body(data.to_vec())
            .send()
            .map_err(network)?;
        let resp = check_status(resp)?;
        match header(&resp, "x-goog-upload-size-received") {
            Some(received) => received
                .parse::<u64>()
                .map_err(|_| ApiError::Protocol(format!("bad size-received header: {received}"))),
            None => Ok(offset + data.len() as u64),
        }
    }

    fn query_offset(&self, session: &Session, slot: &UploadSlot) -> Result<u64, ApiError> {
        let resp = self
            .signed(self.client.post(&slot.upload_url), session)
            .header("X-Goog-Upload-Command", "query")
            .send()
            .map_err(network)?;
        let resp = check_status(resp)?;
        let received = header(&resp, "x-goog-upload-size-received")
            .ok_or_else(|| ApiError::Protocol("no size-received header in query response".into()))?;
        received
            .parse::<u64>()
            .map_err(|_| ApiError::Protocol(format!("bad size-received header: {received}")))
    }

    fn create_video(
        &self,
        session: &Session,
        context: &StudioContext,
        slot: &UploadSlot,
        initial: &InitialVideo,
    ) -> Result<String, ApiError> {
        let url = self.innertube_url("upload/createvideo", context);
        let body = create_video_body(context, slot, initial);
        let resp = self.post_json(session, &url, &body)?;
        resp.get("videoId")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| match error_message(&resp) {
                Some(reason) => ApiError::Rejected { status: 200, reason },
                None => ApiError::Protocol("createvideo response has no videoId".into()),
            })
    }

    fn update_metadata(
        &self,
        session: &Session,
        context: &StudioContext,
        video_id: &str,
        update: &MetadataUpdate,
    ) -> Result<(), ApiError> {
        let url = self.innertube_url("video_manager/metadata_update", context);
        let body = metadata_update_body(context, video_id, update);
        let resp = self.post_json(session, &url, &body)?;
        let code = resp
            .pointer("/overallResult/resultCode")
            .and_then(Value::as_str)
            .unwrap_or("UPDATE_SUCCESS");
        if code == "UPDATE_SUCCESS" {
            Ok(())
        } else {
            Err(ApiError::Rejected {
                status: 200,
                reason: error_message(&resp).unwrap_or_else(|| code.to_string()),
            })
        }
    }
}

fn network(e: reqwest::Error) -> ApiError {
    ApiError::Network(e.to_string())
}

fn header(resp: &Response, name: &str) -> Option<String> {
    resp.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn check_status(resp: Response) -> Result<Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().unwrap_or_default();
    Err(classify_status(status, body))
}

fn classify_status(status: StatusCode, body: String) -> ApiError {
    if status.is_server_error()
        || status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
    {
        ApiError::Server {
            status: status.as_u16(),
            body,
        }
    } else {
        let reason = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| error_message(&v))
            .unwrap_or(body);
        ApiError::Rejected {
            status: status.as_u16(),
            reason,
        }
    }
}

/// Pull a human-readable reason out of an error or partial-failure response.
fn error_message(resp: &Value) -> Option<String> {
    if let Some(msg) = resp.pointer("/error/message").and_then(Value::as_str) {
        return Some(msg.to_string());
    }
    let messages: Vec<String> = resp
        .as_object()?
        .values()
        .filter_map(|v| {
            let code = v.get("resultCode")?.as_str()?;
            if code == "UPDATE_SUCCESS" {
                return None;
            }
            let reason = v
                .pointer("/resultReason")
                .and_then(Value::as_str)
                .unwrap_or(code);
            Some(reason.to_string())
        })
        .collect();
    (!messages.is_empty()).then(|| messages.join("; "))
}

fn innertube_context(context: &StudioContext) -> Value {
    let mut user = json!({
        "delegationContext": {
            "externalChannelId": context.channel_id,
            "roleType": { "channelRoleType": "CREATOR_CHANNEL_ROLE_TYPE_OWNER" },
        },
        "serializedDelegationContext": "",
    });
    if let Some(id) = &context.delegated_session_id {
        user["onBehalfOfUser"] = json!(id);
    }
    json!({
        "client": {
            "clientName": CLIENT_NAME_CREATOR,
            "clientVersion": context.client_version,
            "hl": "en",
            "gl": "US",
        },
        "request": { "returnLogEntry": true, "internalExperimentFlags": [] },
        "user": user,
    })
}

fn privacy_wire(p: Privacy) -> &'static str {
    match p {
        Privacy::Private => "PRIVATE",
        Privacy::Unlisted => "UNLISTED",
        Privacy::Public => "PUBLIC",
    }
}

fn license_wire(l: License) -> &'static str {
    match l {
        License::Standard => "standard",
        License::CreativeCommons => "creative_commons",
    }
}

fn comment_mode_wire(m: CommentMode) -> &'static str {
    match m {
        CommentMode::All => "ALL_COMMENTS",
        CommentMode::HoldInappropriate => "AUTOMATED_COMMENTS",
        CommentMode::HoldInappropriateStrict => "AUTO_MODERATED_COMMENTS_HOLD_MORE",
        CommentMode::HoldAll => "APPROVED_COMMENTS",
    }
}

fn sort_order_wire(o: CommentSortOrder) -> &'static str {
    match o {
        CommentSortOrder::Top => "MDE_COMMENT_SORT_ORDER_TOP",
        CommentSortOrder::Newest => "MDE_COMMENT_SORT_ORDER_LATEST",
    }
}

fn theme_wire(t: PremiereTheme) -> &'static str {
    match t {
        PremiereTheme::Classic => "VIDEO_PREMIERE_INTRO_THEME_DEFAULT",
        PremiereTheme::Alternative => "VIDEO_PREMIERE_INTRO_THEME_ALTERNATIVE",
        PremiereTheme::Ambient => "VIDEO_PREMIERE_INTRO_THEME_AMBIENT",
        PremiereTheme::Bright => "VIDEO_PREMIERE_INTRO_THEME_BRIGHT",
        PremiereTheme::Calm => "VIDEO_PREMIERE_INTRO_THEME_CALM",
        PremiereTheme::Cinematic => "VIDEO_PREMIERE_INTRO_THEME_CINEMATIC",
        PremiereTheme::Contemporary => "VIDEO_PREMIERE_INTRO_THEME_CONTEMPORARY",
        PremiereTheme::Dramatic => "VIDEO_PREMIERE_INTRO_THEME_DRAMATIC",
        PremiereTheme::Funky => "VIDEO_PREMIERE_INTRO_THEME_FUNKY",
        PremiereTheme::Gentle => "VIDEO_PREMIERE_INTRO_THEME_GENTLE",
        PremiereTheme::Happy => "VIDEO_PREMIERE_INTRO_THEME_HAPPY",
        PremiereTheme::Inspirational => "VIDEO_PREMIERE_INTRO_THEME_INSPIRATIONAL",
        PremiereTheme::Kids => "VIDEO_PREMIERE_INTRO_THEME_KIDS",
        PremiereTheme::SciFi => "VIDEO_PREMIERE_INTRO_THEME_SCI_FI",
        PremiereTheme::Sports => "VIDEO_PREMIERE_INTRO_THEME_SPORTS",
    }
}

fn create_video_body(context: &StudioContext, slot: &UploadSlot, initial: &InitialVideo) -> Value {
    json!({
        "channelId": context.channel_id,
        "resourceId": { "scottyResourceId": { "id": slot.resource_id } },
        "frontendUploadId": initial.frontend_upload_id,
        "initialMetadata": {
            "title": { "newTitle": initial.title },
            "description": { "newDescription": initial.description, "shouldSegment": true },
            "privacy": { "newPrivacy": privacy_wire(initial.privacy) },
            "draftState": { "isDraft": false },
        },
        "context": innertube_context(context),
    })
}

fn metadata_update_body(context: &StudioContext, video_id: &str, u: &MetadataUpdate) -> Value {
    let mut body = Map::new();
    body.insert("encryptedVideoId".into(), json!(video_id));
    body.insert("context".into(), innertube_context(context));
    let mut set = |key: &str, value: Value| {
        body.insert(key.to_string(), value);
    };

    if let Some(title) = &u.title {
        set("title", json!({ "newTitle": title }));
    }
    if let Some(description) = &u.description {
        set(
            "description",
            json!({ "newDescription": description, "shouldSegment": true }),
        );
    }
    if let Some(privacy) = u.privacy {
        set("privacyState", json!({ "newPrivacy": privacy_wire(privacy) }));
    }
    if let Some(tags) = &u.tags {
        set("tags", json!({ "newTags": tags }));
    }
    if let Some(category) = u.category {
        set("category", json!({ "newCategoryId": category.id() }));
    }
    if let Some(license) = u.license {
        set("license", json!({ "newLicenseId": license_wire(license) }));
    }
    if let Some(mfk) = u.made_for_kids {
        let kind = if mfk {
            "MDE_MADE_FOR_KIDS_TYPE_MFK"
        } else {
            "MDE_MADE_FOR_KIDS_TYPE_NOT_MFK"
        };
        set(
            "madeForKids",
            json!({ "operation": "MDE_MADE_FOR_KIDS_UPDATE_OPERATION_SET", "newMfk": kind }),
        );
    }
    if let Some(racy) = u.restricted_to_over_18 {
        let kind = if racy {
            "MDE_RACY_TYPE_ALL"
        } else {
            "MDE_RACY_TYPE_NOT_RESTRICTED"
        };
        set(
            "racy",
            json!({ "operation": "MDE_RACY_UPDATE_OPERATION_SET", "newRacy": kind }),
        );
    }

    let mut comments = Map::new();
    if let Some(allow) = u.allow_comments {
        comments.insert("newAllowComments".into(), json!(allow));
    }
    if let Some(mode) = u.comment_mode {
        comments.insert("newAllowCommentsMode".into(), json!(comment_mode_wire(mode)));
    }
    if let Some(order) = u.comment_sort_order {
        comments.insert("newDefaultSortOrder".into(), json!(sort_order_wire(order)));
    }
    if let Some(ratings) = u.can_view_ratings {
        comments.insert("newCanViewRatings".into(), json!(ratings));
    }
    if !comments.is_empty() {
        set("commentOptions", Value::Object(comments));
    }

    if let Some(embed) = u.allow_embedding {
        set("allowEmbed", json!({ "newAllowEmbed": embed }));
    }
    if let Some(feed) = u.publish_to_feed {
        set("publishing", json!({ "shouldPublishToFeed": feed }));
    }
    if let Some(enabled) = u.auto_chapter {
        set("autoChapterSettings", json!({ "newAutoChapterEnabled": enabled }));
    }
    if let Some(enabled) = u.auto_places {
        set("autoPlacesSettings", json!({ "newAutoPlacesEnabled": enabled }));
    }
    if let Some(enabled) = u.auto_concepts {
        set("autoConceptsSettings", json!({ "newAutoConceptsEnabled": enabled }));
    }
    if u.has_product_placement.is_some() || u.show_product_placement_overlay.is_some() {
        let mut ppp = Map::new();
        if let Some(has) = u.has_product_placement {
            ppp.insert("newHasPaidProductPlacement".into(), json!(has));
        }
        if let Some(overlay) = u.show_product_placement_overlay {
            ppp.insert("newShowPaidProductPlacementOverlay".into(), json!(overlay));
        }
        set("paidProductPlacement", Value::Object(ppp));
    }
    if let Some(date) = u.recorded_date {
        use chrono::Datelike;
        set(
            "recordedDate",
            json!({ "newRecordedDate": { "year": date.year(), "month": date.month(), "day": date.day() } }),
        );
    }
    if let Some(lang) = &u.audio_language {
        set("audioLanguage", json!({ "newAudioLanguage": lang.as_str() }));
    }
    if let Some(resource_id) = &u.thumbnail_resource_id {
        set(
            "videoStill",
            json!({
                "operation": "UPLOAD_CUSTOM_THUMBNAIL",
                "image": { "scottyResourceId": { "id": resource_id } },
            }),
        );
    }
    if !u.add_to_playlists.is_empty() {
        set(
            "addToPlaylist",
            json!({ "addToPlaylistIds": u.add_to_playlists, "deleteFromPlaylistIds": [] }),
        );
    }
    match &u.schedule {
        Some(Schedule::Private { at }) => {
            set(
                "scheduledPublishing",
                json!({ "set": { "timeSec": at.timestamp().to_string(), "privacy": "PUBLIC" } }),
            );
        }
        Some(Schedule::Premiere {
            at,
            countdown,
            theme,
        }) => {
            set("privacyState", json!({ "newPrivacy": "PUBLIC" }));
            set(
                "premiere",
                json!({
                    "newIsPremiere": true,
                    "newScheduledStartTimeSec": at.timestamp().to_string(),
                    "newCountdownDurationSec": countdown.seconds(),
                    "newTheme": theme_wire(*theme),
                }),
            );
        }
        None => {}
    }

    Value::Object(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{parse_timestamp, Category, PremiereCountdown};

    fn context() -> StudioContext {
        StudioContext {
            api_key: "KEY".into(),
            channel_id: "UC123".into(),
            delegated_session_id: None,
            client_version: "1.0".into(),
        }
    }

    #[test]
    fn test_classify_status() {
        assert!(classify_status(StatusCode::SERVICE_UNAVAILABLE, String::new()).is_transient());
        assert!(classify_status(StatusCode::TOO_MANY_REQUESTS, String::new()).is_transient());
        let err = classify_status(
            StatusCode::BAD_REQUEST,
            r#"{"error":{"message":"Title too long"}}"#.into(),
        );
        assert_eq!(
            err,
            ApiError::Rejected {
                status: 400,
                reason: "Title too long".into()
            }
        );
    }

    #[test]
    fn test_error_message_from_partial_failure() {
        let resp = json!({
            "overallResult": { "resultCode": "SOME_ERRORS" },
            "title": { "resultCode": "UPDATE_SUCCESS" },
            "tags": { "resultCode": "INVALID", "resultReason": "tag too long" },
        });
        let msg = error_message(&resp).unwrap();
        assert!(msg.contains("tag too long"));
        assert!(msg.contains("SOME_ERRORS"));
    }

    #[test]
    fn test_create_video_body() {
        let slot = UploadSlot {
            upload_url: "https://u".into(),
            resource_id: "RES".into(),
        };
        let initial = InitialVideo {
            frontend_upload_id: "fe".into(),
            title: "T".into(),
            description: "D".into(),
            privacy: Privacy::Private,
        };
        let body = create_video_body(&context(), &slot, &initial);
        assert_eq!(body["resourceId"]["scottyResourceId"]["id"], "RES");
        assert_eq!(body["initialMetadata"]["privacy"]["newPrivacy"], "PRIVATE");
        assert_eq!(body["context"]["client"]["clientName"], 62);
    }

    #[test]
    fn test_metadata_update_body_fields() {
        let update = MetadataUpdate {
            title: Some("T".into()),
            privacy: Some(Privacy::Unlisted),
            tags: Some(vec!["a".into()]),
            category: Some(Category::Gaming),
            allow_comments: Some(false),
            comment_sort_order: Some(CommentSortOrder::Newest),
            ..Default::default()
        };
        let body = metadata_update_body(&context(), "VID", &update);
        assert_eq!(body["encryptedVideoId"], "VID");
        assert_eq!(body["title"]["newTitle"], "T");
        assert_eq!(body["privacyState"]["newPrivacy"], "UNLISTED");
        assert_eq!(body["category"]["newCategoryId"], 20);
        assert_eq!(body["commentOptions"]["newAllowComments"], false);
        assert_eq!(
            body["commentOptions"]["newDefaultSortOrder"],
            "MDE_COMMENT_SORT_ORDER_LATEST"
        );
        assert!(body.get("description").is_none());
        assert!(body.get("premiere").is_none());
    }

    #[test]
    fn test_metadata_update_body_every_field() {
        let update = MetadataUpdate {
            title: Some("T".into()),
            description: Some("D".into()),
            privacy: Some(Privacy::Public),
            tags: Some(vec!["a".into(), "b c".into()]),
            category: Some(Category::Education),
            license: Some(License::CreativeCommons),
            made_for_kids: Some(false),
            restricted_to_over_18: Some(true),
            allow_comments: Some(true),
            comment_mode: Some(CommentMode::HoldAll),
            comment_sort_order: Some(CommentSortOrder::Top),
            can_view_ratings: Some(false),
            allow_embedding: Some(false),
            publish_to_feed: Some(true),
            auto_chapter: Some(false),
            auto_places: Some(true),
            auto_concepts: Some(false),
            has_product_placement: Some(true),
            show_product_placement_overlay: Some(false),
            recorded_date: chrono::NaiveDate::from_ymd_opt(2024, 5, 17),
            audio_language: Some("pt-BR".parse().unwrap()),
            thumbnail_resource_id: Some("THUMB".into()),
            add_to_playlists: vec!["PL1".into()],
            schedule: None,
        };
        let body = metadata_update_body(&context(), "VID", &update);

        assert_eq!(body["description"]["newDescription"], "D");
        assert_eq!(body["privacyState"]["newPrivacy"], "PUBLIC");
        assert_eq!(body["tags"]["newTags"], json!(["a", "b c"]));
        assert_eq!(body["category"]["newCategoryId"], 27);
        assert_eq!(body["license"]["newLicenseId"], "creative_commons");
        assert_eq!(body["madeForKids"]["newMfk"], "MDE_MADE_FOR_KIDS_TYPE_NOT_MFK");
        assert_eq!(body["racy"]["newRacy"], "MDE_RACY_TYPE_ALL");

        let comments = &body["commentOptions"];
        assert_eq!(comments["newAllowComments"], true);
        assert_eq!(comments["newAllowCommentsMode"], "APPROVED_COMMENTS");
        assert_eq!(comments["newDefaultSortOrder"], "MDE_COMMENT_SORT_ORDER_TOP");
        assert_eq!(comments["newCanViewRatings"], false);

        assert_eq!(body["allowEmbed"]["newAllowEmbed"], false);
        assert_eq!(body["publishing"]["shouldPublishToFeed"], true);
        assert_eq!(body["autoChapterSettings"]["newAutoChapterEnabled"], false);
        assert_eq!(body["autoPlacesSettings"]["newAutoPlacesEnabled"], true);
        assert_eq!(body["autoConceptsSettings"]["newAutoConceptsEnabled"], false);
        assert_eq!(
            body["paidProductPlacement"]["newHasPaidProductPlacement"],
            true
        );
        assert_eq!(
            body["paidProductPlacement"]["newShowPaidProductPlacementOverlay"],
            false
        );
        assert_eq!(
            body["recordedDate"]["newRecordedDate"],
            json!({ "year": 2024, "month": 5, "day": 17 })
        );
        assert_eq!(body["audioLanguage"]["newAudioLanguage"], "pt-BR");
        assert_eq!(body["videoStill"]["image"]["scottyResourceId"]["id"], "THUMB");
        assert_eq!(body["addToPlaylist"]["addToPlaylistIds"], json!(["PL1"]));
    }

    #[test]
    fn test_schedule_bodies() {
        let at = parse_timestamp("2030-01-01T00:00:00Z").unwrap();
        let private = MetadataUpdate {
            schedule: Some(Schedule::Private { at }),
            ..Default::default()
        };
        let body = metadata_update_body(&context(), "VID", &private);
        assert_eq!(
            body["scheduledPublishing"]["set"]["timeSec"],
            at.timestamp().to_string()
        );
        assert!(body.get("privacyState").is_none());

        let premiere = MetadataUpdate {
            schedule: Some(Schedule::Premiere {
                at,
                countdown: PremiereCountdown::try_from(180).unwrap(),
                theme: PremiereTheme::SciFi,
            }),
            ..Default::default()
        };
        let body = metadata_update_body(&context(), "VID", &premiere);
        assert_eq!(body["privacyState"]["newPrivacy"], "PUBLIC");
        assert_eq!(body["premiere"]["newCountdownDurationSec"], 180);
        assert_eq!(body["premiere"]["newTheme"], "VIDEO_PREMIERE_INTRO_THEME_SCI_FI");
    }
}
