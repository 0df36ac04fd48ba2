use log::{debug, info};

use super::MetadataRecord;
use crate::error::{ApiError, UploadError};
use crate::studio::{MetadataUpdate, StudioApi, StudioClient};

/// Build the update that applies every publish attribute of `record`.
///
/// Thumbnail, playlists and scheduling are left to the side-effect steps. When
/// a schedule is present the video is committed as private; the scheduling
/// step decides when and how it becomes public.
pub fn build_update(record: &MetadataRecord) -> MetadataUpdate {
    let made_for_kids = record.made_for_kids;
    let allow_comments = if made_for_kids {
        Some(false)
    } else {
        record.allow_comments
    };

    MetadataUpdate {
        title: Some(record.title.clone()),
        description: Some(record.description.clone()),
        privacy: Some(record.initial_privacy()),
        tags: Some(record.tags.clone()),
        category: record.category,
        license: record.license,
        made_for_kids: Some(made_for_kids),
        restricted_to_over_18: record.restricted_to_over_18,
        allow_comments,
        comment_mode: record.allow_comments_mode,
        comment_sort_order: record.comments_sort_order,
        can_view_ratings: record.can_view_ratings,
        allow_embedding: record.allow_embedding,
        publish_to_feed: record.publish_to_feed,
        auto_chapter: record.auto_chapter,
        auto_places: record.auto_places,
        auto_concepts: record.auto_concepts,
        has_product_placement: record.has_product_placement,
        show_product_placement_overlay: record.show_product_placement_overlay,
        recorded_date: record.recorded_date,
        audio_language: record.audio_language.clone(),
        ..Default::default()
    }
}

/// Apply `record` to `video_id`.
///
/// A rejection from the host is final; transient failures are retried under
/// the client's policy.
pub fn commit<A: StudioApi>(
    client: &StudioClient<'_, A>,
    video_id: &str,
    record: &MetadataRecord,
) -> Result<(), UploadError> {
    let update = build_update(record);
    debug!("committing metadata for {video_id}: {update:?}");
    client
        .update_metadata(video_id, &update)
        .map_err(|(e, attempts)| match e {
            ApiError::Rejected { reason, .. } => UploadError::MetadataRejected {
                video_id: video_id.to_string(),
                reason,
            },
            source => {
                debug!("metadata update gave up after {attempts} attempts");
                UploadError::MetadataTransport {
                    video_id: video_id.to_string(),
                    source,
                }
            }
        })?;
    info!("metadata set for {video_id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{parse_timestamp, Category, Metadata, Privacy};

    #[test]
    fn test_build_update_copies_fields() {
        let mut m = Metadata::new("Title");
        m.description = "Desc".into();
        m.privacy = Privacy::Public;
        m.tags = vec!["x".into(), "y".into()];
        m.category = Some(Category::Music);
        m.allow_embedding = Some(true);
        m.playlist_ids = vec!["PL1".into()];
        let record = MetadataRecord::new(m).unwrap();

        let update = build_update(&record);
        assert_eq!(update.title.as_deref(), Some("Title"));
        assert_eq!(update.description.as_deref(), Some("Desc"));
        assert_eq!(update.privacy, Some(Privacy::Public));
        assert_eq!(update.tags, Some(vec!["x".to_string(), "y".to_string()]));
        assert_eq!(update.category, Some(Category::Music));
        assert_eq!(update.allow_embedding, Some(true));
        assert!(update.add_to_playlists.is_empty());
        assert!(update.schedule.is_none());
    }

    #[test]
    fn test_scheduled_commits_private() {
        let mut m = Metadata::new("Title");
        m.privacy = Privacy::Public;
        m.scheduled_upload = Some(parse_timestamp("2031-01-01T00:00:00Z").unwrap());
        let update = build_update(&MetadataRecord::new(m).unwrap());
        assert_eq!(update.privacy, Some(Privacy::Private));
    }

    #[test]
    fn test_made_for_kids_disables_comments() {
        let mut m = Metadata::new("Title");
        m.made_for_kids = true;
        m.allow_comments = Some(true);
        let update = build_update(&MetadataRecord::new(m).unwrap());
        assert_eq!(update.made_for_kids, Some(true));
        assert_eq!(update.allow_comments, Some(false));
    }
}
