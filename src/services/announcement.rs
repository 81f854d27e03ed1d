// src/services/announcement.rs

//! Picks today's flavor announcement out of a page's posts.

use crate::models::{FlavorAnnouncement, Post};
use crate::services::extractor::{FlavorExtractor, looks_like_announcement};
use crate::services::recency::RecencyClassifier;

/// The winning post and what was extracted from it.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub post: Post,
    pub announcement: FlavorAnnouncement,
}

/// Runs each post through the recency gate, the announcement heuristic and
/// the extractor; the first post passing all three wins.
#[derive(Debug, Clone, Default)]
pub struct AnnouncementFinder {
    classifier: RecencyClassifier,
    extractor: FlavorExtractor,
}

impl AnnouncementFinder {
    pub fn new(classifier: RecencyClassifier, extractor: FlavorExtractor) -> Self {
        Self {
            classifier,
            extractor,
        }
    }

    pub fn find(&self, posts: Vec<Post>) -> Option<Match> {
        for post in posts {
            if !self.classifier.is_from_today(&post.text) {
                log::debug!("Post {} is not from today, skipping", post.index);
                continue;
            }
            if !looks_like_announcement(&post.text) {
                log::debug!("Post {} is not a flavor announcement", post.index);
                continue;
            }
            match self.extractor.extract(&post.text) {
                Some(announcement) => {
                    log::debug!("Found flavor post at index {}", post.index);
                    return Some(Match { post, announcement });
                }
                None => log::debug!(
                    "Post {} looked like an announcement but had no flavor: {:?}",
                    post.index,
                    post.preview(100)
                ),
            }
        }
        None
    }
}
