//! Image asset seam for topic creation.
//!
//! The engine never generates or moves image files itself; groups that
//! require attached images hand the prepared asset to an [`ImageStore`]
//! implementation which publishes it under the allocated topic id and
//! reports the resulting gallery paths.

use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::model::topic::TopicId;

/// Gallery paths of a published image asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedImage {
    /// Topic url pointing at the full-size image.
    pub url: String,
    /// Link text pointing at the icon rendition.
    pub link_text: String,
}

/// Failure to publish a prepared image asset.
#[derive(Debug)]
pub struct ImageStoreError(pub String);

impl Display for ImageStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "image placement failed: {}", self.0)
    }
}

impl Error for ImageStoreError {}

/// External collaborator that relocates a prepared image asset into the
/// gallery location derived from the topic id.
pub trait ImageStore {
    fn place(&self, topic_id: TopicId) -> Result<PlacedImage, ImageStoreError>;
}
