//! Media resolution for `<img>`, `<embed>` and `<video>` sources

use richtext_core::{Media, NoMedia};

/// Resolves media sources found in HTML to media handles.
///
/// Returning `None` drops the reference. Audio and video are not resolved
/// unless the factory opts in.
pub trait MediaFactory {
    type Media: Media;

    fn create_image(&self, src: &str) -> Option<Self::Media>;

    fn create_audio(&self, _src: &str) -> Option<Self::Media> {
        None
    }

    fn create_video(&self, _src: &str) -> Option<Self::Media> {
        None
    }
}

/// Factory that resolves nothing, for text without media
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMediaFactory;

impl MediaFactory for NoMediaFactory {
    type Media = NoMedia;

    fn create_image(&self, _src: &str) -> Option<NoMedia> {
        None
    }
}
