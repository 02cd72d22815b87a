//! Media items and grouped-media batches

use super::constants::delivery::MEDIA_GROUP_LIMIT;

/// One downloaded image ready to be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPhoto {
    /// Raw image bytes
    pub data: Vec<u8>,
    /// Markdown caption; only the first photo of a delivery carries one
    pub caption: Option<String>,
    /// Where the bytes were downloaded from (for logging)
    pub source_url: String,
}

impl MediaPhoto {
    pub fn new(data: Vec<u8>, source_url: impl Into<String>) -> Self {
        Self {
            data,
            caption: None,
            source_url: source_url.into(),
        }
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }
}

/// A group of photos sent as one grouped-media message
pub type MediaBatch = Vec<MediaPhoto>;

/// Split `photos` into consecutive batches of at most `limit` items.
///
/// `limit` is clamped to `1..=MEDIA_GROUP_LIMIT`. All batches but the last
/// are full; order is preserved.
pub fn into_batches(photos: Vec<MediaPhoto>, limit: usize) -> Vec<MediaBatch> {
    let limit = limit.clamp(1, MEDIA_GROUP_LIMIT);
    let mut batches = Vec::with_capacity(photos.len().div_ceil(limit));
    let mut current = Vec::with_capacity(limit);

    for photo in photos {
        current.push(photo);
        if current.len() == limit {
            batches.push(std::mem::replace(&mut current, Vec::with_capacity(limit)));
        }
    }
    if !current.is_empty() {
        batches.push(current);
    }

    batches
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn photos(n: usize) -> Vec<MediaPhoto> {
        (0..n)
            .map(|i| MediaPhoto::new(vec![i as u8], format!("https://img/{i}")))
            .collect()
    }

    #[test]
    fn test_twelve_photos_make_ten_plus_two() {
        let batches = into_batches(photos(12), MEDIA_GROUP_LIMIT);
        let sizes: Vec<_> = batches.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![10, 2]);
        assert_eq!(batches[1][0].source_url, "https://img/10");
    }

    #[test]
    fn test_no_photos_no_batches() {
        assert!(into_batches(Vec::new(), MEDIA_GROUP_LIMIT).is_empty());
    }

    #[test]
    fn test_limit_is_clamped() {
        let batches = into_batches(photos(25), 50);
        assert_eq!(batches.len(), 3);
        assert!(batches.iter().all(|b| b.len() <= MEDIA_GROUP_LIMIT));
    }

    proptest! {
        #[test]
        fn prop_batches_bounded_and_complete(n in 0usize..64) {
            let batches = into_batches(photos(n), MEDIA_GROUP_LIMIT);
            prop_assert_eq!(batches.len(), n.div_ceil(MEDIA_GROUP_LIMIT));
            for (i, batch) in batches.iter().enumerate() {
                prop_assert!(batch.len() <= MEDIA_GROUP_LIMIT);
                if i + 1 < batches.len() {
                    prop_assert_eq!(batch.len(), MEDIA_GROUP_LIMIT);
                }
            }
            let flattened: Vec<_> = batches.into_iter().flatten().map(|p| p.source_url).collect();
            let expected: Vec<_> = (0..n).map(|i| format!("https://img/{i}")).collect();
            prop_assert_eq!(flattened, expected);
        }
    }
}
