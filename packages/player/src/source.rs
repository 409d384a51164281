//! Deciding how a lecture's stored URL is played.

use thiserror::Error;
use url::Url;

use crate::surface::SurfaceBackend;

const OBJECT_KEY_PREFIX: &str = "courses/";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("lecture has no video url")]
    Empty,
    #[error("no video id in {0}")]
    MissingVideoId(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LectureSource {
    /// Video hosted by the embedded third-party player
    Embedded { video_id: String },
    /// Uploaded object; streamed through a presigned URL
    ObjectKey { key: String },
    /// Anything else is handed to a media element as-is
    Direct { url: String },
}

impl LectureSource {
    pub fn classify(raw: &str) -> Result<Self, SourceError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(SourceError::Empty);
        }

        if raw.contains("youtube") || raw.contains("youtu.be") {
            let video_id = extract_video_id(raw);
            if video_id.is_empty() {
                return Err(SourceError::MissingVideoId(raw.to_string()));
            }
            return Ok(Self::Embedded { video_id });
        }

        if raw.starts_with(OBJECT_KEY_PREFIX) && !raw.contains("http") {
            return Ok(Self::ObjectKey {
                key: raw.to_string(),
            });
        }

        Ok(Self::Direct {
            url: raw.to_string(),
        })
    }

    pub fn backend(&self) -> SurfaceBackend {
        match self {
            Self::Embedded { .. } => SurfaceBackend::Embedded,
            Self::ObjectKey { .. } | Self::Direct { .. } => SurfaceBackend::MediaElement,
        }
    }
}

fn extract_video_id(raw: &str) -> String {
    let strip_query = |value: &str| value.split('?').next().unwrap_or_default().to_string();

    if !raw.contains("http") {
        return strip_query(raw);
    }

    let Ok(parsed) = Url::parse(raw) else {
        return strip_query(raw);
    };

    if parsed.host_str().is_some_and(|host| host.contains("youtu.be")) {
        return parsed.path().trim_start_matches('/').to_string();
    }

    if let Some((_, v)) = parsed.query_pairs().find(|(key, _)| key == "v") {
        return v.into_owned();
    }

    parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embedded(id: &str) -> LectureSource {
        LectureSource::Embedded {
            video_id: id.to_string(),
        }
    }

    #[test]
    fn test_youtube_forms() {
        let cases = [
            ("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=10", "dQw4w9WgXcQ"),
            ("https://youtu.be/dQw4w9WgXcQ?si=abc", "dQw4w9WgXcQ"),
            ("https://www.youtube.com/embed/dQw4w9WgXcQ", "dQw4w9WgXcQ"),
            ("https://www.youtube.com/shorts/dQw4w9WgXcQ?feature=share", "dQw4w9WgXcQ"),
        ];
        for (url, id) in cases {
            assert_eq!(LectureSource::classify(url).unwrap(), embedded(id), "{url}");
        }
    }

    #[test]
    fn test_object_key() {
        let source = LectureSource::classify("courses/c1/lecture-1.mp4").unwrap();
        assert_eq!(
            source,
            LectureSource::ObjectKey {
                key: "courses/c1/lecture-1.mp4".to_string()
            }
        );
        assert_eq!(source.backend(), SurfaceBackend::MediaElement);
    }

    #[test]
    fn test_direct_url() {
        let source = LectureSource::classify("https://cdn.example.com/courses/a.mp4").unwrap();
        assert!(matches!(source, LectureSource::Direct { .. }));
    }

    #[test]
    fn test_empty_and_idless() {
        assert_eq!(LectureSource::classify("  "), Err(SourceError::Empty));
        assert!(matches!(
            LectureSource::classify("https://www.youtube.com/"),
            Err(SourceError::MissingVideoId(_))
        ));
    }
}
