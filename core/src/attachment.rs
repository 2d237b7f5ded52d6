//! Attachment classification and size formatting.

use crate::models::Attachment;
use url::Url;

const KIB: f64 = 1024.0;
const MIB: u64 = 1024 * 1024;

const IMAGE_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "gif", "bmp", "webp"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "ogg"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentKind {
    Image,
    Video,
    Pdf,
    GenericFile,
}

impl AttachmentKind {
    /// Decide how a file reference is displayed from its extension.
    ///
    /// Total: anything unrecognised, including a reference with no
    /// extension at all, is a generic file.
    pub fn classify(url: &str) -> Self {
        let Some(ext) = extension(url) else {
            return Self::GenericFile;
        };
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Self::Image
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Self::Video
        } else if ext == "pdf" {
            Self::Pdf
        } else {
            Self::GenericFile
        }
    }

    /// Images and videos are previewed inline; the rest get an icon row.
    pub fn has_inline_preview(self) -> bool {
        matches!(self, Self::Image | Self::Video)
    }
}

/// What a click on an attachment asks the surrounding layer to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentAction {
    OpenFullView { url: String },
    Download { url: String, file_name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentPreview {
    pub kind: AttachmentKind,
    pub url: String,
    pub name: String,
    pub size_label: String,
}

impl AttachmentPreview {
    pub fn from_attachment(attachment: &Attachment) -> Self {
        Self {
            kind: AttachmentKind::classify(&attachment.url),
            url: attachment.url.clone(),
            name: display_name(attachment),
            size_label: format_file_size(attachment.size_bytes),
        }
    }

    pub fn action(&self) -> Option<AttachmentAction> {
        match self.kind {
            AttachmentKind::Image => Some(AttachmentAction::OpenFullView {
                url: self.url.clone(),
            }),
            AttachmentKind::Pdf | AttachmentKind::GenericFile => Some(AttachmentAction::Download {
                url: self.url.clone(),
                file_name: self.name.clone(),
            }),
            AttachmentKind::Video => None,
        }
    }
}

/// Human file size: `N/A` when unknown, KB below 1 MiB, MB otherwise.
pub fn format_file_size(size_bytes: Option<u64>) -> String {
    match size_bytes {
        None => "N/A".to_string(),
        Some(bytes) if bytes < MIB => format!("{:.2} KB", bytes as f64 / KIB),
        Some(bytes) => format!("{:.2} MB", bytes as f64 / MIB as f64),
    }
}

/// Explicit name, else the last path segment of the URL, else the URL.
pub fn display_name(attachment: &Attachment) -> String {
    if let Some(name) = attachment.name.as_deref().filter(|n| !n.trim().is_empty()) {
        return name.to_string();
    }

    let segment = match Url::parse(&attachment.url) {
        Ok(url) => url
            .path_segments()
            .and_then(|mut segments| segments.next_back().map(str::to_string)),
        Err(_) => strip_query(&attachment.url)
            .rsplit('/')
            .next()
            .map(str::to_string),
    };

    segment
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| attachment.url.clone())
}

fn strip_query(url: &str) -> &str {
    url.split(&['?', '#'][..]).next().unwrap_or(url)
}

fn extension(url: &str) -> Option<String> {
    let file = strip_query(url).rsplit('/').next()?;
    let (stem, ext) = file.rsplit_once('.')?;
    if stem.is_empty() && ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_extension() {
        assert_eq!(AttachmentKind::classify("a.JPG"), AttachmentKind::Image);
        assert_eq!(AttachmentKind::classify("https://cdn.example/p/cat.webp"), AttachmentKind::Image);
        assert_eq!(AttachmentKind::classify("clip.WebM"), AttachmentKind::Video);
        assert_eq!(AttachmentKind::classify("voice.ogg"), AttachmentKind::Video);
        assert_eq!(AttachmentKind::classify("/files/Report.PDF"), AttachmentKind::Pdf);
        assert_eq!(AttachmentKind::classify("a.unknown"), AttachmentKind::GenericFile);
    }

    #[test]
    fn test_classify_is_total() {
        for input in ["", ".", "noext", "dir.png/file", "https://x.io/", "????", "a.b.c.gif.zip"] {
            assert_eq!(AttachmentKind::classify(input), AttachmentKind::GenericFile, "{input}");
        }
    }

    #[test]
    fn test_classify_ignores_query_string() {
        assert_eq!(
            AttachmentKind::classify("https://cdn.example/img/photo.png?token=abc#top"),
            AttachmentKind::Image
        );
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(Some(500_000)), "488.28 KB");
        assert_eq!(format_file_size(Some(5_000_000)), "4.77 MB");
        assert_eq!(format_file_size(Some(0)), "0.00 KB");
        assert_eq!(format_file_size(Some(MIB)), "1.00 MB");
        assert_eq!(format_file_size(None), "N/A");
    }

    #[test]
    fn test_display_name_fallbacks() {
        let mut attachment = Attachment::new("https://cdn.example/u/42/notes.txt?sig=1");
        assert_eq!(display_name(&attachment), "notes.txt");

        attachment.name = Some("Meeting notes.txt".into());
        assert_eq!(display_name(&attachment), "Meeting notes.txt");

        let relative = Attachment::new("uploads/scan.pdf");
        assert_eq!(display_name(&relative), "scan.pdf");

        let bare = Attachment::new("https://cdn.example/");
        assert_eq!(display_name(&bare), "https://cdn.example/");
    }

    #[test]
    fn test_preview_actions() {
        let image = AttachmentPreview::from_attachment(&Attachment::new("x/cat.png"));
        assert_eq!(
            image.action(),
            Some(AttachmentAction::OpenFullView { url: "x/cat.png".into() })
        );

        let mut file = Attachment::new("x/data.csv");
        file.size_bytes = Some(2048);
        let file = AttachmentPreview::from_attachment(&file);
        assert_eq!(file.size_label, "2.00 KB");
        assert_eq!(
            file.action(),
            Some(AttachmentAction::Download {
                url: "x/data.csv".into(),
                file_name: "data.csv".into()
            })
        );

        let video = AttachmentPreview::from_attachment(&Attachment::new("x/clip.mp4"));
        assert!(video.kind.has_inline_preview());
        assert_eq!(video.action(), None);
    }
}
