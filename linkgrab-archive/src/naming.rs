use url::Url;

/// Name used when the page URL has too few path segments to name the file.
pub const FALLBACK_NAME: &str = "unknown_file";
/// Extension used for content types missing from the table.
pub const DEFAULT_EXTENSION: &str = ".bin";

// zip and 7z intentionally share `.rar` with rar itself.
const EXTENSIONS: &[(&str, &str)] = &[
    ("application/zip", ".rar"),
    ("application/x-7z-compressed", ".rar"),
    ("application/x-rar-compressed", ".rar"),
    ("application/x-msdownload", ".exe"),
];

/// Map a `Content-Type` header to a file extension.
///
/// Parameters such as `; charset=binary` and letter case are ignored.
///
/// ```
/// use linkgrab_archive::extension_for;
///
/// assert_eq!(extension_for("application/zip"), ".rar");
/// assert_eq!(extension_for("text/html"), ".bin");
/// ```
pub fn extension_for(content_type: &str) -> &'static str {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    EXTENSIONS
        .iter()
        .find(|(mime, _)| *mime == essence)
        .map(|(_, ext)| *ext)
        .unwrap_or(DEFAULT_EXTENSION)
}

/// Derive a file name from a page URL's path.
///
/// The path is split into segments; with at least three of them, every
/// segment from the fourth on is joined with `-`. Anything shorter, or a URL
/// that does not parse, yields [`FALLBACK_NAME`].
///
/// ```
/// use linkgrab_archive::name_from_url;
///
/// assert_eq!(name_from_url("https://host/a/b/c/d/e"), "d-e");
/// assert_eq!(name_from_url("https://host/a"), "unknown_file");
/// ```
pub fn name_from_url(page_url: &str) -> String {
    let Ok(url) = Url::parse(page_url) else {
        return FALLBACK_NAME.to_string();
    };

    let path = url.path().trim_start_matches('/').trim_end_matches('/');
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.len() < 3 {
        return FALLBACK_NAME.to_string();
    }

    let name = segments[3..].join("-");
    if name.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        name
    }
}

/// `[index]. name.ext`, with `index` the link's 1-based position in the input.
pub fn entry_name(index: usize, name: &str, extension: &str) -> String {
    format!("[{index}]. {name}{extension}")
}
