//! Video id extraction from platform URLs

/// Extract the 11-character video id from a YouTube URL.
///
/// Supported forms:
/// - `https://www.youtube.com/watch?v=<id>` (the `v` parameter may appear anywhere in the query)
/// - `https://youtu.be/<id>`
/// - `https://www.youtube.com/embed/<id>`
/// - `https://www.youtube.com/v/<id>` and `https://www.youtube.com/shorts/<id>`
pub fn extract_video_id(url: &str) -> Option<String> {
    let url = url.trim();

    if let Some(caps) =
        regex!(r"^(?:https?://)?(?:www\.|m\.)?youtube\.com/watch\?(?:.*&)?v=([0-9A-Za-z_-]{11})(?:[&#]|$)")
            .captures(url)
    {
        return Some(caps[1].to_string());
    }

    if let Some(caps) = regex!(r"^(?:https?://)?youtu\.be/([0-9A-Za-z_-]{11})(?:[?&#/]|$)").captures(url) {
        return Some(caps[1].to_string());
    }

    let caps = regex!(
        r"^(?:https?://)?(?:www\.|m\.)?youtube(?:-nocookie)?\.com/(?:embed|v|shorts)/([0-9A-Za-z_-]{11})(?:[?&#/]|$)"
    )
    .captures(url)?;
    Some(caps[1].to_string())
}
