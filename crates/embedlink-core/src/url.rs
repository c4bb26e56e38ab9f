//! URL helper functions
//!
//! Provides functions for joining, splitting and naming URLs.

use ::url::Url;

use crate::error::{ResolveError, Result};

const INVALID_FILENAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Parses an absolute URL, mapping failures to `InvalidUrl`
pub fn parse_absolute(url: &str) -> Result<Url> {
    Url::parse(url.trim()).map_err(|e| ResolveError::InvalidUrl(format!("{}: {}", url, e)))
}

/// Resolves `reference` (absolute or relative) against `base`
///
/// # Example
/// ```
/// use embedlink_core::url::join_url;
/// let url = join_url("https://dood.li/e/abc", "/pass_md5/1-2/xyz").unwrap();
/// assert_eq!(url, "https://dood.li/pass_md5/1-2/xyz");
/// ```
pub fn join_url(base: &str, reference: &str) -> Result<String> {
    let base = parse_absolute(base)?;
    base.join(reference.trim())
        .map(|u| u.to_string())
        .map_err(|e| ResolveError::InvalidUrl(format!("{}: {}", reference, e)))
}

/// Returns `scheme://host[:port]` of a URL
///
/// # Example
/// ```
/// use embedlink_core::url::site_base_url;
/// let base = site_base_url("https://aniworld.to/anime/stream/x/staffel-1/episode-1").unwrap();
/// assert_eq!(base, "https://aniworld.to");
/// ```
pub fn site_base_url(url: &str) -> Result<String> {
    let parsed = parse_absolute(url)?;
    let host = parsed
        .host_str()
        .ok_or_else(|| ResolveError::InvalidUrl(format!("{}: missing host", url)))?;
    Ok(match parsed.port() {
        Some(port) => format!("{}://{}:{}", parsed.scheme(), host, port),
        None => format!("{}://{}", parsed.scheme(), host),
    })
}

/// Extracts the trailing path segment, without any query suffix
///
/// Returns `None` when the URL ends with `/` or the segment is empty.
///
/// # Example
/// ```
/// use embedlink_core::url::trailing_path_id;
/// assert_eq!(trailing_path_id("https://luluvdo.com/e/abc123?x=1"), Some("abc123".to_string()));
/// assert_eq!(trailing_path_id("https://luluvdo.com/e/"), None);
/// ```
pub fn trailing_path_id(url: &str) -> Option<String> {
    let last = url.rsplit('/').next()?;
    let id = last.split('?').next().unwrap_or(last);
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

/// Removes characters that are invalid in file names
///
/// # Example
/// ```
/// use embedlink_core::url::sanitize_filename;
/// assert_eq!(sanitize_filename("a<b>:c?.mp4"), "abc.mp4");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| !INVALID_FILENAME_CHARS.contains(c))
        .collect()
}

/// Builds an output file name from an episode URL
///
/// URLs shaped `/<slug>/staffel-<S>/episode-<E>` become
/// `<slug>_S<SS>E<EE>.mp4`. Anything else falls back to the sanitized
/// last path segment plus `.mp4`.
///
/// # Example
/// ```
/// use embedlink_core::url::derive_output_filename;
/// let name = derive_output_filename("https://aniworld.to/anime/stream/kaguya/staffel-2/episode-7");
/// assert_eq!(name, "kaguya_S02E07.mp4");
/// ```
pub fn derive_output_filename(episode_url: &str) -> String {
    if let Some(name) = season_episode_filename(episode_url) {
        return name;
    }

    let trimmed = episode_url.trim_end_matches('/');
    let last = trimmed.rsplit('/').next().unwrap_or(trimmed);
    format!("{}.mp4", sanitize_filename(last))
}

fn season_episode_filename(episode_url: &str) -> Option<String> {
    let parsed = Url::parse(episode_url).ok()?;
    let parts: Vec<&str> = parsed
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .collect();

    if parts.len() < 3 {
        return None;
    }

    let slug = parts[parts.len() - 3];
    let season = number_after_dash(parts[parts.len() - 2])?;
    let episode = number_after_dash(parts[parts.len() - 1])?;

    Some(format!(
        "{}_S{:02}E{:02}.mp4",
        sanitize_filename(slug),
        season,
        episode
    ))
}

/// "staffel-2" → 2
fn number_after_dash(segment: &str) -> Option<u32> {
    segment.split('-').nth(1)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url_relative() {
        let url = join_url("https://filemoon.to/d/abc", "/iframe/xyz").unwrap();
        assert_eq!(url, "https://filemoon.to/iframe/xyz");
    }

    #[test]
    fn test_join_url_absolute_reference() {
        let url = join_url("https://filemoon.to/d/abc", "https://other.host/e/1").unwrap();
        assert_eq!(url, "https://other.host/e/1");
    }

    #[test]
    fn test_join_url_invalid_base() {
        assert!(matches!(
            join_url("not a url", "/x"),
            Err(ResolveError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_site_base_url_with_port() {
        let base = site_base_url("http://127.0.0.1:8080/anime/stream/x").unwrap();
        assert_eq!(base, "http://127.0.0.1:8080");
    }

    #[test]
    fn test_trailing_path_id() {
        assert_eq!(
            trailing_path_id("https://luluvdo.com/embed/a1b2c3"),
            Some("a1b2c3".to_string())
        );
        assert_eq!(
            trailing_path_id("https://luluvdo.com/embed/a1b2c3?autoplay=1"),
            Some("a1b2c3".to_string())
        );
        assert_eq!(trailing_path_id("https://luluvdo.com/embed/?x=1"), None);
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename(r#"a/b\c|d"e*f"#), "abcdef");
        assert_eq!(sanitize_filename("plain-name"), "plain-name");
    }

    #[test]
    fn test_derive_output_filename_episode() {
        let name = derive_output_filename(
            "https://aniworld.to/anime/stream/one-piece/staffel-1/episode-12",
        );
        assert_eq!(name, "one-piece_S01E12.mp4");
    }

    #[test]
    fn test_derive_output_filename_fallback() {
        let name = derive_output_filename("https://aniworld.to/anime/stream/one-piece/");
        assert_eq!(name, "one-piece.mp4");
    }

    #[test]
    fn test_derive_output_filename_non_numeric() {
        let name = derive_output_filename("https://aniworld.to/a/b/filme/film-eins");
        assert_eq!(name, "film-eins.mp4");
    }
}
