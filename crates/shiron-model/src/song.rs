use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Minimum length (in characters, after trimming) for the title and artist
/// fields of a song query.
pub const MIN_QUERY_LEN: usize = 2;

/// The best-matching song returned by the search API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongInfo {
    pub title: String,
    pub artist: String,
    /// Song page URL the lyrics are scraped from.
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

/// A song identifier derived from a video-platform URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedSong {
    pub title: String,
    pub artist: String,
    /// Platform the identifier was derived from (e.g., "YouTube").
    pub source: String,
}

/// Check that a title/artist query meets the minimum length requirement.
pub fn validate_song_query(title: &str, artist: &str) -> Result<(), Error> {
    if title.trim().chars().count() < MIN_QUERY_LEN {
        return Err(Error::InvalidInput(format!(
            "song title must be at least {MIN_QUERY_LEN} characters long"
        )));
    }
    if artist.trim().chars().count() < MIN_QUERY_LEN {
        return Err(Error::InvalidInput(format!(
            "artist name must be at least {MIN_QUERY_LEN} characters long"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_song_query() {
        assert!(validate_song_query("Hallelujah", "Leonard Cohen").is_ok());
        assert!(validate_song_query("99", "U2").is_ok());

        assert!(validate_song_query("a", "Leonard Cohen").is_err());
        assert!(validate_song_query("Hallelujah", "x").is_err());
        // Whitespace padding doesn't count toward the minimum
        assert!(validate_song_query("  a  ", "Leonard Cohen").is_err());
        assert!(validate_song_query("", "").is_err());
    }

    #[test]
    fn test_song_info_wire_format() {
        let song = SongInfo {
            title: "Hallelujah".to_string(),
            artist: "Leonard Cohen".to_string(),
            url: "https://genius.com/Leonard-cohen-hallelujah-lyrics".to_string(),
            release_date: Some("December 1984".to_string()),
            thumbnail: None,
        };

        let json = serde_json::to_value(&song).unwrap();
        assert_eq!(json["title"], "Hallelujah");
        assert_eq!(json["releaseDate"], "December 1984");
        // Absent optionals are omitted, not null
        assert!(json.get("thumbnail").is_none());

        let parsed: SongInfo =
            serde_json::from_str(&serde_json::to_string(&song).unwrap()).unwrap();
        assert_eq!(parsed.artist, "Leonard Cohen");
        assert_eq!(parsed.release_date.as_deref(), Some("December 1984"));
    }

    #[test]
    fn test_resolved_song_wire_format() {
        let resolved = ResolvedSong {
            title: "Yellow".to_string(),
            artist: "Coldplay".to_string(),
            source: "YouTube".to_string(),
        };
        let json = serde_json::to_value(&resolved).unwrap();
        assert_eq!(json["source"], "YouTube");
    }
}
