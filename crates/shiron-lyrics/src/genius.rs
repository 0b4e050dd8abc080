use regex::Regex;
use serde::Deserialize;

use shiron_model::{Error, SongInfo};

const BASE_URL: &str = "https://api.genius.com";
const USER_AGENT: &str = "shiron/0.1 (lyrics translation tool)";

/// Primary-artist name Genius uses for its own pages (annotations, album
/// art, translation collections). A hit attributed to it is a misattributed
/// match, not a song.
pub const PLACEHOLDER_ARTIST: &str = "Genius";

/// Client for the Genius search API.
pub struct GeniusClient {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

impl GeniusClient {
    pub fn new(token: impl Into<String>) -> Result<Self, Error> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            token: token.into(),
            base_url: BASE_URL.to_string(),
        })
    }

    /// Search Genius for a song and pick the best-matching hit.
    ///
    /// The query is `"{title} {artist}"` with trailing parenthetical
    /// annotations stripped from the title. Returns `Error::SongNotFound`
    /// when the API has zero hits.
    pub async fn search(&self, title: &str, artist: &str) -> Result<SongInfo, Error> {
        let query = format!("{} {}", clean_query_title(title), artist);
        let url = format!("{}/search", self.base_url);

        tracing::info!(title = %title, artist = %artist, "Searching Genius");
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(&[("q", query.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::UpstreamStatus { status, url });
        }

        let body: SearchResponse = response.json().await?;
        let hits: Vec<GeniusSong> = body.response.hits.into_iter().map(|h| h.result).collect();
        tracing::debug!(hits = hits.len(), "Search returned");

        select_hit(&hits, title, artist)
            .cloned()
            .map(SongInfo::from)
            .ok_or(Error::SongNotFound)
    }
}

/// Pick the best hit: the first whose artist and title both contain the
/// query strings case-insensitively, falling back to the first hit in
/// API order. `None` only when there are no hits at all.
pub fn select_hit<'a>(hits: &'a [GeniusSong], title: &str, artist: &str) -> Option<&'a GeniusSong> {
    let title = title.to_lowercase();
    let artist = artist.to_lowercase();

    hits.iter()
        .find(|hit| {
            hit.primary_artist.name.to_lowercase().contains(&artist)
                && hit.title.to_lowercase().contains(&title)
        })
        .or_else(|| hits.first())
}

/// Strip trailing parenthetical annotations (e.g. `"(Live)"`,
/// `"(Remastered) (2011)"`) from a title before building the search query.
pub fn clean_query_title(title: &str) -> String {
    let trailing = Regex::new(r"\s*\([^()]*\)\s*$").unwrap();
    let mut cleaned = title.trim().to_string();
    loop {
        let next = trailing.replace(&cleaned, "").to_string();
        if next == cleaned {
            return cleaned;
        }
        cleaned = next;
    }
}

/// Whether a resolved artist is the Genius placeholder rather than a real
/// act. Comparison is exact.
pub fn is_placeholder_artist(artist: &str) -> bool {
    artist == PLACEHOLDER_ARTIST
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    response: SearchBody,
}

#[derive(Debug, Deserialize)]
struct SearchBody {
    hits: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    result: GeniusSong,
}

/// One search result as returned by the Genius API.
#[derive(Debug, Clone, Deserialize)]
pub struct GeniusSong {
    pub title: String,
    pub url: String,
    pub primary_artist: GeniusArtist,
    #[serde(default)]
    pub release_date_for_display: Option<String>,
    #[serde(default)]
    pub song_art_image_thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeniusArtist {
    pub name: String,
}

impl From<GeniusSong> for SongInfo {
    fn from(song: GeniusSong) -> Self {
        SongInfo {
            title: song.title,
            artist: song.primary_artist.name,
            url: song.url,
            release_date: song.release_date_for_display,
            thumbnail: song.song_art_image_thumbnail_url,
        }
    }
}
