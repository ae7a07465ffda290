//! XML response documents.
//!
//! Every document is `<?xml ...?><root>...</root>`; errors use
//! `<root><error code="NNN">message</error></root>`. Text and attribute
//! values are escaped by `quick-xml`.

use chrono::{DateTime, SecondsFormat};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::error::{Error, Result};

use super::enrich::{AlbumView, ArtistView, ResolvedAlbum, TrackView};

/// API version reported by the handshake.
pub const API_VERSION: &str = "350001";

/// Path of the protocol endpoint, relative to the server base URL.
pub const ENDPOINT_PATH: &str = "/server/xml.server.php";

/// Builds the `play` and `_get_cover` links embedded in listings.
#[derive(Debug, Clone)]
pub struct LinkBuilder {
    base: String,
    auth: String,
}

impl LinkBuilder {
    /// `base` is the server origin (`http://host:port`); `auth` the caller's token.
    pub fn new(base: &str, auth: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            auth: auth.to_string(),
        }
    }

    fn link(&self, action: &str, id: i64) -> String {
        format!(
            "{}{}?action={}&filter={}&auth={}",
            self.base,
            ENDPOINT_PATH,
            action,
            id,
            urlencoding::encode(&self.auth)
        )
    }

    pub fn play(&self, track_id: i64) -> String {
        self.link("play", track_id)
    }

    pub fn cover(&self, album_id: i64) -> String {
        self.link("_get_cover", album_id)
    }
}

/// Counts and dates reported by a successful handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeInfo {
    pub token: String,
    pub issued_at: i64,
    pub expiry: i64,
    pub songs: i64,
    pub artists: i64,
    pub albums: i64,
}

struct Doc {
    writer: Writer<Vec<u8>>,
}

impl Doc {
    fn new() -> Result<Self> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(Error::xml)?;
        let mut doc = Self { writer };
        doc.open("root", &[])?;
        Ok(doc)
    }

    fn open(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let mut start = BytesStart::new(name);
        for attr in attrs {
            start.push_attribute(*attr);
        }
        self.writer
            .write_event(Event::Start(start))
            .map_err(Error::xml)
    }

    fn close(&mut self, name: &str) -> Result<()> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(Error::xml)
    }

    fn leaf(&mut self, name: &str, attrs: &[(&str, &str)], text: &str) -> Result<()> {
        self.open(name, attrs)?;
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(Error::xml)?;
        self.close(name)
    }

    fn text(&mut self, name: &str, text: &str) -> Result<()> {
        self.leaf(name, &[], text)
    }

    fn finish(mut self) -> Result<String> {
        self.close("root")?;
        String::from_utf8(self.writer.into_inner()).map_err(Error::xml)
    }
}

fn iso8601(ts: i64) -> String {
    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, false))
        .unwrap_or_default()
}

pub fn handshake(info: &HandshakeInfo) -> Result<String> {
    let issued = iso8601(info.issued_at);
    let mut doc = Doc::new()?;
    doc.text("auth", &info.token)?;
    doc.text("api", API_VERSION)?;
    doc.text("session_expire", &iso8601(info.expiry))?;
    doc.text("update", &issued)?;
    doc.text("add", &issued)?;
    doc.text("clean", &issued)?;
    doc.text("songs", &info.songs.to_string())?;
    doc.text("artists", &info.artists.to_string())?;
    doc.text("albums", &info.albums.to_string())?;
    doc.text("playlists", "0")?;
    doc.finish()
}

/// Ping acknowledgement: an empty root.
pub fn ping() -> Result<String> {
    Doc::new()?.finish()
}

pub fn artists(views: &[ArtistView]) -> Result<String> {
    let mut doc = Doc::new()?;
    for view in views {
        let id = view.artist.id.to_string();
        doc.open("artist", &[("id", id.as_str())])?;
        doc.text("name", &view.artist.name)?;
        doc.text("albums", &view.album_count.to_string())?;
        doc.text("songs", &view.track_count.to_string())?;
        doc.text("preciserating", "0")?;
        doc.text("rating", "0")?;
        doc.close("artist")?;
    }
    doc.finish()
}

fn album_art(doc: &mut Doc, album: &ResolvedAlbum, links: &LinkBuilder) -> Result<()> {
    if album.album.cover_file_id.is_some() {
        doc.text("art", &links.cover(album.album.id))?;
    }
    Ok(())
}

pub fn albums(views: &[AlbumView], links: &LinkBuilder) -> Result<String> {
    let mut doc = Doc::new()?;
    for view in views {
        let album = &view.album;
        let id = album.album.id.to_string();
        let artist_id = album.album_artist.id.to_string();
        doc.open("album", &[("id", id.as_str())])?;
        doc.text("name", &album.album.name)?;
        doc.leaf("artist", &[("id", artist_id.as_str())], &album.album_artist.name)?;
        if let Some(year) = album.album.year {
            doc.text("year", &year.to_string())?;
        }
        doc.text("tracks", &view.track_count.to_string())?;
        doc.text("disk", "0")?;
        album_art(&mut doc, album, links)?;
        doc.text("preciserating", "0")?;
        doc.text("rating", "0")?;
        doc.close("album")?;
    }
    doc.finish()
}

pub fn songs(views: &[TrackView], links: &LinkBuilder) -> Result<String> {
    let mut doc = Doc::new()?;
    for view in views {
        let track = &view.track;
        let id = track.id.to_string();
        let artist_id = view.artist.id.to_string();
        let album_id = view.album.album.id.to_string();
        let album_artist_id = view.album.album_artist.id.to_string();

        doc.open("song", &[("id", id.as_str())])?;
        doc.text("title", &track.title)?;
        doc.leaf("artist", &[("id", artist_id.as_str())], &view.artist.name)?;
        doc.leaf("album", &[("id", album_id.as_str())], &view.album.album.name)?;
        doc.leaf(
            "albumartist",
            &[("id", album_artist_id.as_str())],
            &view.album.album_artist.name,
        )?;
        if let Some(number) = track.number {
            doc.text("track", &number.to_string())?;
        }
        if let Some(length) = track.length {
            doc.text("time", &length.to_string())?;
        }
        doc.text("url", &links.play(track.id))?;
        album_art(&mut doc, &view.album, links)?;
        doc.text("preciserating", "0")?;
        doc.text("rating", "0")?;
        doc.close("song")?;
    }
    doc.finish()
}

/// Error envelope. Falls back to a fixed document if serialization fails.
pub fn error(code: u16, message: &str) -> String {
    let code_text = code.to_string();
    Doc::new()
        .and_then(|mut doc| {
            doc.leaf("error", &[("code", code_text.as_str())], message)?;
            doc.finish()
        })
        .unwrap_or_else(|_| {
            format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<root><error code=\"{code}\"></error></root>")
        })
}
