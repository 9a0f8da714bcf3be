use anyhow::Result;
use rust_embed::RustEmbed;
use std::io;

/// Number of leading bytes inspected when sniffing a content type.
pub const SNIFF_LENGTH: usize = 512;

/// Source of UI resources: stylesheets, scripts and page templates.
pub trait AssetProvider: Send + Sync {
    fn names(&self) -> Vec<String>;

    /// Returns `Ok(None)` when no asset with that name exists.
    fn read(&self, name: &str) -> io::Result<Option<Vec<u8>>>;
}

#[derive(RustEmbed)]
#[folder = "assets/"]
struct Embedded;

/// Assets compiled into the binary from the `assets/` folder.
pub struct EmbeddedAssets;

impl AssetProvider for EmbeddedAssets {
    fn names(&self) -> Vec<String> {
        Embedded::iter().map(|name| name.into_owned()).collect()
    }

    fn read(&self, name: &str) -> io::Result<Option<Vec<u8>>> {
        Ok(Embedded::get(name).map(|file| file.data.into_owned()))
    }
}

/// Loads a static asset for the `/static/` route. Templates are never served.
pub fn load_asset(provider: &dyn AssetProvider, file: &str) -> Result<Option<Vec<u8>>> {
    if file.ends_with(".tmpl") {
        return Ok(None);
    }

    Ok(provider.read(file)?)
}

pub fn detect_content_type(file: &str, content: &[u8]) -> String {
    if file.ends_with(".css") {
        "text/css".into()
    } else if file.ends_with(".js") {
        "text/javascript".into()
    } else {
        sniff(content).into()
    }
}

/// Guesses a content type from the first bytes of `content`.
pub fn sniff(content: &[u8]) -> &'static str {
    let content = &content[..content.len().min(SNIFF_LENGTH)];
    let trimmed = content
        .iter()
        .position(|byte| !byte.is_ascii_whitespace())
        .map_or(&[][..], |start| &content[start..]);
    let lowered = trimmed
        .iter()
        .take(16)
        .map(u8::to_ascii_lowercase)
        .collect::<Vec<u8>>();

    const HTML_PREFIXES: [&[u8]; 6] = [
        b"<!doctype html",
        b"<html",
        b"<head",
        b"<body",
        b"<script",
        b"<!--",
    ];

    if HTML_PREFIXES.iter().any(|prefix| lowered.starts_with(prefix)) {
        return "text/html; charset=utf-8";
    }

    if lowered.starts_with(b"<?xml") {
        return "text/xml; charset=utf-8";
    }

    match content {
        [b'%', b'P', b'D', b'F', b'-', ..] => "application/pdf",
        [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => "image/png",
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => "image/gif",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        [b'P', b'K', 0x03, 0x04, ..] => "application/zip",
        [0x1F, 0x8B, 0x08, ..] => "application/x-gzip",
        _ if is_text(content) => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

fn is_text(content: &[u8]) -> bool {
    let valid = match std::str::from_utf8(content) {
        Ok(_) => true,
        // A multi-byte character cut off by the sniff window is still text.
        Err(error) => error.error_len().is_none(),
    };

    valid
        && !content
            .iter()
            .any(|&byte| matches!(byte, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F))
}
