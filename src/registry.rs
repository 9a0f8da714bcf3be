use crate::{file::File, token};
use anyhow::{Context, Result, bail};
use std::{collections::HashMap, path::PathBuf};
use tracing::{debug, warn};

pub const SHARE_PREFIX: &str = "/share";

/// One shared file and the secret URI it is reachable at.
#[derive(Debug)]
pub struct ShareLink {
    pub name: String,
    pub token: String,
    pub uri: String,
    pub file: File,
}

/// Mapping between display names, share URIs and files on disk.
///
/// Built once at startup and only read afterwards, so worker threads share it
/// by reference.
#[derive(Debug)]
pub struct LinkRegistry {
    links: Vec<ShareLink>,
    name_uri: HashMap<String, usize>,
    uri_file: HashMap<String, usize>,
}

impl LinkRegistry {
    pub fn build(paths: &[PathBuf], token_length: usize) -> Result<Self> {
        Self::build_with(paths, || token::generate(token_length))
    }

    /// Builds the registry with tokens from `next_token`, called once per path.
    pub fn build_with(
        paths: &[PathBuf],
        mut next_token: impl FnMut() -> Result<String>,
    ) -> Result<Self> {
        if paths.is_empty() {
            bail!("No files were supplied to share");
        }

        let mut registry = Self {
            links: Vec::with_capacity(paths.len()),
            name_uri: HashMap::new(),
            uri_file: HashMap::new(),
        };

        for path in paths {
            let file = File::new(path.clone())?;
            let name = path
                .file_name()
                .with_context(|| format!("Could not share {}: no file name", path.display()))?
                .to_string_lossy()
                .into_owned();
            let token = next_token().context("Could not generate share token")?;
            let uri = format!("{SHARE_PREFIX}/{token}/{name}");
            let index = registry.links.len();

            debug!(uri = %uri, path = %path.display(), "Registered share route");

            if let Some(previous) = registry.name_uri.insert(name.clone(), index) {
                warn!(
                    name = %name,
                    hidden = %registry.links[previous].uri,
                    "Duplicate file name, only the last one is listed"
                );
            }

            registry.uri_file.insert(uri.clone(), index);
            registry.links.push(ShareLink {
                name,
                token,
                uri,
                file,
            });
        }

        Ok(registry)
    }

    /// Every registered link, in input order.
    pub fn links(&self) -> &[ShareLink] {
        &self.links
    }

    /// The links shown on the listing page: one per display name, the last
    /// registered winning.
    pub fn listed(&self) -> impl Iterator<Item = &ShareLink> {
        self.links
            .iter()
            .filter(|link| self.uri_for_name(&link.name) == Some(link.uri.as_str()))
    }

    pub fn uri_for_name(&self, name: &str) -> Option<&str> {
        self.name_uri
            .get(name)
            .map(|index| self.links[*index].uri.as_str())
    }

    pub fn file_for_uri(&self, uri: &str) -> Option<&File> {
        self.uri_file.get(uri).map(|index| &self.links[*index].file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TOKEN_LENGTH;
    use std::fs::{create_dir, write};
    use tempfile::{TempDir, tempdir};

    fn fixture(names: &[&str]) -> (TempDir, Vec<PathBuf>) {
        let dir = tempdir().unwrap();
        let paths = names
            .iter()
            .map(|name| {
                let path = dir.path().join(name);
                if let Some(parent) = path.parent() {
                    let _ = create_dir(parent);
                }
                write(&path, name.as_bytes()).unwrap();
                path
            })
            .collect();

        (dir, paths)
    }

    fn token_of(uri: &str) -> &str {
        uri.split('/').nth(2).unwrap()
    }

    #[test]
    fn one_entry_per_input_path() {
        let (_dir, paths) = fixture(&["report.pdf", "notes.txt", "image.png"]);
        let registry = LinkRegistry::build(&paths, TOKEN_LENGTH).unwrap();

        assert_eq!(registry.links().len(), 3);

        for (link, path) in registry.links().iter().zip(&paths) {
            assert_eq!(&link.file.path, path);
            assert_eq!(registry.file_for_uri(&link.uri).unwrap().path, *path);
            assert_eq!(registry.uri_for_name(&link.name), Some(link.uri.as_str()));
        }
    }

    #[test]
    fn uri_shape() {
        let (_dir, paths) = fixture(&["report.pdf"]);
        let registry = LinkRegistry::build(&paths, TOKEN_LENGTH).unwrap();
        let uri = registry.uri_for_name("report.pdf").unwrap();

        assert!(uri.starts_with("/share/"));
        assert!(uri.ends_with("/report.pdf"));
        assert_eq!(token_of(uri).len(), TOKEN_LENGTH);
        assert!(token_of(uri).chars().all(|char| char.is_ascii_alphanumeric()));
        assert_eq!(registry.links()[0].token, token_of(uri));
    }

    #[test]
    fn same_path_twice_gets_two_links() {
        let (_dir, mut paths) = fixture(&["a.txt"]);
        paths.push(paths[0].clone());

        let registry = LinkRegistry::build(&paths, TOKEN_LENGTH).unwrap();
        let links = registry.links();

        assert_eq!(links.len(), 2);
        assert_ne!(links[0].uri, links[1].uri);
        assert_eq!(links[0].file.path, links[1].file.path);
    }

    #[test]
    fn duplicate_names_keep_last_in_listing() {
        let (_dir, paths) = fixture(&["one/data.csv", "two/data.csv"]);
        let mut tokens = ["FIRSTFIRSTFIRST1", "SECONDSECONDSEC2"].into_iter();
        let registry =
            LinkRegistry::build_with(&paths, || Ok(tokens.next().unwrap().to_string())).unwrap();

        assert_eq!(
            registry.uri_for_name("data.csv"),
            Some("/share/SECONDSECONDSEC2/data.csv")
        );
        assert_eq!(registry.listed().count(), 1);
        assert_eq!(
            registry
                .file_for_uri("/share/FIRSTFIRSTFIRST1/data.csv")
                .unwrap()
                .path,
            paths[0]
        );
    }

    #[test]
    fn missing_file_aborts_build() {
        let (dir, mut paths) = fixture(&["here.txt"]);
        paths.push(dir.path().join("gone.txt"));

        let error = LinkRegistry::build(&paths, TOKEN_LENGTH).unwrap_err();

        assert!(error.to_string().contains("gone.txt"));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(LinkRegistry::build(&[], TOKEN_LENGTH).is_err());
    }

    #[test]
    fn token_failure_aborts_build() {
        let (_dir, paths) = fixture(&["a.txt"]);

        let registry = LinkRegistry::build_with(&paths, || Err(anyhow::anyhow!("no entropy")));

        assert!(registry.is_err());
    }

    #[test]
    fn unregistered_uri_is_unknown() {
        let (_dir, paths) = fixture(&["a.txt"]);
        let registry = LinkRegistry::build(&paths, TOKEN_LENGTH).unwrap();

        assert!(registry.file_for_uri("/share/AAAAAAAAAAAAAAAA/a.txt").is_none());
    }
}
