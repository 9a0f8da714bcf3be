use crate::{
    registry::{LinkRegistry, SHARE_PREFIX, ShareLink},
    template::Templates,
    traits::HumanSize,
};
use anyhow::Result;
use html_escape::{encode_double_quoted_attribute, encode_text};
use natord::compare_ignore_case;
use std::collections::HashMap;

pub static LISTING_TEMPLATE: &str = "index.tmpl";

/// The index page: every listed share link, ordered naturally by name.
pub struct Listing<'a> {
    links: Vec<&'a ShareLink>,
}

impl<'a> Listing<'a> {
    pub fn new(registry: &'a LinkRegistry) -> Self {
        let mut links = registry.listed().collect::<Vec<&ShareLink>>();
        links.sort_by(|a, b| compare_ignore_case(&a.name, &b.name));

        Self { links }
    }

    pub fn render(&self, templates: &Templates) -> Result<String> {
        let mut file_elements = String::new();

        for link in &self.links {
            file_elements += &format!(
                concat!(
                    r#"<li class="file">"#,
                    r#"<a href="{href}" target="_blank">{name}</a>"#,
                    r#"<span class="size">{size}</span>"#,
                    r#"<button class="copy" data-href="{href}">Copy link</button>"#,
                    "</li>",
                ),
                href = encode_double_quoted_attribute(&href(link)),
                name = encode_text(&link.name),
                size = link.file.size.human_size(),
            );
        }

        let values = HashMap::from([
            ("total", self.links.len().to_string()),
            ("files", file_elements),
        ]);

        templates.render(LISTING_TEMPLATE, &values)
    }
}

/// The link's URI with the display name percent-encoded for use in a URL.
fn href(link: &ShareLink) -> String {
    format!(
        "{SHARE_PREFIX}/{}/{}",
        link.token,
        urlencoding::encode(&link.name)
    )
}
