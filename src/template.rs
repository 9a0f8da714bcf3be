use crate::assets::AssetProvider;
use anyhow::{Context, Result, bail};
use std::{collections::HashMap, path::Path};

enum Segment {
    Text(String),
    Value(String),
}

/// A page template made of literal text and `{{ name }}` placeholders.
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(source: &str) -> Result<Self> {
        let mut segments = vec![];
        let mut rest = source;

        while let Some(start) = rest.find("{{") {
            if start > 0 {
                segments.push(Segment::Text(rest[..start].into()));
            }

            let after = &rest[start + 2..];
            let offset = source.len() - rest.len() + start;
            let end = after
                .find("}}")
                .with_context(|| format!("Unterminated placeholder at byte {offset}"))?;
            let name = after[..end].trim();
            let valid = |char: char| char.is_ascii_alphanumeric() || char == '_';

            if name.is_empty() || !name.chars().all(valid) {
                bail!("Invalid placeholder name {:?}", name);
            }

            segments.push(Segment::Value(name.into()));
            rest = &after[end + 2..];
        }

        if !rest.is_empty() {
            segments.push(Segment::Text(rest.into()));
        }

        Ok(Self { segments })
    }

    pub fn render(&self, values: &HashMap<&str, String>) -> Result<String> {
        let mut output = String::new();

        for segment in &self.segments {
            match segment {
                Segment::Text(text) => output += text,
                Segment::Value(name) => {
                    output += values
                        .get(name.as_str())
                        .with_context(|| format!("No value for placeholder {name}"))?
                }
            }
        }

        Ok(output)
    }
}

/// Every `*.tmpl` asset, parsed once at startup and keyed by base name.
pub struct Templates {
    templates: HashMap<String, Template>,
}

impl Templates {
    pub fn load(provider: &dyn AssetProvider) -> Result<Self> {
        let mut templates = HashMap::new();

        for name in provider.names().into_iter().filter(|name| name.ends_with(".tmpl")) {
            let content = provider
                .read(&name)?
                .with_context(|| format!("Template {name} disappeared while loading"))?;
            let source = String::from_utf8(content)
                .with_context(|| format!("Template {name} is not valid UTF-8"))?;
            let template = Template::parse(&source)
                .with_context(|| format!("Could not parse template {name}"))?;
            let base_name = Path::new(&name)
                .file_name()
                .map_or_else(|| name.clone(), |base| base.to_string_lossy().into_owned());

            templates.insert(base_name, template);
        }

        Ok(Self { templates })
    }

    pub fn render(&self, name: &str, values: &HashMap<&str, String>) -> Result<String> {
        self.templates
            .get(name)
            .with_context(|| format!("Template {name} not found"))?
            .render(values)
    }
}
