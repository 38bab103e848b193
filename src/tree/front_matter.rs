//! YAML front matter of index documents

use serde_yaml::{Mapping, Value};

/// Fields of an index document's front matter that feed the descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub summary: Option<String>,
}

/// Parse the leading `---` delimited YAML block of a markdown document
///
/// Returns an empty `FrontMatter` when the document has no front matter.
/// Empty strings are treated as absent.
pub fn parse(document: &str) -> Result<FrontMatter, serde_yaml::Error> {
    let Some(yaml) = extract_block(document) else {
        return Ok(FrontMatter::default());
    };
    if yaml.trim().is_empty() {
        return Ok(FrontMatter::default());
    }

    let mapping: Mapping = match serde_yaml::from_str::<Value>(yaml)? {
        Value::Mapping(mapping) => mapping,
        Value::Null => return Ok(FrontMatter::default()),
        other => {
            return Err(serde::de::Error::custom(format!(
                "front matter must be a mapping, found {}",
                value_kind(&other)
            )))
        }
    };

    Ok(FrontMatter {
        title: scalar_string(mapping.get("title")),
        summary: scalar_string(mapping.get("summary")),
    })
}

fn extract_block(document: &str) -> Option<&str> {
    let document = document.strip_prefix('\u{feff}').unwrap_or(document);
    let rest = document
        .strip_prefix("---\r\n")
        .or_else(|| document.strip_prefix("---\n"))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == "---" {
            return Some(&rest[..offset]);
        }
        offset += line.len();
    }
    None
}

fn scalar_string(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
