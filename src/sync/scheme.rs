//! Descriptor addressing on the server
//!
//! The scheme is chosen once from configuration and shared by every fetch
//! a synchronizer makes.

/// How node descriptors are laid out below the site base URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathScheme {
    /// `{prefix}/{collection}/{descriptor}`; only collections are addressable
    Flat { prefix: String, descriptor_file: String },
    /// `{prefix}/{collection}/{child}/.../{descriptor}`, mirroring the source tree
    Nested { prefix: String, descriptor_file: String },
}

impl PathScheme {
    pub fn flat(prefix: &str, descriptor_file: &str) -> Self {
        PathScheme::Flat {
            prefix: trim_slashes(prefix).to_string(),
            descriptor_file: descriptor_file.to_string(),
        }
    }

    pub fn nested(prefix: &str, descriptor_file: &str) -> Self {
        PathScheme::Nested {
            prefix: trim_slashes(prefix).to_string(),
            descriptor_file: descriptor_file.to_string(),
        }
    }

    /// Relative path of a collection's descriptor
    pub fn collection_path(&self, collection: &str) -> String {
        let (prefix, descriptor_file) = self.parts();
        join_segments(prefix, std::iter::once(collection), descriptor_file)
    }

    /// Relative path of a node below a collection
    ///
    /// Returns `None` for nested nodes under the flat scheme.
    pub fn node_path<S: AsRef<str>>(&self, collection: &str, path: &[S]) -> Option<String> {
        match self {
            PathScheme::Flat { .. } if !path.is_empty() => None,
            _ => {
                let (prefix, descriptor_file) = self.parts();
                let segments = std::iter::once(collection)
                    .chain(path.iter().map(|s| AsRef::<str>::as_ref(s)));
                Some(join_segments(prefix, segments, descriptor_file))
            }
        }
    }

    fn parts(&self) -> (&str, &str) {
        match self {
            PathScheme::Flat {
                prefix,
                descriptor_file,
            }
            | PathScheme::Nested {
                prefix,
                descriptor_file,
            } => (prefix, descriptor_file),
        }
    }
}

fn trim_slashes(s: &str) -> &str {
    s.trim_matches('/')
}

fn join_segments<'a>(
    prefix: &'a str,
    segments: impl Iterator<Item = &'a str>,
    descriptor_file: &'a str,
) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if !prefix.is_empty() {
        parts.push(prefix);
    }
    parts.extend(segments.map(trim_slashes).filter(|s| !s.is_empty()));
    parts.push(descriptor_file);
    parts.join("/")
}
