//! Path template segmentation and comparison helpers.

use std::cmp::Ordering;

/// One `/`-separated piece of a path template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Literal text that must appear verbatim in the request.
    Literal(&'a str),
    /// A `{name}` placeholder that captures any single request segment.
    Placeholder {
        /// The segment as written, braces included.
        raw: &'a str,
        /// The parameter name with the surrounding braces removed.
        name: &'a str,
    },
}

impl<'a> Segment<'a> {
    /// Classifies a template segment. Any segment containing `{` is a
    /// placeholder.
    pub fn parse(raw: &'a str) -> Self {
        if raw.contains('{') {
            let name = raw.strip_prefix('{').unwrap_or(raw);
            let name = name.strip_suffix('}').unwrap_or(name);
            Self::Placeholder { raw, name }
        } else {
            Self::Literal(raw)
        }
    }

    /// Returns true for placeholders.
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder { .. })
    }
}

/// Splits a path on `/`, dropping a single leading empty segment.
///
/// Interior and trailing empty segments are kept, so `/users/` yields
/// `["users", ""]`.
pub fn split_segments(path: &str) -> Vec<&str> {
    let mut segments: Vec<&str> = path.split('/').collect();
    if segments.first().is_some_and(|s| s.is_empty()) {
        segments.remove(0);
    }
    segments
}

/// A path template split into segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate<'a> {
    raw: &'a str,
    segments: Vec<Segment<'a>>,
}

impl<'a> PathTemplate<'a> {
    /// Splits and classifies a template.
    pub fn parse(raw: &'a str) -> Self {
        let segments = split_segments(raw).into_iter().map(Segment::parse).collect();
        Self { raw, segments }
    }

    /// The template as declared.
    pub fn as_str(&self) -> &'a str {
        self.raw
    }

    /// The classified segments.
    pub fn segments(&self) -> &[Segment<'a>] {
        &self.segments
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true if the template has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of placeholder segments.
    pub fn placeholder_count(&self) -> usize {
        self.segments.iter().filter(|s| s.is_placeholder()).count()
    }
}

/// Joins path components and lexically cleans the result.
///
/// Empty and `.` components vanish and `..` removes the preceding component.
/// A `..` with nothing to remove is kept. The result carries no leading or
/// trailing separator.
pub fn canonical_join<'s, I>(components: I) -> String
where
    I: IntoIterator<Item = &'s str>,
{
    let mut cleaned: Vec<&str> = Vec::new();
    for part in components.into_iter().flat_map(|c| c.split('/')) {
        match part {
            "" | "." => {}
            ".." => {
                if cleaned.last().is_some_and(|last| *last != "..") {
                    cleaned.pop();
                } else {
                    cleaned.push("..");
                }
            }
            other => cleaned.push(other),
        }
    }
    cleaned.join("/")
}

/// Orders templates so the more specific ones come first.
///
/// Fewer placeholders wins; among equals, the longer template wins.
pub fn specificity(a: &str, b: &str) -> Ordering {
    let a_params = a.matches('{').count();
    let b_params = b.matches('{').count();
    a_params.cmp(&b_params).then_with(|| b.len().cmp(&a.len()))
}
