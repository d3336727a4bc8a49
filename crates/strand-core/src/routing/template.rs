//! Path templates with named captures.

use std::collections::HashMap;
use std::fmt;

/// A path pattern such as `/items/<id>/reviews`.
///
/// Segments wrapped in angle brackets are parameters and match any single
/// segment; the matched text is captured under the parameter's name. All
/// other segments must match literally. Leading, trailing, and duplicate
/// slashes are insignificant.
#[derive(Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Parameter(String),
}

impl PathTemplate {
    /// Parses a template.
    pub fn parse(template: &str) -> Self {
        let segments = split(template)
            .map(|segment| {
                match segment
                    .strip_prefix('<')
                    .and_then(|rest| rest.strip_suffix('>'))
                {
                    Some(name) if !name.is_empty() => Segment::Parameter(name.to_string()),
                    _ => Segment::Literal(segment.to_string()),
                }
            })
            .collect();
        Self {
            raw: template.to_string(),
            segments,
        }
    }

    /// Matches `path` against this template.
    ///
    /// Returns the captured parameters on a match (empty for a template
    /// without parameters), or `None` when the path does not fit.
    pub fn matches(&self, path: &str) -> Option<HashMap<String, String>> {
        let segments: Vec<&str> = split(path).collect();
        if segments.len() != self.segments.len() {
            return None;
        }

        let mut captures = HashMap::new();
        for (actual, expected) in segments.iter().zip(&self.segments) {
            match expected {
                Segment::Literal(literal) if literal == actual => {}
                Segment::Literal(_) => return None,
                Segment::Parameter(name) => {
                    captures.insert(name.clone(), (*actual).to_string());
                }
            }
        }
        Some(captures)
    }

    /// Returns the names of the parameters this template captures.
    pub fn parameter_names(&self) -> Vec<String> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Parameter(name) => Some(name.clone()),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// Returns whether some concrete path could match both templates.
    ///
    /// Parameters match any segment, so two templates overlap exactly when
    /// they have the same length and agree on every pair of literal segments.
    pub fn overlaps(&self, other: &PathTemplate) -> bool {
        self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|pair| match pair {
                    (Segment::Literal(a), Segment::Literal(b)) => a == b,
                    _ => true,
                })
    }

    /// Returns the template source text.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Debug for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PathTemplate").field(&self.raw).finish()
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn split(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_template_matches_exactly() {
        let template = PathTemplate::parse("/items");
        assert_eq!(template.matches("/items"), Some(HashMap::new()));
        assert_eq!(template.matches("items/"), Some(HashMap::new()));
        assert_eq!(template.matches("/items/1"), None);
        assert_eq!(template.matches("/other"), None);
    }

    #[test]
    fn test_parameters_capture_their_segment() {
        let template = PathTemplate::parse("/items/<id>/reviews/<review>");
        let captures = template.matches("/items/42/reviews/7").unwrap();
        assert_eq!(captures["id"], "42");
        assert_eq!(captures["review"], "7");
        assert_eq!(
            template.parameter_names(),
            vec!["id".to_string(), "review".to_string()]
        );
    }

    #[test]
    fn test_overlap_requires_compatible_literals() {
        let items = PathTemplate::parse("/items/<id>");
        assert!(items.overlaps(&PathTemplate::parse("/items/<name>")));
        assert!(items.overlaps(&PathTemplate::parse("/<collection>/42")));
        assert!(!items.overlaps(&PathTemplate::parse("/users/<id>")));
        assert!(!items.overlaps(&PathTemplate::parse("/items/<id>/reviews")));
    }
}
