//! Version-aware ordering.

use std::cmp::Ordering;

/// A version string decomposed into comparable segments.
///
/// The comparator is deterministic and total: numeric runs compare
/// numerically, alphabetic runs compare case-insensitively, and a qualifier
/// (alphabetic tail such as `SNAPSHOT`, `alpha`, `rc`) sorts before the bare
/// release with the same numeric prefix. Distinct strings never compare
/// equal; the raw string breaks remaining ties.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Version {
    source: String,
    segments: Vec<Segment>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Number(u64),
    Text(String),
}

impl Version {
    pub fn parse(source: &str) -> Self {
        let mut segments = Vec::new();
        let mut current = String::new();
        let mut numeric = false;

        let mut flush = |buffer: &mut String, numeric: bool, segments: &mut Vec<Segment>| {
            if buffer.is_empty() {
                return;
            }
            let segment = if numeric {
                // Overflowing runs fall back to text comparison.
                buffer
                    .parse::<u64>()
                    .map(Segment::Number)
                    .unwrap_or_else(|_| Segment::Text(buffer.to_lowercase()))
            } else {
                Segment::Text(buffer.to_lowercase())
            };
            segments.push(segment);
            buffer.clear();
        };

        for ch in source.chars() {
            match ch {
                '.' | '-' | '_' => flush(&mut current, numeric, &mut segments),
                c if c.is_ascii_digit() => {
                    if !numeric {
                        flush(&mut current, numeric, &mut segments);
                        numeric = true;
                    }
                    current.push(c);
                }
                c => {
                    if numeric {
                        flush(&mut current, numeric, &mut segments);
                        numeric = false;
                    }
                    current.push(c);
                }
            }
        }
        flush(&mut current, numeric, &mut segments);

        Self {
            source: source.to_string(),
            segments,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether this version carries any alphabetic qualifier.
    pub fn is_qualified(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Text(_)))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        for index in 0..len {
            let ordering = match (self.segments.get(index), other.segments.get(index)) {
                (Some(Segment::Number(a)), Some(Segment::Number(b))) => a.cmp(b),
                (Some(Segment::Text(a)), Some(Segment::Text(b))) => a.cmp(b),
                // Numbers rank above qualifiers: 1.0.1 > 1.0-rc.
                (Some(Segment::Number(_)), Some(Segment::Text(_))) => Ordering::Greater,
                (Some(Segment::Text(_)), Some(Segment::Number(_))) => Ordering::Less,
                // A missing segment beats a qualifier (1.0 > 1.0-SNAPSHOT)
                // but loses to a number (1.0 < 1.0.1).
                (Some(Segment::Number(_)), None) => Ordering::Greater,
                (Some(Segment::Text(_)), None) => Ordering::Less,
                (None, Some(Segment::Number(_))) => Ordering::Less,
                (None, Some(Segment::Text(_))) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        // Total order over distinct strings.
        self.source.cmp(&other.source)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compare two raw version strings with version-aware semantics.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    Version::parse(a).cmp(&Version::parse(b))
}
