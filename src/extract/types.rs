use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    Heading,
    Paragraph,
    List,
    Table,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub text: String,
}

/// Ordered, per-category deduplicated text segments of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedContent {
    segments: Vec<Segment>,
    seen: HashSet<(SegmentKind, String)>,
}

impl ExtractedContent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts `text` unless the same kind already holds identical text.
    /// Returns whether the segment was kept.
    pub fn push(&mut self, kind: SegmentKind, text: String) -> bool {
        if !self.seen.insert((kind, text.clone())) {
            return false;
        }
        self.segments.push(Segment { kind, text });
        true
    }

    #[cfg(test)]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[cfg(test)]
    pub fn texts_of(&self, kind: SegmentKind) -> Vec<&str> {
        self.segments
            .iter()
            .filter(|s| s.kind == kind)
            .map(|s| s.text.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Renders segments in document order separated by blank lines.
impl fmt::Display for ExtractedContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("\n\n")?;
            }
            f.write_str(&segment.text)?;
        }
        Ok(())
    }
}
