// src/ner/labels.rs
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of address fields the entity model can recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityLabel {
    Gov,
    Area,
    Block,
    Street,
    Building,
}

impl EntityLabel {
    /// Output order of the formatted address.
    pub const ALL: [EntityLabel; 5] = [
        EntityLabel::Gov,
        EntityLabel::Area,
        EntityLabel::Block,
        EntityLabel::Street,
        EntityLabel::Building,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityLabel::Gov => "GOV",
            EntityLabel::Area => "AREA",
            EntityLabel::Block => "BLOCK",
            EntityLabel::Street => "STREET",
            EntityLabel::Building => "BUILDING",
        }
    }

    fn index(&self) -> usize {
        match self {
            EntityLabel::Gov => 0,
            EntityLabel::Area => 1,
            EntityLabel::Block => 2,
            EntityLabel::Street => 3,
            EntityLabel::Building => 4,
        }
    }
}

impl fmt::Display for EntityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for EntityLabel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "GOV" => Ok(EntityLabel::Gov),
            "AREA" => Ok(EntityLabel::Area),
            "BLOCK" => Ok(EntityLabel::Block),
            "STREET" => Ok(EntityLabel::Street),
            "BUILDING" => Ok(EntityLabel::Building),
            other => Err(anyhow!("Unknown entity label '{}'", other)),
        }
    }
}

/// BIO tag over a single token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    Outside,
    Begin(EntityLabel),
    Inside(EntityLabel),
}

pub const TAG_COUNT: usize = 1 + 2 * EntityLabel::ALL.len();

impl Tag {
    /// All tags in index order: O, B-*, I-*.
    pub fn all() -> Vec<Tag> {
        let mut tags = Vec::with_capacity(TAG_COUNT);
        tags.push(Tag::Outside);
        tags.extend(EntityLabel::ALL.iter().map(|l| Tag::Begin(*l)));
        tags.extend(EntityLabel::ALL.iter().map(|l| Tag::Inside(*l)));
        tags
    }

    pub fn index(&self) -> usize {
        match self {
            Tag::Outside => 0,
            Tag::Begin(l) => 1 + l.index(),
            Tag::Inside(l) => 1 + EntityLabel::ALL.len() + l.index(),
        }
    }

    pub fn from_index(idx: usize) -> Option<Tag> {
        Tag::all().get(idx).copied()
    }

    pub fn label(&self) -> Option<EntityLabel> {
        match self {
            Tag::Outside => None,
            Tag::Begin(l) | Tag::Inside(l) => Some(*l),
        }
    }

    /// `I-X` may only continue a `B-X` or `I-X`; `prev == None` is the sequence start.
    pub fn can_follow(prev: Option<Tag>, next: Tag) -> bool {
        match next {
            Tag::Inside(label) => matches!(
                prev,
                Some(Tag::Begin(p)) | Some(Tag::Inside(p)) if p == label
            ),
            _ => true,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Outside => f.write_str("O"),
            Tag::Begin(l) => write!(f, "B-{}", l),
            Tag::Inside(l) => write!(f, "I-{}", l),
        }
    }
}

/// Entity over a half-open token range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenSpan {
    pub start: usize,
    pub end: usize,
    pub label: EntityLabel,
}

impl TokenSpan {
    pub fn overlaps(&self, other: &TokenSpan) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Expands non-overlapping token spans into one BIO tag per token.
pub fn spans_to_tags(token_count: usize, spans: &[TokenSpan]) -> Vec<Tag> {
    let mut tags = vec![Tag::Outside; token_count];
    for span in spans {
        if span.start >= span.end || span.end > token_count {
            continue;
        }
        tags[span.start] = Tag::Begin(span.label);
        for tag in tags.iter_mut().take(span.end).skip(span.start + 1) {
            *tag = Tag::Inside(span.label);
        }
    }
    tags
}

/// Collapses BIO tags back into spans. A stray `I-X` opens a new span.
pub fn tags_to_spans(tags: &[Tag]) -> Vec<TokenSpan> {
    let mut spans = Vec::new();
    let mut open: Option<(usize, EntityLabel)> = None;

    for (i, tag) in tags.iter().enumerate() {
        match *tag {
            Tag::Begin(label) => {
                if let Some((start, l)) = open.take() {
                    spans.push(TokenSpan { start, end: i, label: l });
                }
                open = Some((i, label));
            }
            Tag::Inside(label) => match open {
                Some((_, l)) if l == label => {}
                _ => {
                    if let Some((start, l)) = open.take() {
                        spans.push(TokenSpan { start, end: i, label: l });
                    }
                    open = Some((i, label));
                }
            },
            Tag::Outside => {
                if let Some((start, l)) = open.take() {
                    spans.push(TokenSpan { start, end: i, label: l });
                }
            }
        }
    }
    if let Some((start, l)) = open {
        spans.push(TokenSpan { start, end: tags.len(), label: l });
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_parsing() {
        assert_eq!("GOV".parse::<EntityLabel>().unwrap(), EntityLabel::Gov);
        assert_eq!(" building ".parse::<EntityLabel>().unwrap(), EntityLabel::Building);
        assert!("CITY".parse::<EntityLabel>().is_err());
    }

    #[test]
    fn test_tag_index_round_trip() {
        for (i, tag) in Tag::all().into_iter().enumerate() {
            assert_eq!(tag.index(), i);
            assert_eq!(Tag::from_index(i), Some(tag));
        }
        assert_eq!(Tag::all().len(), TAG_COUNT);
        assert_eq!(Tag::from_index(TAG_COUNT), None);
    }

    #[test]
    fn test_transition_rules() {
        let street = EntityLabel::Street;
        assert!(Tag::can_follow(None, Tag::Begin(street)));
        assert!(!Tag::can_follow(None, Tag::Inside(street)));
        assert!(Tag::can_follow(Some(Tag::Begin(street)), Tag::Inside(street)));
        assert!(!Tag::can_follow(Some(Tag::Begin(EntityLabel::Block)), Tag::Inside(street)));
        assert!(!Tag::can_follow(Some(Tag::Outside), Tag::Inside(street)));
    }

    #[test]
    fn test_spans_and_tags() {
        let spans = vec![
            TokenSpan { start: 0, end: 2, label: EntityLabel::Block },
            TokenSpan { start: 3, end: 4, label: EntityLabel::Area },
        ];
        let tags = spans_to_tags(5, &spans);
        assert_eq!(
            tags,
            vec![
                Tag::Begin(EntityLabel::Block),
                Tag::Inside(EntityLabel::Block),
                Tag::Outside,
                Tag::Begin(EntityLabel::Area),
                Tag::Outside,
            ]
        );
        assert_eq!(tags_to_spans(&tags), spans);
    }

    #[test]
    fn test_adjacent_spans_of_same_label() {
        let tags = vec![Tag::Begin(EntityLabel::Gov), Tag::Begin(EntityLabel::Gov), Tag::Inside(EntityLabel::Gov)];
        let spans = tags_to_spans(&tags);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[1], TokenSpan { start: 1, end: 3, label: EntityLabel::Gov });
    }

    #[test]
    fn test_stray_inside_opens_span() {
        let tags = vec![Tag::Outside, Tag::Inside(EntityLabel::Street), Tag::Inside(EntityLabel::Street)];
        assert_eq!(
            tags_to_spans(&tags),
            vec![TokenSpan { start: 1, end: 3, label: EntityLabel::Street }]
        );
    }
}
