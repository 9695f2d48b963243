use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub(crate) enum Tag {
    Adventure,
    #[serde(rename = "Trail Review")]
    TrailReview,
    #[serde(rename = "Scenic View")]
    ScenicView,
    #[serde(rename = "Trail Tips")]
    TrailTips,
    #[serde(rename = "Gear Advice")]
    GearAdvice,
    #[serde(rename = "Planning Help")]
    PlanningHelp,
    #[serde(rename = "Weather Concerns")]
    WeatherConcerns,
    #[serde(rename = "Trail Running")]
    TrailRunning,
    Question,
    Opinion,
    Discussion,
    Other,
}

impl Tag {
    pub(crate) const ALL: [Tag; 12] = [
        Tag::Adventure,
        Tag::TrailReview,
        Tag::ScenicView,
        Tag::TrailTips,
        Tag::GearAdvice,
        Tag::PlanningHelp,
        Tag::WeatherConcerns,
        Tag::TrailRunning,
        Tag::Question,
        Tag::Opinion,
        Tag::Discussion,
        Tag::Other,
    ];

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Tag::Adventure => "Adventure",
            Tag::TrailReview => "Trail Review",
            Tag::ScenicView => "Scenic View",
            Tag::TrailTips => "Trail Tips",
            Tag::GearAdvice => "Gear Advice",
            Tag::PlanningHelp => "Planning Help",
            Tag::WeatherConcerns => "Weather Concerns",
            Tag::TrailRunning => "Trail Running",
            Tag::Question => "Question",
            Tag::Opinion => "Opinion",
            Tag::Discussion => "Discussion",
            Tag::Other => "Other",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tag {
    type Err = DomainError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Tag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == raw)
            .ok_or_else(|| DomainError::InvalidTags(vec![raw.to_string()]))
    }
}

/// All-or-nothing: every unknown value is reported, nothing is accepted partially.
///
/// Entries may themselves be JSON-encoded arrays (form fields carry tags that way);
/// they are flattened before the vocabulary check.
pub(crate) fn parse_tags<S: AsRef<str>>(raw: &[S]) -> Result<Vec<Tag>, DomainError> {
    let values = expand_tag_inputs(raw)?;
    let mut tags = Vec::with_capacity(values.len());
    let mut invalid = Vec::new();

    for value in values {
        match value.parse::<Tag>() {
            Ok(tag) if !tags.contains(&tag) => tags.push(tag),
            Ok(_) => {}
            Err(_) => invalid.push(value),
        }
    }

    if !invalid.is_empty() {
        return Err(DomainError::InvalidTags(invalid));
    }
    Ok(tags)
}

fn expand_tag_inputs<S: AsRef<str>>(raw: &[S]) -> Result<Vec<String>, DomainError> {
    let mut values = Vec::with_capacity(raw.len());

    for entry in raw {
        let entry = entry.as_ref().trim();
        if entry.is_empty() {
            continue;
        }
        if entry.starts_with('[') {
            let nested: Vec<String> =
                serde_json::from_str(entry).map_err(|_| DomainError::Validation {
                    field: "tags",
                    message: "must be an array of strings or a JSON-encoded array",
                })?;
            values.extend(
                nested
                    .iter()
                    .map(|value| value.trim())
                    .filter(|value| !value.is_empty())
                    .map(str::to_string),
            );
        } else {
            values.push(entry.to_string());
        }
    }

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::{Tag, parse_tags};
    use crate::domain::error::DomainError;

    #[test]
    fn every_vocabulary_entry_round_trips_through_its_label() {
        for tag in Tag::ALL {
            let parsed: Tag = tag.as_str().parse().expect("label must parse");
            assert_eq!(parsed, tag);
        }
    }

    #[test]
    fn labels_are_case_sensitive() {
        assert!("adventure".parse::<Tag>().is_err());
        assert!("Trail review".parse::<Tag>().is_err());
    }

    #[test]
    fn parse_tags_rejects_whole_list_when_one_value_is_unknown() {
        let err = parse_tags(&["Adventure", "Skydiving", "Opinion", "Fishing"])
            .expect_err("unknown tags must be rejected");
        match err {
            DomainError::InvalidTags(values) => assert_eq!(values, vec!["Skydiving", "Fishing"]),
            other => panic!("expected InvalidTags, got {other:?}"),
        }
    }

    #[test]
    fn parse_tags_trims_and_collapses_duplicates() {
        let tags = parse_tags(&[" Scenic View ", "Question", "Scenic View"])
            .expect("tags must be valid");
        assert_eq!(tags, vec![Tag::ScenicView, Tag::Question]);
    }

    #[test]
    fn parse_tags_flattens_json_encoded_entries() {
        let tags = parse_tags(&["[\"Trail Tips\",\"Question\"]", "Opinion", "  "])
            .expect("tags must be valid");
        assert_eq!(tags, vec![Tag::TrailTips, Tag::Question, Tag::Opinion]);
    }

    #[test]
    fn parse_tags_rejects_broken_json_array() {
        let err = parse_tags(&["[\"Adventure\""]).expect_err("must be rejected");
        assert!(matches!(err, DomainError::Validation { field: "tags", .. }));
    }

    #[test]
    fn parse_tags_accepts_empty_list() {
        let tags = parse_tags::<&str>(&[]).expect("empty list is allowed");
        assert!(tags.is_empty());
    }

    #[test]
    fn serde_uses_human_labels() {
        let json = serde_json::to_string(&Tag::GearAdvice).expect("serialize");
        assert_eq!(json, "\"Gear Advice\"");
    }
}
