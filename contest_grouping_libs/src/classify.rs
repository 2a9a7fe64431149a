use crate::contest::ContestId;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::{convert::Infallible, fmt, str::FromStr};
use validator::{Validate, ValidationError};

/// How the author took part in the contest, as reported by the upstream.
///
/// Parsing is case-insensitive. Values the classifier has no rule for are kept in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, SerializeDisplay, DeserializeFromStr)]
pub enum ParticipantType {
    Contestant,
    Virtual,
    Practice,
    OutOfCompetition,
    Other(String),
}

impl FromStr for ParticipantType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_uppercase().as_str() {
            "CONTESTANT" => ParticipantType::Contestant,
            "VIRTUAL" => ParticipantType::Virtual,
            "PRACTICE" => ParticipantType::Practice,
            "OUT_OF_COMPETITION" => ParticipantType::OutOfCompetition,
            _ => ParticipantType::Other(s.to_string()),
        })
    }
}

impl fmt::Display for ParticipantType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParticipantType::Contestant => write!(f, "CONTESTANT"),
            ParticipantType::Virtual => write!(f, "VIRTUAL"),
            ParticipantType::Practice => write!(f, "PRACTICE"),
            ParticipantType::OutOfCompetition => write!(f, "OUT_OF_COMPETITION"),
            ParticipantType::Other(value) => write!(f, "{}", value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SerializeDisplay)]
pub enum Label {
    LiveContest,
    VirtualParticipation,
    Practice,
    Unknown,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Label::LiveContest => write!(f, "Live Contest"),
            Label::VirtualParticipation => write!(f, "Virtual Participation"),
            Label::Practice => write!(f, "Practice"),
            Label::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Start and length of a contest. `start_time` of `None` means the contest is unresolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContestTiming {
    pub start_time: Option<i64>,
    pub duration_seconds: Option<i64>,
}

pub(crate) fn validate_contest_id(contest_id: &ContestId) -> Result<(), ValidationError> {
    if contest_id.is_empty() || contest_id.is_well_formed() {
        Ok(())
    } else {
        Err(ValidationError::new("invalid contest id"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionClassificationInput {
    #[validate(custom = "validate_contest_id")]
    #[serde(default)]
    pub contest_id: Option<ContestId>,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub participant_type: Option<ParticipantType>,
}

impl SubmissionClassificationInput {
    /// Contest id of the submission, treating an empty id as no contest at all.
    pub fn contest(&self) -> Option<&ContestId> {
        self.contest_id.as_ref().filter(|id| !id.is_empty())
    }

    /// Whether `classify` would consult contest metadata for this input.
    pub fn needs_metadata(&self) -> bool {
        self.contest().is_some()
            && self
                .participant_type
                .as_ref()
                .and_then(label_for_participant_type)
                .is_none()
    }
}

pub fn label_for_participant_type(participant_type: &ParticipantType) -> Option<Label> {
    match participant_type {
        ParticipantType::Contestant => Some(Label::LiveContest),
        ParticipantType::Virtual => Some(Label::VirtualParticipation),
        ParticipantType::Practice | ParticipantType::OutOfCompetition => Some(Label::Practice),
        ParticipantType::Other(_) => None,
    }
}

/// Decide the label of a submission.
///
/// The rules are applied in order and the first one that matches wins:
///
/// 1. a submission without a contest is practice,
/// 2. a recognized participant type decides the label on its own,
/// 3. with a known contest start, a timestamp inside `[start, start + duration]` (both ends
///    inclusive) is a live submission and anything outside it is practice,
/// 4. everything else is unknown.
///
/// `lookup` is only called when rule 3 needs the contest timing.
pub fn classify<F>(input: &SubmissionClassificationInput, lookup: F) -> Label
where
    F: FnOnce(&ContestId) -> Option<ContestTiming>,
{
    let contest_id = match input.contest() {
        Some(contest_id) => contest_id,
        None => return Label::Practice,
    };

    if let Some(label) = input
        .participant_type
        .as_ref()
        .and_then(label_for_participant_type)
    {
        return label;
    }

    match lookup(contest_id) {
        Some(ContestTiming {
            start_time: Some(start),
            duration_seconds,
        }) => {
            let end = start + duration_seconds.unwrap_or(0);
            match input.timestamp {
                Some(timestamp) if start <= timestamp && timestamp <= end => Label::LiveContest,
                Some(_) => Label::Practice,
                None => Label::Unknown,
            }
        }
        _ => Label::Unknown,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn input(
        contest_id: Option<&str>,
        timestamp: Option<i64>,
        participant_type: Option<ParticipantType>,
    ) -> SubmissionClassificationInput {
        SubmissionClassificationInput {
            contest_id: contest_id.map(ContestId::from),
            timestamp,
            participant_type,
        }
    }

    fn timing(start: i64, duration: i64) -> Option<ContestTiming> {
        Some(ContestTiming {
            start_time: Some(start),
            duration_seconds: Some(duration),
        })
    }

    #[test]
    fn test_no_contest_is_practice() {
        let participant_types = [
            None,
            Some(ParticipantType::Contestant),
            Some(ParticipantType::Virtual),
            Some(ParticipantType::Other(String::from("MANAGER"))),
        ];
        for participant_type in participant_types {
            for timestamp in [None, Some(0), Some(4000)] {
                let label = classify(&input(None, timestamp, participant_type.clone()), |_| {
                    panic!("lookup must not be called without a contest")
                });
                assert_eq!(label, Label::Practice);
            }
        }

        let label = classify(&input(Some(""), Some(4000), None), |_| timing(1000, 7200));
        assert_eq!(label, Label::Practice);
    }

    #[test]
    fn test_participant_type_decides_alone() {
        let cases = [
            (ParticipantType::Contestant, Label::LiveContest),
            (ParticipantType::Virtual, Label::VirtualParticipation),
            (ParticipantType::Practice, Label::Practice),
            (ParticipantType::OutOfCompetition, Label::Practice),
        ];
        for (participant_type, expected) in cases {
            for timestamp in [None, Some(4000), Some(9000)] {
                let label = classify(
                    &input(Some("1234"), timestamp, Some(participant_type.clone())),
                    |_| panic!("lookup must not be called for a known participant type"),
                );
                assert_eq!(label, expected);
            }
        }
    }

    #[test]
    fn test_unrecognized_participant_type_falls_through() {
        let participant_type = Some(ParticipantType::Other(String::from("MANAGER")));
        let label = classify(
            &input(Some("1234"), Some(4000), participant_type.clone()),
            |_| timing(1000, 7200),
        );
        assert_eq!(label, Label::LiveContest);

        let label = classify(&input(Some("1234"), Some(4000), participant_type), |_| None);
        assert_eq!(label, Label::Unknown);
    }

    #[test]
    fn test_window() {
        let label = classify(&input(Some("1234"), Some(4000), None), |_| timing(1000, 7200));
        assert_eq!(label, Label::LiveContest);

        let label = classify(&input(Some("1234"), Some(9000), None), |_| timing(1000, 7200));
        assert_eq!(label, Label::Practice);

        let label = classify(&input(Some("1234"), Some(999), None), |_| timing(1000, 7200));
        assert_eq!(label, Label::Practice);

        let label = classify(&input(Some("1234"), None, None), |_| timing(1000, 7200));
        assert_eq!(label, Label::Unknown);
    }

    #[test]
    fn test_window_boundaries_are_inclusive() {
        let label = classify(&input(Some("1234"), Some(1000), None), |_| timing(1000, 7200));
        assert_eq!(label, Label::LiveContest);

        let label = classify(&input(Some("1234"), Some(8200), None), |_| timing(1000, 7200));
        assert_eq!(label, Label::LiveContest);

        let label = classify(&input(Some("1234"), Some(8201), None), |_| timing(1000, 7200));
        assert_eq!(label, Label::Practice);
    }

    #[test]
    fn test_missing_duration_is_zero_length() {
        let lookup = |_: &ContestId| {
            Some(ContestTiming {
                start_time: Some(1000),
                duration_seconds: None,
            })
        };
        assert_eq!(
            classify(&input(Some("1234"), Some(1000), None), lookup),
            Label::LiveContest
        );
        assert_eq!(
            classify(&input(Some("1234"), Some(1001), None), lookup),
            Label::Practice
        );
    }

    #[test]
    fn test_unresolved_metadata_is_unknown() {
        let label = classify(&input(Some("gym-55"), Some(4000), None), |_| None);
        assert_eq!(label, Label::Unknown);

        let label = classify(&input(Some("gym-55"), Some(4000), None), |_| {
            Some(ContestTiming::default())
        });
        assert_eq!(label, Label::Unknown);
    }

    #[test]
    fn test_deserialize_input() {
        let input: SubmissionClassificationInput = serde_json::from_str(
            r#"{"contestId": "1234", "timestamp": 4000, "participantType": "virtual"}"#,
        )
        .unwrap();
        assert_eq!(input.contest_id, Some(ContestId::from("1234")));
        assert_eq!(input.timestamp, Some(4000));
        assert_eq!(input.participant_type, Some(ParticipantType::Virtual));

        let input: SubmissionClassificationInput =
            serde_json::from_str(r#"{"participantType": "MANAGER"}"#).unwrap();
        assert_eq!(input.contest_id, None);
        assert_eq!(
            input.participant_type,
            Some(ParticipantType::Other(String::from("MANAGER")))
        );
    }

    #[test]
    fn test_validate_input() {
        assert!(input(Some("1234"), Some(4000), None).validate().is_ok());
        assert!(input(Some("gym-55"), None, None).validate().is_ok());
        assert!(input(Some(""), None, None).validate().is_ok());
        assert!(input(Some("1234; DROP"), None, None).validate().is_err());
        assert!(input(Some("1234"), Some(-1), None).validate().is_err());
    }

    #[test]
    fn test_needs_metadata() {
        assert!(!input(None, Some(1), None).needs_metadata());
        assert!(!input(Some("1"), Some(1), Some(ParticipantType::Virtual)).needs_metadata());
        assert!(input(Some("1"), Some(1), None).needs_metadata());
        assert!(input(
            Some("1"),
            Some(1),
            Some(ParticipantType::Other(String::from("MANAGER")))
        )
        .needs_metadata());
    }

    #[test]
    fn test_label_serializes_as_display() {
        assert_eq!(
            serde_json::to_string(&Label::VirtualParticipation).unwrap(),
            r#""Virtual Participation""#
        );
    }
}
