use std::collections::BTreeMap;

use serde::Serialize;

/// Canonical lookup key for a free-text position.
///
/// Lowercases, turns whitespace, `/`, `&` and `-` into separators, and collapses separator runs
/// into single spaces. The function is idempotent.
pub fn normalize_position(value: &str) -> String {
    let lowered = value.trim().to_lowercase();
    let separated: String = lowered
        .chars()
        .map(|ch| {
            if ch.is_whitespace() || matches!(ch, '/' | '&' | '-') {
                ' '
            } else {
                ch
            }
        })
        .collect();
    separated.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InterviewQuestion {
    pub key: &'static str,
    pub prompt: &'static str,
}

/// Ordered interview questions for one position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionSet {
    /// Bank key the set was found under; `None` for the generic fallback set.
    pub bank_key: Option<&'static str>,
    pub questions: Vec<InterviewQuestion>,
}

impl QuestionSet {
    pub fn is_default(&self) -> bool {
        self.bank_key.is_none()
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.questions.iter().map(|question| question.key)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// Position-specific question sets keyed by normalized position name.
///
/// The mapping is deliberately partial: HR / recruitment, virtual assistance, account and
/// project management, data entry, and plain customer support have no dedicated set and are
/// interviewed with the default questions.
#[derive(Debug)]
pub struct QuestionBank {
    sets: BTreeMap<&'static str, Vec<InterviewQuestion>>,
    fallback: Vec<InterviewQuestion>,
}

impl QuestionBank {
    pub fn standard() -> Self {
        Self {
            sets: standard_question_sets(),
            fallback: default_questions(),
        }
    }

    /// Look up the set for an already-normalized position.
    pub fn questions_for(&self, normalized: &str) -> QuestionSet {
        match self.sets.get_key_value(normalized) {
            Some((key, questions)) => QuestionSet {
                bank_key: Some(*key),
                questions: questions.clone(),
            },
            None => QuestionSet {
                bank_key: None,
                questions: self.fallback.clone(),
            },
        }
    }

    /// Normalize a raw position and look up its set.
    pub fn questions_for_position(&self, position: &str) -> QuestionSet {
        self.questions_for(&normalize_position(position))
    }

    pub fn mapped_keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.sets.keys().copied()
    }
}

impl Default for QuestionBank {
    fn default() -> Self {
        Self::standard()
    }
}

fn default_questions() -> Vec<InterviewQuestion> {
    vec![
        InterviewQuestion {
            key: "experience",
            prompt: "Tell us about the work experience most relevant to this role.",
        },
        InterviewQuestion {
            key: "availability",
            prompt: "What is your availability (days, shifts, earliest start date)?",
        },
        InterviewQuestion {
            key: "motivation",
            prompt: "Why do you want to join CoreCrew Logistics?",
        },
        InterviewQuestion {
            key: "strengths",
            prompt: "Which strengths would you bring to the team?",
        },
        InterviewQuestion {
            key: "work_authorization",
            prompt: "Are you legally authorized to work in the United States?",
        },
    ]
}

fn standard_question_sets() -> BTreeMap<&'static str, Vec<InterviewQuestion>> {
    let mut sets = BTreeMap::new();

    sets.insert(
        "logistics coordinator dispatcher",
        vec![
            InterviewQuestion {
                key: "dispatch_software",
                prompt: "Which dispatch or TMS software have you used day to day?",
            },
            InterviewQuestion {
                key: "schedule_conflict",
                prompt: "Describe how you resolved a delivery schedule conflict under time pressure.",
            },
            InterviewQuestion {
                key: "driver_communication",
                prompt: "How do you keep drivers and clients informed when a load is delayed?",
            },
            InterviewQuestion {
                key: "kpis",
                prompt: "Which on-time or cost KPIs have you been accountable for?",
            },
            InterviewQuestion {
                key: "multitasking",
                prompt: "How do you prioritize when several urgent dispatch requests arrive at once?",
            },
        ],
    );

    sets.insert(
        "supply chain analyst",
        vec![
            InterviewQuestion {
                key: "analytics_tools",
                prompt: "Which analytics tools (Excel, SQL, Power BI, Python) do you use most?",
            },
            InterviewQuestion {
                key: "inventory_optimization",
                prompt: "Walk us through an inventory optimization you recommended and its result.",
            },
            InterviewQuestion {
                key: "forecasting",
                prompt: "How do you approach demand forecasting for seasonal freight?",
            },
            InterviewQuestion {
                key: "data_story",
                prompt: "How do you present findings to operations staff who are not analysts?",
            },
            InterviewQuestion {
                key: "erp",
                prompt: "Which ERP or WMS platforms have you pulled data from?",
            },
        ],
    );

    sets.insert(
        "customer support client relations",
        vec![
            InterviewQuestion {
                key: "difficult_customer",
                prompt: "Tell us about a difficult client conversation and how you handled it.",
            },
            InterviewQuestion {
                key: "support_tools",
                prompt: "Which ticketing or CRM tools have you worked with?",
            },
            InterviewQuestion {
                key: "escalation",
                prompt: "When do you escalate an issue, and to whom?",
            },
            InterviewQuestion {
                key: "satisfaction",
                prompt: "How do you measure whether a client is satisfied?",
            },
            InterviewQuestion {
                key: "remote_setup",
                prompt: "Describe your remote work setup (connection, quiet space, hours).",
            },
        ],
    );

    sets.insert(
        "it software support",
        vec![
            InterviewQuestion {
                key: "ticketing",
                prompt: "Which help desk or ticketing systems have you supported users through?",
            },
            InterviewQuestion {
                key: "troubleshooting",
                prompt: "Describe your process for troubleshooting a scanner that cannot reach the WMS.",
            },
            InterviewQuestion {
                key: "wms",
                prompt: "Which warehouse or logistics software have you administered?",
            },
            InterviewQuestion {
                key: "security",
                prompt: "How do you handle password resets and access requests securely?",
            },
            InterviewQuestion {
                key: "documentation",
                prompt: "How do you document fixes so the next technician can reuse them?",
            },
        ],
    );

    sets.insert(
        "drivers (truck, delivery, fleet)",
        vec![
            InterviewQuestion {
                key: "license_class",
                prompt: "Which driver's license class and endorsements do you hold?",
            },
            InterviewQuestion {
                key: "driving_record",
                prompt: "Describe your driving record over the last three years.",
            },
            InterviewQuestion {
                key: "routes",
                prompt: "What kinds of routes have you driven (local, regional, long haul)?",
            },
            InterviewQuestion {
                key: "inspection",
                prompt: "Walk us through your pre-trip vehicle inspection.",
            },
            InterviewQuestion {
                key: "hours_of_service",
                prompt: "How do you track hours of service and rest breaks?",
            },
        ],
    );

    sets.insert(
        "warehouse staff forklift operators",
        vec![
            InterviewQuestion {
                key: "forklift_certification",
                prompt: "Do you hold a current forklift certification? Which equipment types?",
            },
            InterviewQuestion {
                key: "warehouse_experience",
                prompt: "Describe your warehouse experience (receiving, pick/pack, shipping).",
            },
            InterviewQuestion {
                key: "lifting",
                prompt: "Are you comfortable lifting up to 50 lbs repeatedly during a shift?",
            },
            InterviewQuestion {
                key: "safety_incident",
                prompt: "Tell us about a time you noticed a safety hazard and what you did.",
            },
            InterviewQuestion {
                key: "shift_preference",
                prompt: "Which shifts can you work (day, swing, night, weekends)?",
            },
        ],
    );

    sets.insert(
        "fleet maintenance supervisors",
        vec![
            InterviewQuestion {
                key: "maintenance_program",
                prompt: "Describe a preventive maintenance program you ran.",
            },
            InterviewQuestion {
                key: "dot_compliance",
                prompt: "How do you keep the fleet compliant with DOT inspection requirements?",
            },
            InterviewQuestion {
                key: "team_leadership",
                prompt: "How many technicians have you supervised, and how did you schedule them?",
            },
            InterviewQuestion {
                key: "downtime",
                prompt: "What steps have you taken to reduce unplanned vehicle downtime?",
            },
            InterviewQuestion {
                key: "budget",
                prompt: "Have you owned a maintenance budget? How did you track spend?",
            },
        ],
    );

    sets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::hiring::catalog::PositionCatalog;

    #[test]
    fn normalize_replaces_separators_and_collapses_whitespace() {
        assert_eq!(
            normalize_position("  Warehouse Staff & Forklift Operators "),
            "warehouse staff forklift operators"
        );
        assert_eq!(
            normalize_position("HR / Recruitment / Talent Acquisition"),
            "hr recruitment talent acquisition"
        );
        assert_eq!(
            normalize_position("Fleet &-/ Maintenance\t\nSupervisors"),
            "fleet maintenance supervisors"
        );
        assert_eq!(normalize_position("   "), "");
    }

    #[test]
    fn normalize_is_idempotent() {
        let samples = [
            "Warehouse Staff & Forklift Operators",
            "Drivers (truck, delivery, fleet)",
            "  IT / Software   Support ",
            "--&&//",
            "Ünïcode Řole - Lead",
            "",
        ];
        for sample in samples {
            let once = normalize_position(sample);
            assert_eq!(normalize_position(&once), once, "sample {sample:?}");
        }
    }

    #[test]
    fn catalog_positions_always_have_questions() {
        let bank = QuestionBank::standard();
        let catalog = PositionCatalog::standard();
        for position in catalog.positions() {
            let first = bank.questions_for_position(position.title);
            let second = bank.questions_for(&normalize_position(position.title));
            assert!(!first.is_empty(), "{} has no questions", position.title);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn every_mapped_key_is_already_normalized() {
        let bank = QuestionBank::standard();
        for key in bank.mapped_keys() {
            assert_eq!(normalize_position(key), key);
        }
    }

    #[test]
    fn unmapped_positions_fall_back_to_default_set() {
        let bank = QuestionBank::standard();
        for position in ["Data Entry", "Project Manager", "Underwater Welder", ""] {
            let set = bank.questions_for_position(position);
            assert!(set.is_default(), "{position} should use defaults");
            assert_eq!(set.len(), 5);
            assert_eq!(set.questions[0].key, "experience");
        }
    }

    #[test]
    fn warehouse_title_maps_to_dedicated_set() {
        let bank = QuestionBank::standard();
        let set = bank.questions_for_position("Warehouse Staff & Forklift Operators");
        assert_eq!(set.bank_key, Some("warehouse staff forklift operators"));
        assert_eq!(
            set.keys().next(),
            Some("forklift_certification"),
            "ordered as configured"
        );
    }

    #[test]
    fn question_keys_are_unique_within_each_set() {
        let bank = QuestionBank::standard();
        let keys: Vec<_> = bank.mapped_keys().collect();
        for key in keys.into_iter().chain(std::iter::once("no such position")) {
            let set = bank.questions_for(key);
            let mut seen: Vec<_> = set.keys().collect();
            seen.sort_unstable();
            seen.dedup();
            assert_eq!(seen.len(), set.len());
        }
    }
}
