//! Landing judgement once the rocket has settled.
//!
//! The segment history is split into three buckets by contact name:
//!
//! | Bucket       | Rule                          |
//! |--------------|-------------------------------|
//! | landing pad  | `name == landing_pad_name`    |
//! | launch pad   | `name == launch_pad_name`     |
//! | other        | anything else                 |
//!
//! Victory requires a landing-pad contact carrying the goal tag and nothing
//! else.  Every other combination is a defeat, categorised by
//! [`OutcomeEvaluator::defeat_category`] (first match wins):
//!
//! | # | Condition                                   | Category |
//! |---|---------------------------------------------|----------|
//! | 1 | overspeed + launch pad                      | A        |
//! | 2 | overspeed + landing pad                     | B        |
//! | 3 | overspeed + other                           | C        |
//! | 4 | landing pad only, without goal tag          | D        |
//! | 5 | launch pad only                             | E        |
//! | 6 | either pad together with other objects      | F        |
//! | 7 | anything else                               | G        |
//!
//! Buckets are sets of flags, so the verdict never depends on the order the
//! contacts arrived in.

use super::impact::CrashCategory;
use crate::config::FlightConfig;
use bevy::prelude::*;
use std::collections::BTreeMap;

/// Category of a settled-but-failed landing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefeatCategory {
    OverspeedOnLaunchPad,
    OverspeedOnLandingPad,
    OverspeedOnObstacle,
    MissedGoal,
    NeverLeftLaunchPad,
    MixedContacts,
    Unclassified,
}

impl DefeatCategory {
    /// Opaque category letter (A–G).
    pub fn letter(self) -> char {
        match self {
            DefeatCategory::OverspeedOnLaunchPad => 'A',
            DefeatCategory::OverspeedOnLandingPad => 'B',
            DefeatCategory::OverspeedOnObstacle => 'C',
            DefeatCategory::MissedGoal => 'D',
            DefeatCategory::NeverLeftLaunchPad => 'E',
            DefeatCategory::MixedContacts => 'F',
            DefeatCategory::Unclassified => 'G',
        }
    }

    /// Two-digit commentary code shared with the failure-comment file.
    pub fn code(self) -> &'static str {
        match self {
            DefeatCategory::OverspeedOnLaunchPad => "03",
            DefeatCategory::OverspeedOnLandingPad => "04",
            DefeatCategory::OverspeedOnObstacle => "05",
            DefeatCategory::MissedGoal => "02",
            DefeatCategory::NeverLeftLaunchPad => "01",
            DefeatCategory::MixedContacts => "06",
            DefeatCategory::Unclassified => "00",
        }
    }
}

/// Terminal result of one flight segment, published to presentation.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightOutcome {
    Victory,
    Defeat(DefeatCategory),
    Crash(CrashCategory),
}

impl FlightOutcome {
    #[inline]
    pub fn is_victory(self) -> bool {
        matches!(self, FlightOutcome::Victory)
    }

    /// Commentary code; `None` for victory.
    pub fn failure_code(self) -> Option<&'static str> {
        match self {
            FlightOutcome::Victory => None,
            FlightOutcome::Defeat(category) => Some(category.code()),
            FlightOutcome::Crash(category) => Some(category.code()),
        }
    }
}

/// What the segment history contained, reduced to the flags the rules use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContactSummary {
    pub landing_pad: bool,
    pub goal_on_landing_pad: bool,
    pub launch_pad: bool,
    pub other: bool,
}

/// Turns a settled segment into a victory or a categorised defeat.
#[derive(Debug, Clone)]
pub struct OutcomeEvaluator {
    max_safe_speed: f32,
    landing_pad_name: String,
    launch_pad_name: String,
    goal_tag: String,
}

impl OutcomeEvaluator {
    pub fn new(config: &FlightConfig) -> Self {
        Self {
            max_safe_speed: config.max_safe_speed,
            landing_pad_name: config.landing_pad_name.clone(),
            launch_pad_name: config.launch_pad_name.clone(),
            goal_tag: config.goal_tag.clone(),
        }
    }

    pub fn summarize(&self, history: &BTreeMap<String, String>) -> ContactSummary {
        let mut summary = ContactSummary::default();
        for (name, tag) in history {
            if *name == self.landing_pad_name {
                summary.landing_pad = true;
                if *tag == self.goal_tag {
                    summary.goal_on_landing_pad = true;
                }
            } else if *name == self.launch_pad_name {
                summary.launch_pad = true;
            } else {
                summary.other = true;
            }
        }
        summary
    }

    /// Judge the segment.  `last_speed` is the most recent speed sample.
    pub fn evaluate(&self, history: &BTreeMap<String, String>, last_speed: f32) -> FlightOutcome {
        let summary = self.summarize(history);
        if summary.landing_pad && summary.goal_on_landing_pad && !summary.launch_pad && !summary.other
        {
            info!("[outcome] VICTORY: clean landing on the goal pad");
            return FlightOutcome::Victory;
        }
        let excessive_speed = last_speed > self.max_safe_speed;
        let category = Self::defeat_category(&summary, excessive_speed);
        info!(
            "[outcome] DEFEAT {} ({:?}) from {:?}, last speed {:.2}",
            category.letter(),
            category,
            summary,
            last_speed
        );
        FlightOutcome::Defeat(category)
    }

    pub fn defeat_category(summary: &ContactSummary, excessive_speed: bool) -> DefeatCategory {
        let ContactSummary {
            landing_pad,
            goal_on_landing_pad,
            launch_pad,
            other,
        } = *summary;

        if excessive_speed && launch_pad {
            DefeatCategory::OverspeedOnLaunchPad
        } else if excessive_speed && landing_pad {
            DefeatCategory::OverspeedOnLandingPad
        } else if excessive_speed && other {
            DefeatCategory::OverspeedOnObstacle
        } else if landing_pad && !goal_on_landing_pad && !launch_pad && !other {
            DefeatCategory::MissedGoal
        } else if launch_pad && !landing_pad && !other {
            DefeatCategory::NeverLeftLaunchPad
        } else if (landing_pad || launch_pad) && other {
            DefeatCategory::MixedContacts
        } else {
            DefeatCategory::Unclassified
        }
    }
}
