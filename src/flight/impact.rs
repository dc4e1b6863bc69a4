//! Crash-or-touchdown decision for a new contact.

use crate::config::FlightConfig;
use bevy::prelude::*;

/// Why a contact destroyed the rocket.  First match wins, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrashCategory {
    /// Hit the launch pad too fast.
    LaunchPad,
    /// Hit the landing pad too fast.
    LandingPad,
    /// Hit terrain too fast.
    Terrain,
    /// Hit anything else too fast.
    Unclassified,
}

impl CrashCategory {
    /// Opaque category letter (A–D).
    pub fn letter(self) -> char {
        match self {
            CrashCategory::LaunchPad => 'A',
            CrashCategory::LandingPad => 'B',
            CrashCategory::Terrain => 'C',
            CrashCategory::Unclassified => 'D',
        }
    }

    /// Two-digit commentary code shared with the failure-comment file.
    pub fn code(self) -> &'static str {
        match self {
            CrashCategory::LaunchPad => "03",
            CrashCategory::LandingPad => "04",
            CrashCategory::Terrain => "05",
            CrashCategory::Unclassified => "00",
        }
    }
}

/// Verdict on a single new contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Impact {
    /// Slow enough to count as touching down.
    Touchdown,
    /// Too fast; the rocket explodes with this impact speed.
    Crash {
        category: CrashCategory,
        impact_speed: f32,
    },
}

/// Classifies new contacts against the safe-landing speed.
#[derive(Debug, Clone)]
pub struct ImpactClassifier {
    max_safe_speed: f32,
    launch_pad_name: String,
    landing_pad_name: String,
    terrain_tag: String,
}

impl ImpactClassifier {
    pub fn new(config: &FlightConfig) -> Self {
        Self {
            max_safe_speed: config.max_safe_speed,
            launch_pad_name: config.launch_pad_name.clone(),
            landing_pad_name: config.landing_pad_name.clone(),
            terrain_tag: config.terrain_tag.clone(),
        }
    }

    /// Crash iff `relative_speed` exceeds the safe speed; equality is a touchdown.
    pub fn classify(&self, name: &str, tag: &str, relative_speed: f32) -> Impact {
        if relative_speed > self.max_safe_speed {
            let category = self.crash_category(name, tag);
            info!(
                "[impact] CRASH into {} ({}) at {:.2} u/s > {:.2}",
                name, tag, relative_speed, self.max_safe_speed
            );
            Impact::Crash {
                category,
                impact_speed: relative_speed,
            }
        } else {
            Impact::Touchdown
        }
    }

    /// Reason code for an overspeed contact.
    pub fn crash_category(&self, name: &str, tag: &str) -> CrashCategory {
        if name == self.launch_pad_name {
            CrashCategory::LaunchPad
        } else if name == self.landing_pad_name {
            CrashCategory::LandingPad
        } else if tag == self.terrain_tag {
            CrashCategory::Terrain
        } else {
            CrashCategory::Unclassified
        }
    }

    #[inline]
    pub fn max_safe_speed(&self) -> f32 {
        self.max_safe_speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> ImpactClassifier {
        ImpactClassifier::new(&FlightConfig::default())
    }

    #[test]
    fn slow_contact_is_touchdown() {
        let c = classifier();
        assert_eq!(c.classify("LandingPad", "Finish", 2.0), Impact::Touchdown);
        assert_eq!(c.classify("Rock", "Untagged", 5.0), Impact::Touchdown);
    }

    #[test]
    fn terrain_overspeed_is_category_c() {
        let c = classifier();
        match c.classify("Hill", "Terrain", 8.0) {
            Impact::Crash {
                category,
                impact_speed,
            } => {
                assert_eq!(category, CrashCategory::Terrain);
                assert_eq!(category.letter(), 'C');
                assert_eq!(impact_speed, 8.0);
            }
            other => panic!("expected crash, got {other:?}"),
        }
    }

    #[test]
    fn pad_names_take_priority_over_terrain_tag() {
        let c = classifier();
        assert_eq!(
            c.crash_category("LaunchingPad", "Terrain"),
            CrashCategory::LaunchPad
        );
        assert_eq!(
            c.crash_category("LandingPad", "Terrain"),
            CrashCategory::LandingPad
        );
        assert_eq!(c.crash_category("Tree", "Foliage"), CrashCategory::Unclassified);
    }

    #[test]
    fn codes_match_commentary_file() {
        assert_eq!(CrashCategory::LaunchPad.code(), "03");
        assert_eq!(CrashCategory::LandingPad.code(), "04");
        assert_eq!(CrashCategory::Terrain.code(), "05");
        assert_eq!(CrashCategory::Unclassified.code(), "00");
    }
}
