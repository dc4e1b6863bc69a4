//! Failure commentary shown under the defeat / crash headline.
//!
//! File format, one comment per line:
//!
//! ```text
//! # lines starting with '#' and blank lines are skipped
//! 01_1 "You never left the pad."
//! 01_2 "The launch pad says hi."
//! 00_1 "Something went wrong."
//! ```
//!
//! The first two characters of the key are the category code (see
//! [`crate::flight::FlightOutcome::failure_code`]); the text between the first
//! and last double quote is the comment.

use crate::config::FlightConfig;
use crate::constants::{DEFAULT_FAILURE_CODE, DEFAULT_FAILURE_COMMENT};
use bevy::prelude::*;
use rand::Rng;
use std::collections::BTreeMap;

#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct FailureComments {
    by_code: BTreeMap<String, Vec<String>>,
}

impl FailureComments {
    pub fn parse(text: &str) -> Self {
        let mut by_code: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for line in text.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') || !line.contains(" \"") {
                continue;
            }
            let Some((key, _)) = line.split_once(' ') else {
                continue;
            };
            let Some(code) = key.get(..2) else {
                continue;
            };
            let (Some(start), Some(end)) = (line.find('"'), line.rfind('"')) else {
                continue;
            };
            if end <= start {
                continue;
            }
            by_code
                .entry(code.to_string())
                .or_default()
                .push(line[start + 1..end].to_string());
        }
        Self { by_code }
    }

    /// Number of distinct category codes with at least one entry.
    pub fn category_count(&self) -> usize {
        self.by_code.len()
    }

    pub fn comments_for(&self, code: &str) -> &[String] {
        self.by_code.get(code).map(Vec::as_slice).unwrap_or(&[])
    }

    /// A random comment for `code`.  Unknown codes fall back to `"00"`; an
    /// empty fallback yields the fixed default line.
    pub fn pick(&self, code: &str, rng: &mut impl Rng) -> &str {
        let list = match self.by_code.get(code) {
            Some(list) => list,
            None => match self.by_code.get(DEFAULT_FAILURE_CODE) {
                Some(list) => list,
                None => return DEFAULT_FAILURE_COMMENT,
            },
        };
        if list.is_empty() {
            return DEFAULT_FAILURE_COMMENT;
        }
        &list[rng.gen_range(0..list.len())]
    }
}

/// Startup system: read the commentary file named in [`FlightConfig`].
/// A missing file leaves the table empty, so every pick yields the default.
pub fn load_failure_comments(config: Res<FlightConfig>, mut comments: ResMut<FailureComments>) {
    let path = &config.failure_comments_path;
    match std::fs::read_to_string(path) {
        Ok(text) => {
            *comments = FailureComments::parse(&text);
            println!(
                "✓ Loaded {} failure comment categories from {path}",
                comments.category_count()
            );
        }
        Err(e) => {
            eprintln!("⚠ Could not read {path} ({e}); failures will show \"{DEFAULT_FAILURE_COMMENT}\"");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const SAMPLE: &str = r#"
# commentary
01_1 "You never left the pad."
01_2 "Fuel is for flying."

03_1 "Not on the launch pad!"
00_1 "Something went wrong."
broken line without quotes
04_1 no quotes here
"#;

    #[test]
    fn parses_codes_and_skips_noise() {
        let c = FailureComments::parse(SAMPLE);
        assert_eq!(c.category_count(), 3);
        assert_eq!(c.comments_for("01").len(), 2);
        assert_eq!(c.comments_for("03"), ["Not on the launch pad!".to_string()]);
        assert!(c.comments_for("04").is_empty());
    }

    #[test]
    fn pick_stays_within_category() {
        let c = FailureComments::parse(SAMPLE);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..20 {
            let picked = c.pick("01", &mut rng);
            assert!(c.comments_for("01").iter().any(|s| s == picked));
        }
    }

    #[test]
    fn unknown_code_falls_back_to_default_category() {
        let c = FailureComments::parse(SAMPLE);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        assert_eq!(c.pick("06", &mut rng), "Something went wrong.");
    }

    #[test]
    fn empty_table_yields_fixed_line() {
        let c = FailureComments::default();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        assert_eq!(c.pick("02", &mut rng), "Mission Failed.");
    }

    #[test]
    fn quotes_inside_comment_are_kept() {
        let c = FailureComments::parse(r#"05_1 "The "ground" was closer than it looked""#);
        assert_eq!(
            c.comments_for("05"),
            [r#"The "ground" was closer than it looked"#.to_string()]
        );
    }
}
