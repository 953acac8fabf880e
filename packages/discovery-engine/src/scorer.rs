use serde::{Deserialize, Serialize};

/// Target-domain relevance profile, deserialized from the injected seed
/// resource. Tiered indicator terms plus country/language bonuses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelevanceProfile {
    /// Strong domain markers, +3.0 each.
    pub high_value: Vec<String>,
    /// Supporting markers (places, languages), +2.0 each.
    pub medium_value: Vec<String>,
    /// Cultural and slang markers, +1.5 each.
    pub cultural: Vec<String>,
    /// Exact declared-country match, +5.0.
    pub target_country: String,
    /// Declared language in this set, +1.0.
    pub accepted_languages: Vec<String>,
    /// Channels scoring below this are dropped, never persisted.
    pub threshold: f64,
}

impl RelevanceProfile {
    /// Score a channel's textual attributes against the profile.
    ///
    /// Presence-only semantics: each indicator contributes at most once no
    /// matter how often it occurs across the concatenated fields.
    /// Deterministic and side-effect free.
    pub fn score(
        &self,
        title: &str,
        description: &str,
        keywords: &[String],
        country: Option<&str>,
        language: Option<&str>,
    ) -> f64 {
        let combined = format!(
            "{} {} {} {}",
            title,
            description,
            keywords.join(" "),
            country.unwrap_or("")
        )
        .to_lowercase();

        let mut score = 0.0;

        for indicator in &self.high_value {
            if combined.contains(&indicator.to_lowercase()) {
                score += 3.0;
            }
        }
        for indicator in &self.medium_value {
            if combined.contains(&indicator.to_lowercase()) {
                score += 2.0;
            }
        }
        for indicator in &self.cultural {
            if combined.contains(&indicator.to_lowercase()) {
                score += 1.5;
            }
        }

        if country
            .map(|c| c.eq_ignore_ascii_case(&self.target_country))
            .unwrap_or(false)
        {
            score += 5.0;
        }

        if let Some(lang) = language {
            if self
                .accepted_languages
                .iter()
                .any(|accepted| accepted.eq_ignore_ascii_case(lang))
            {
                score += 1.0;
            }
        }

        score
    }
}

#[cfg(test)]
impl RelevanceProfile {
    pub fn test_profile() -> Self {
        Self {
            high_value: vec![
                "sri lanka".to_string(),
                "srilanka".to_string(),
                "ceylon".to_string(),
            ],
            medium_value: vec![
                "colombo".to_string(),
                "kandy".to_string(),
                "sinhala".to_string(),
                "tamil".to_string(),
            ],
            cultural: vec!["machang".to_string(), "aiya".to_string()],
            target_country: "LK".to_string(),
            accepted_languages: vec!["si".to_string(), "ta".to_string()],
            threshold: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_term_plus_country_bonus() {
        // "Sri Lanka Daily News" carries one high-value term; country LK
        // adds the flat bonus: 3.0 + 5.0.
        let profile = RelevanceProfile::test_profile();
        let score = profile.score("Sri Lanka Daily News", "", &[], Some("LK"), None);
        assert_eq!(score, 8.0);
    }

    #[test]
    fn presence_counts_once_across_fields() {
        let profile = RelevanceProfile::test_profile();
        let once = profile.score("Sri Lanka", "", &[], None, None);
        let repeated = profile.score(
            "Sri Lanka Sri Lanka",
            "all about sri lanka",
            &["sri lanka".to_string()],
            None,
            None,
        );
        assert_eq!(once, repeated);
    }

    #[test]
    fn score_is_monotone_in_distinct_indicators() {
        let profile = RelevanceProfile::test_profile();
        let base = profile.score("Colombo street food", "", &[], None, None);
        let more = profile.score("Colombo street food in Sri Lanka", "", &[], None, None);
        assert!(more > base);

        // Adding a distinct high-value term never lowers the score.
        let even_more = profile.score(
            "Colombo street food in Sri Lanka",
            "filmed across ceylon",
            &[],
            None,
            None,
        );
        assert!(even_more > more);
    }

    #[test]
    fn tier_values_accumulate() {
        let profile = RelevanceProfile::test_profile();
        // one high (3.0) + one medium (2.0) + one cultural (1.5)
        let score = profile.score("Ceylon kandy machang", "", &[], None, None);
        assert_eq!(score, 6.5);
    }

    #[test]
    fn language_bonus_applies_for_accepted_set() {
        let profile = RelevanceProfile::test_profile();
        let without = profile.score("Ceylon", "", &[], None, None);
        let with = profile.score("Ceylon", "", &[], None, Some("si"));
        assert_eq!(with - without, 1.0);

        let other = profile.score("Ceylon", "", &[], None, Some("en"));
        assert_eq!(other, without);
    }

    #[test]
    fn keywords_and_country_text_participate_in_matching() {
        let profile = RelevanceProfile::test_profile();
        let score = profile.score("", "", &["sinhala cooking".to_string()], None, None);
        assert_eq!(score, 2.0);
    }

    #[test]
    fn empty_channel_scores_zero() {
        let profile = RelevanceProfile::test_profile();
        assert_eq!(profile.score("", "", &[], None, None), 0.0);
    }
}
