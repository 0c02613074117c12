//! Page tuning knobs.
//!
//! Every field has a default, so a page without a `site-config` block (or with
//! only a few overrides in it) still gets the full behavior.

use serde::{Deserialize, Serialize};

use crate::error::SiteError;
use crate::reveal::{RevealOptions, ViewportMargin};

/// `id` of the optional `<script type="application/json">` config block.
pub const CONFIG_ELEMENT_ID: &str = "site-config";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub reveal: RevealConfig,
    pub skills: SkillConfig,
    pub scroll: ScrollConfig,
    pub preloader: PreloaderConfig,
}

impl SiteConfig {
    pub fn from_json(raw: &str) -> Result<Self, SiteError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Parse `raw` if present, falling back to defaults on absence or error.
    pub fn from_optional_json(raw: Option<&str>) -> Self {
        let Some(raw) = raw.filter(|raw| !raw.trim().is_empty()) else {
            return Self::default();
        };
        Self::from_json(raw).unwrap_or_else(|err| {
            tracing::warn!(%err, "ignoring malformed site config");
            Self::default()
        })
    }
}

/// A set of elements revealed together, with a per-index transition delay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevealGroup {
    pub selector: String,
    #[serde(default)]
    pub stagger_ms: u32,
}

impl RevealGroup {
    fn new(selector: &str, stagger_ms: u32) -> Self {
        Self { selector: selector.to_owned(), stagger_ms }
    }

    /// CSS `transition` value for the `index`-th element of the group.
    pub fn transition(&self, index: usize, duration_ms: u32) -> String {
        let delay = self.stagger_ms as f64 * index as f64 / 1000.0;
        let duration = duration_ms as f64 / 1000.0;
        format!("opacity {duration}s ease {delay}s, transform {duration}s ease {delay}s")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    pub threshold: f64,
    pub margin_bottom_px: i32,
    pub offset_px: u32,
    pub duration_ms: u32,
    pub groups: Vec<RevealGroup>,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            threshold: crate::reveal::DEFAULT_VISIBILITY_THRESHOLD,
            margin_bottom_px: crate::reveal::DEFAULT_BOTTOM_MARGIN_PX,
            offset_px: 30,
            duration_ms: 800,
            groups: vec![
                RevealGroup::new("section", 0),
                RevealGroup::new(".project-card", 100),
                RevealGroup::new(".skill-category", 100),
                RevealGroup::new(".timeline-item", 150),
            ],
        }
    }
}

impl RevealConfig {
    pub fn options(&self) -> RevealOptions {
        RevealOptions::default()
            .with_threshold(self.threshold)
            .with_margin(ViewportMargin::bottom(self.margin_bottom_px))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillConfig {
    pub selector: String,
    pub attribute: String,
    pub threshold: f64,
}

impl Default for SkillConfig {
    fn default() -> Self {
        Self {
            selector: ".skill-progress".to_owned(),
            attribute: "data-progress".to_owned(),
            threshold: 0.5,
        }
    }
}

impl SkillConfig {
    pub fn options(&self) -> RevealOptions {
        RevealOptions::default()
            .with_threshold(self.threshold)
            .with_margin(ViewportMargin::ZERO)
            .with_progress_attribute(self.attribute.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    pub throttle_ms: u32,
    pub resize_debounce_ms: u32,
    /// A section counts as current once the page is scrolled to within this
    /// many pixels of its top.
    pub nav_offset_px: f64,
    pub parallax_factor: f64,
    pub parallax_fade_px: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            throttle_ms: 100,
            resize_debounce_ms: 250,
            nav_offset_px: 200.0,
            parallax_factor: 0.3,
            parallax_fade_px: 600.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreloaderConfig {
    pub hold_ms: u32,
    pub fade_ms: u32,
}

impl Default for PreloaderConfig {
    fn default() -> Self {
        Self { hold_ms: 100, fade_ms: 500 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_object_yields_defaults() {
        assert_eq!(SiteConfig::from_json("{}").unwrap(), SiteConfig::default());
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config =
            SiteConfig::from_json(r#"{"scroll":{"throttle_ms":16},"skills":{"threshold":0.25}}"#)
                .unwrap();
        assert_eq!(config.scroll.throttle_ms, 16);
        assert_eq!(config.scroll.nav_offset_px, 200.0);
        assert_eq!(config.skills.threshold, 0.25);
        assert_eq!(config.skills.attribute, "data-progress");
        assert_eq!(config.reveal, RevealConfig::default());
    }

    #[test]
    fn malformed_or_missing_config_falls_back() {
        assert!(SiteConfig::from_json("{not json").is_err());
        assert_eq!(SiteConfig::from_optional_json(Some("{not json")), SiteConfig::default());
        assert_eq!(SiteConfig::from_optional_json(Some("   ")), SiteConfig::default());
        assert_eq!(SiteConfig::from_optional_json(None), SiteConfig::default());
    }

    #[test]
    fn options_carry_thresholds_and_margins() {
        let config = SiteConfig::default();
        let reveal = config.reveal.options();
        assert_eq!(reveal.visibility_threshold, 0.15);
        assert_eq!(reveal.viewport_margin.root_margin(), "0px 0px -50px 0px");

        let skills = config.skills.options();
        assert_eq!(skills.visibility_threshold, 0.5);
        assert_eq!(skills.progress_attribute.as_deref(), Some("data-progress"));
        assert_eq!(skills.viewport_margin, ViewportMargin::ZERO);
    }

    #[test]
    fn group_transition_staggers_by_index() {
        let group = RevealGroup::new(".timeline-item", 150);
        assert_eq!(
            group.transition(2, 800),
            "opacity 0.8s ease 0.3s, transform 0.8s ease 0.3s"
        );
        assert_eq!(
            RevealGroup::new("section", 0).transition(5, 800),
            "opacity 0.8s ease 0s, transform 0.8s ease 0s"
        );
    }
}
