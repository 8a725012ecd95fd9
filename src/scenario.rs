use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Text shown before any scenario has been generated. Evaluation refuses to
/// run while the scenario still contains this marker.
pub const PLACEHOLDER_SCENARIO: &str = "Click generate to get a scenario.";
pub const PLACEHOLDER_MARKER: &str = "Click generate";

/// Local scenarios used when the generation endpoint is unavailable.
pub const FALLBACK_SCENARIOS: &[&str] = &[
    "You’re sharp, but we don’t usually take short-term people.",
    "Your fees are higher than others.",
    "We already handle this internally.",
    "Let me think about it and get back to you.",
];

pub const DEFAULT_FILTER: &str = "Any";
pub const DEFAULT_MODE: &str = "filtered";

/// Context filters sent with every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    pub industry: String,
    pub department: String,
    pub stakeholder: String,
    pub mode: String,
}

impl Default for Meta {
    fn default() -> Self {
        Meta {
            industry: DEFAULT_FILTER.to_string(),
            department: DEFAULT_FILTER.to_string(),
            stakeholder: DEFAULT_FILTER.to_string(),
            mode: DEFAULT_MODE.to_string(),
        }
    }
}

impl Meta {
    /// Build from raw control values; blank or absent values fall back to
    /// `"Any"` (`"filtered"` for mode).
    pub fn from_controls(
        industry: Option<&str>,
        department: Option<&str>,
        stakeholder: Option<&str>,
        mode: Option<&str>,
    ) -> Self {
        Meta {
            industry: or_default(industry, DEFAULT_FILTER),
            department: or_default(department, DEFAULT_FILTER),
            stakeholder: or_default(stakeholder, DEFAULT_FILTER),
            mode: or_default(mode, DEFAULT_MODE),
        }
    }

    /// Set one control by name. Returns false for an unknown key.
    pub fn set(&mut self, key: &str, value: &str) -> bool {
        let slot = match key.to_lowercase().as_str() {
            "industry" => &mut self.industry,
            "department" => &mut self.department,
            "stakeholder" => &mut self.stakeholder,
            "mode" => {
                self.mode = or_default(Some(value), DEFAULT_MODE);
                return true;
            }
            _ => return false,
        };
        *slot = or_default(Some(value), DEFAULT_FILTER);
        true
    }
}

impl std::fmt::Display for Meta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "industry={} department={} stakeholder={} mode={}",
            self.industry, self.department, self.stakeholder, self.mode
        )
    }
}

fn or_default(value: Option<&str>, default: &str) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => default.to_string(),
    }
}

/// True when `text` is something the user could actually answer.
pub fn is_real_scenario(text: Option<&str>) -> bool {
    match text {
        Some(t) => !t.trim().is_empty() && !t.contains(PLACEHOLDER_MARKER),
        None => false,
    }
}

pub fn random_fallback() -> &'static str {
    let mut rng = rand::thread_rng();
    FALLBACK_SCENARIOS
        .choose(&mut rng)
        .copied()
        .unwrap_or(FALLBACK_SCENARIOS[0])
}
