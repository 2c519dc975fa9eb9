// ── Interface classification ──
//
// Decides from its raw name whether an interface is a physical or
// operator-relevant port, and which category it belongs to. Matching is
// case-insensitive substring matching against data tables; the exclude
// table always wins over the allow table.

use serde::{Deserialize, Serialize};

/// Substrings marking an interface as non-physical. Checked first.
pub const EXCLUDE_PATTERNS: &[&str] = &[
    "status",
    "null",
    "button",
    "mgmt",
    "management",
    "loopback",
    "tunnel",
    "bridge",
    "virtual",
    "dummy",
    "bluetooth",
    "unrouted",
    "appgigabit",
    "stacksub",
];

/// Substrings marking an interface as physical, once nothing excluded it.
pub const ALLOW_PATTERNS: &[&str] = &[
    "vlan",
    "ethernet",
    "gigabit",
    "tengigabit",
    "fastethernet",
    "port-channel",
    "stack",
    "serial",
];

/// Category rules in priority order. The first rule with a matching
/// substring decides the category.
pub const CATEGORY_RULES: &[(&[&str], InterfaceCategory)] = &[
    (&["vlan"], InterfaceCategory::Vlan),
    (
        &["ethernet", "gigabit", "tengigabit"],
        InterfaceCategory::Ethernet,
    ),
    (&["port-channel"], InterfaceCategory::PortChannel),
    (&["stack"], InterfaceCategory::Stack),
];

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum InterfaceCategory {
    Ethernet,
    Vlan,
    PortChannel,
    Stack,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub category: InterfaceCategory,
    pub is_physical: bool,
}

impl Classification {
    const EXCLUDED: Self = Self {
        category: InterfaceCategory::Other,
        is_physical: false,
    };
}

/// Pattern tables driving the classifier.
///
/// [`Vocabulary::default`] holds the built-in tables. New vendor naming
/// schemes are supported by extending a vocabulary, not by touching
/// [`classify_with`].
#[derive(Debug, Clone)]
pub struct Vocabulary {
    exclude: Vec<String>,
    allow: Vec<String>,
    categories: Vec<(Vec<String>, InterfaceCategory)>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        let owned = |patterns: &[&str]| patterns.iter().map(|p| (*p).to_owned()).collect();
        Self {
            exclude: owned(EXCLUDE_PATTERNS),
            allow: owned(ALLOW_PATTERNS),
            categories: CATEGORY_RULES
                .iter()
                .map(|(patterns, category)| (owned(patterns), *category))
                .collect(),
        }
    }
}

impl Vocabulary {
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude.push(pattern.into().to_lowercase());
        self
    }

    pub fn allow(mut self, pattern: impl Into<String>) -> Self {
        self.allow.push(pattern.into().to_lowercase());
        self
    }

    /// Append a category rule after the built-in ones. A physical name
    /// that matches no rule still falls back to `Other`.
    pub fn categorize(mut self, pattern: impl Into<String>, category: InterfaceCategory) -> Self {
        self.categories
            .push((vec![pattern.into().to_lowercase()], category));
        self
    }

    fn category_of(&self, lowered: &str) -> InterfaceCategory {
        self.categories
            .iter()
            .find(|(patterns, _)| contains_any(lowered, patterns))
            .map_or(InterfaceCategory::Other, |(_, category)| *category)
    }
}

fn contains_any<S: AsRef<str>>(haystack: &str, patterns: &[S]) -> bool {
    patterns.iter().any(|p| haystack.contains(p.as_ref()))
}

/// Classify with the built-in vocabulary.
pub fn classify(name: &str) -> Classification {
    classify_with(&Vocabulary::default(), name)
}

/// Classify an interface name. Total: every string gets an answer.
///
/// A name matching an exclude pattern is never physical, whatever else
/// it contains (`AppGigabitEthernet1/0/1` is excluded). Non-physical
/// names always get category `Other`.
pub fn classify_with(vocabulary: &Vocabulary, name: &str) -> Classification {
    let lowered = name.to_lowercase();

    if contains_any(&lowered, &vocabulary.exclude) || !contains_any(&lowered, &vocabulary.allow) {
        return Classification::EXCLUDED;
    }

    Classification {
        category: vocabulary.category_of(&lowered),
        is_physical: true,
    }
}

/// Compact label for dense port grids.
///
/// Driven by the category rules alone, without the exclusion phase, so a
/// label exists even for ports the classifier hides (`AppGigabitEthernet1/0/5`
/// → `5`). VLANs show their number (`Vlan100` → `100`), Ethernet ports
/// their last path segment (`Gi1/0/24` → `24`), port-channels their
/// number, and anything else its first two characters.
pub fn short_identifier(name: &str) -> String {
    match Vocabulary::default().category_of(&name.to_lowercase()) {
        InterfaceCategory::Vlan => first_digit_run(name).unwrap_or("V").to_owned(),
        InterfaceCategory::Ethernet => name.rsplit('/').next().unwrap_or(name).to_owned(),
        InterfaceCategory::PortChannel => first_digit_run(name).unwrap_or("PC").to_owned(),
        InterfaceCategory::Stack | InterfaceCategory::Other => name.chars().take(2).collect(),
    }
}

fn first_digit_run(s: &str) -> Option<&str> {
    let start = s.find(|c: char| c.is_ascii_digit())?;
    let rest = &s[start..];
    let len = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    Some(&rest[..len])
}
