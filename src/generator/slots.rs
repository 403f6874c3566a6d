//! Template slots and their per-article bindings
//!
//! A slot is a `{name}` placeholder inside a template. For every article the
//! generator resolves each slot once, then substitutes the resolved values into
//! every selected template in a single pass. Replacement text is never scanned
//! again, so a keyword that itself looks like `{reason}` stays verbatim.

use rand::seq::SliceRandom;
use rand::Rng;
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Every placeholder a template may reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    Keyword,
    TrendDirection,
    Timeframe,
    Insight,
    RelatedTopic1,
    RelatedTopic2,
    RelatedQuery1,
    QueryTrend,
    Reason,
    GeoInsight,
    BroaderCategory,
    HumorousReason,
    ConversationalInsight,
    PatternInsight,
    PeakInsight,
    SpecificAspect,
    RegionalReason,
}

impl Slot {
    /// Resolution order. Random slots consume entropy in this order, which is
    /// what makes seeded generation reproducible.
    pub const ALL: [Slot; 17] = [
        Slot::Keyword,
        Slot::TrendDirection,
        Slot::Timeframe,
        Slot::Insight,
        Slot::RelatedTopic1,
        Slot::RelatedTopic2,
        Slot::RelatedQuery1,
        Slot::QueryTrend,
        Slot::Reason,
        Slot::GeoInsight,
        Slot::BroaderCategory,
        Slot::HumorousReason,
        Slot::ConversationalInsight,
        Slot::PatternInsight,
        Slot::PeakInsight,
        Slot::SpecificAspect,
        Slot::RegionalReason,
    ];

    /// Placeholder name as written in templates (without braces)
    pub fn name(&self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::TrendDirection => "trend_direction",
            Self::Timeframe => "timeframe",
            Self::Insight => "insight",
            Self::RelatedTopic1 => "related_topic1",
            Self::RelatedTopic2 => "related_topic2",
            Self::RelatedQuery1 => "related_query1",
            Self::QueryTrend => "query_trend",
            Self::Reason => "reason",
            Self::GeoInsight => "geo_insight",
            Self::BroaderCategory => "broader_category",
            Self::HumorousReason => "humorous_reason",
            Self::ConversationalInsight => "conversational_insight",
            Self::PatternInsight => "pattern_insight",
            Self::PeakInsight => "peak_insight",
            Self::SpecificAspect => "specific_aspect",
            Self::RegionalReason => "regional_reason",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.name() == name)
    }

    /// Candidate phrases for randomly resolved slots; empty for data-driven ones
    pub fn options(&self) -> &'static [&'static str] {
        match self {
            Self::Keyword | Self::RelatedTopic1 | Self::RelatedTopic2 | Self::RelatedQuery1 => &[],
            Self::TrendDirection => &["increasing", "rising", "growing", "surging", "climbing"],
            Self::Timeframe => &["the past week", "recent months", "the last quarter", "this year"],
            Self::Insight => &[
                "there is growing public interest in this area",
                "this topic is becoming increasingly relevant in today's context",
                "more people are seeking information on this subject",
                "this represents a shift in public awareness and curiosity",
            ],
            Self::QueryTrend => &["increased", "grown", "expanded", "risen"],
            Self::Reason => &[
                "recent developments in the field",
                "increased media coverage",
                "growing awareness of its importance",
                "changing consumer preferences",
                "technological advancements",
            ],
            Self::GeoInsight => &[
                "certain regions show notably higher interest",
                "interest varies significantly by location",
                "some areas show disproportionately high engagement",
                "interest is concentrated in specific geographical areas",
            ],
            Self::BroaderCategory => &[
                "this industry",
                "this field",
                "related sectors",
                "the market",
                "consumer behavior",
            ],
            Self::HumorousReason => &[
                "everyone suddenly decided to become an expert overnight",
                "it's the internet's new obsession",
                "we all collectively decided it was worth our attention",
                "it's more entertaining than watching paint dry",
            ],
            Self::ConversationalInsight => &[
                "people are genuinely curious to learn more about it",
                "it touches on something many of us are experiencing right now",
                "it addresses a common challenge or opportunity",
                "it connects to broader changes happening in our society",
            ],
            Self::PatternInsight => &[
                "a growing ecosystem of related interests",
                "shifting priorities among searchers",
                "an evolution in how people think about this topic",
                "emerging connections between previously separate domains",
            ],
            Self::PeakInsight => &[
                "specific events or announcements",
                "seasonal factors",
                "cyclical industry developments",
                "media coverage spikes",
            ],
            Self::SpecificAspect => &[
                "user adoption patterns",
                "market development stages",
                "information-seeking behaviors",
                "public perception shifts",
            ],
            Self::RegionalReason => &[
                "local policies or initiatives",
                "cultural factors",
                "regional economic conditions",
                "community interests",
            ],
        }
    }

    /// Text used when a data-driven slot has no candidate
    pub fn fallback(&self) -> Option<&'static str> {
        match self {
            Self::RelatedTopic1 => Some("related subjects"),
            Self::RelatedTopic2 => Some("similar topics"),
            Self::RelatedQuery1 => Some("common questions"),
            _ => None,
        }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}}}", self.name())
    }
}

/// Matches `{name}` placeholders
pub(crate) fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();

    PLACEHOLDER_RE
        .get_or_init(|| Regex::new(r"\{([A-Za-z0-9_]+)\}").expect("Invalid regex pattern"))
}

/// Placeholder names referenced by a template, in order of appearance
pub fn placeholders(template: &str) -> Vec<&str> {
    placeholder_regex()
        .captures_iter(template)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

/// Resolved value for every slot of one article
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotBindings {
    values: BTreeMap<Slot, String>,
}

impl SlotBindings {
    /// Resolve all slots for `keyword`.
    ///
    /// `topics` and `queries` are the candidate identifiers already extracted
    /// from the relation tables. Random slots pick uniformly from their options.
    pub fn resolve<R: Rng + ?Sized>(
        keyword: &str,
        topics: &[String],
        queries: &[String],
        rng: &mut R,
    ) -> Self {
        let mut values = BTreeMap::new();

        for slot in Slot::ALL {
            let value = match slot {
                Slot::Keyword => keyword.to_string(),
                Slot::RelatedTopic1 => Self::candidate(topics, 0, slot),
                Slot::RelatedTopic2 => Self::candidate(topics, 1, slot),
                Slot::RelatedQuery1 => Self::candidate(queries, 0, slot),
                _ => slot.options().choose(rng).copied().unwrap_or_default().to_string(),
            };
            values.insert(slot, value);
        }

        Self { values }
    }

    fn candidate(candidates: &[String], index: usize, slot: Slot) -> String {
        candidates
            .get(index)
            .cloned()
            .unwrap_or_else(|| slot.fallback().unwrap_or_default().to_string())
    }

    pub fn get(&self, slot: Slot) -> Option<&str> {
        self.values.get(&slot).map(String::as_str)
    }

    /// Replace every bound placeholder in `template` in one left-to-right pass.
    ///
    /// Unknown placeholders are left as literal text.
    pub fn substitute(&self, template: &str) -> String {
        placeholder_regex()
            .replace_all(template, |caps: &Captures<'_>| {
                Slot::from_name(&caps[1])
                    .and_then(|slot| self.get(slot))
                    .map(str::to_string)
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}
