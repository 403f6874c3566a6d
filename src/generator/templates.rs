//! Template catalog: intro, body and conclusion pools for every tone
//!
//! Catalogs are validated when they are built. Every tone must have at least
//! one template per section and every placeholder must name a known [`Slot`],
//! so a catalog that exists can always produce a fully resolved article.

use serde::Deserialize;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use super::slots::{placeholders, Slot};
use super::tone::Tone;
use super::{GeneratorError, GeneratorResult};

/// Part of an article a template belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Intro,
    Body,
    Conclusion,
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Intro => write!(f, "intro"),
            Self::Body => write!(f, "body"),
            Self::Conclusion => write!(f, "conclusion"),
        }
    }
}

/// Template pools for one tone
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TemplateSet {
    pub intro: Vec<String>,
    pub body: Vec<String>,
    pub conclusion: Vec<String>,
}

impl TemplateSet {
    fn from_static(intro: &[&str], body: &[&str], conclusion: &[&str]) -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            intro: owned(intro),
            body: owned(body),
            conclusion: owned(conclusion),
        }
    }

    pub fn section(&self, section: Section) -> &[String] {
        match section {
            Section::Intro => &self.intro,
            Section::Body => &self.body,
            Section::Conclusion => &self.conclusion,
        }
    }

    fn validate(&self, tone: Tone) -> GeneratorResult<()> {
        for section in [Section::Intro, Section::Body, Section::Conclusion] {
            let templates = self.section(section);
            if templates.is_empty() {
                return Err(GeneratorError::EmptySection { tone, section });
            }

            for template in templates {
                if let Some(unknown) = placeholders(template)
                    .into_iter()
                    .find(|name| Slot::from_name(name).is_none())
                {
                    return Err(GeneratorError::UnknownPlaceholder {
                        tone,
                        section,
                        placeholder: unknown.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// On-disk catalog layout. Tones left out inherit the built-in pools.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    informative: Option<TemplateSet>,
    analytical: Option<TemplateSet>,
    persuasive: Option<TemplateSet>,
    entertaining: Option<TemplateSet>,
    conversational: Option<TemplateSet>,
}

/// Read-only template pools for all tones
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateCatalog {
    /// Indexed by `Tone::index`
    sets: [TemplateSet; 5],
}

impl TemplateCatalog {
    /// Built-in catalog, shared by every generator that does not bring its own
    pub fn builtin() -> Arc<Self> {
        static BUILTIN: OnceLock<Arc<TemplateCatalog>> = OnceLock::new();

        Arc::clone(BUILTIN.get_or_init(|| Arc::new(builtin_catalog())))
    }

    /// Build a catalog from one set per tone, in [`Tone::ALL`] order
    pub fn from_sets(sets: [TemplateSet; 5]) -> GeneratorResult<Self> {
        let catalog = Self { sets };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parse a TOML catalog (`[informative]`, `[analytical]`, ... tables)
    pub fn from_toml_str(content: &str) -> GeneratorResult<Self> {
        let file: CatalogFile = toml::from_str(content)?;
        let builtin = Self::builtin();
        let pick = |custom: Option<TemplateSet>, tone: Tone| {
            custom.unwrap_or_else(|| builtin.get(tone).clone())
        };

        Self::from_sets([
            pick(file.informative, Tone::Informative),
            pick(file.analytical, Tone::Analytical),
            pick(file.persuasive, Tone::Persuasive),
            pick(file.entertaining, Tone::Entertaining),
            pick(file.conversational, Tone::Conversational),
        ])
    }

    /// Load a TOML catalog from disk
    pub fn from_file(path: &Path) -> GeneratorResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| GeneratorError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_toml_str(&content)?;
        tracing::info!(path = %path.display(), "Loaded custom template catalog");
        Ok(catalog)
    }

    /// Template pools for `tone`
    pub fn get(&self, tone: Tone) -> &TemplateSet {
        &self.sets[tone.index()]
    }

    /// Check every tone for empty sections and unknown placeholders
    pub fn validate(&self) -> GeneratorResult<()> {
        for tone in Tone::ALL {
            self.get(tone).validate(tone)?;
        }
        Ok(())
    }
}

fn builtin_catalog() -> TemplateCatalog {
    TemplateCatalog {
        sets: [
            TemplateSet::from_static(
                &[
                    "Recent data from Google Trends reveals a significant increase in interest for {keyword}. Let's explore what's driving this trend and why it matters.",
                    "Google Trends has highlighted {keyword} as a topic of growing interest. In this article, we'll analyze the data and provide insights on this trend.",
                    "{keyword} has been gaining traction according to recent Google Trends data. We'll break down what this means and why it's important to be aware of this trend.",
                ],
                &[
                    "The data shows that interest in {keyword} has been {trend_direction} over {timeframe}. This suggests that {insight}.",
                    "When examining related topics such as {related_topic1} and {related_topic2}, we can see a correlation with the interest in {keyword}.",
                    "It's worth noting that searches for {related_query1} have also {query_trend}, indicating a broader interest in this subject area.",
                    "Industry experts suggest that the {trend_direction} interest in {keyword} could be attributed to {reason}.",
                    "The geographical distribution of interest shows that {geo_insight}, which may reflect regional differences in adoption or awareness.",
                ],
                &[
                    "As interest in {keyword} continues to evolve, staying informed about these trends can provide valuable insights for researchers, businesses, and consumers alike.",
                    "Monitoring these trends in {keyword} will be crucial for understanding future developments in this area and their potential impact.",
                    "Whether you're a professional in the field or simply curious about {keyword}, these trends offer a glimpse into the collective interests and priorities of online users.",
                ],
            ),
            TemplateSet::from_static(
                &[
                    "This analytical examination of Google Trends data reveals compelling patterns regarding {keyword}. The following analysis breaks down the key metrics and their implications.",
                    "An in-depth analysis of {keyword} based on Google Trends data demonstrates noteworthy patterns that warrant closer examination. Let's explore the numbers and their significance.",
                    "The quantitative assessment of {keyword} through Google Trends reveals statistically significant trends. This analysis will decompose the data to extract actionable insights.",
                ],
                &[
                    "Examining the trend coefficient for {keyword}, we observe a {trend_direction} with a notable correlation to {related_topic1}. This statistical relationship suggests {insight}.",
                    "When performing comparative analysis between {keyword} and adjacent search terms like {related_query1}, we detect a pattern that indicates {pattern_insight}.",
                    "The temporal distribution of search interest demonstrates cyclical patterns with peaks occurring around {peak_insight}. This periodicity may be attributed to {reason}.",
                    "Regional variance analysis shows a standard deviation of interest across different geographical areas, with particular concentration in {geo_insight}.",
                    "Correlation coefficients between {keyword} and {related_topic2} suggest a causal relationship that merits further investigation, particularly regarding {specific_aspect}.",
                ],
                &[
                    "The data-driven insights regarding {keyword} point to several strategic implications that stakeholders should consider when formulating long-term strategies.",
                    "This analytical framework for understanding {keyword} trends provides a foundation for predictive modeling and anticipatory planning in related domains.",
                    "Continued quantitative monitoring of these metrics will be essential for maintaining an accurate understanding of how interest in {keyword} evolves over time.",
                ],
            ),
            TemplateSet::from_static(
                &[
                    "The dramatic rise in interest for {keyword} revealed by Google Trends cannot be ignored. This shift represents a crucial opportunity that forward-thinking individuals and organizations must embrace.",
                    "Google Trends has uncovered a compelling story about {keyword} that demands attention. The data clearly shows why this topic should be at the forefront of your consideration.",
                    "If you're not paying attention to {keyword}, you're missing out on a significant trend. Google's search data reveals why this topic deserves your immediate focus.",
                ],
                &[
                    "The evidence is clear: interest in {keyword} has {trend_direction} by a remarkable margin. This isn't just a temporary blip\u{2014}it's a fundamental shift that will reshape how we think about {broader_category}.",
                    "Consider how {related_topic1} connects with {keyword}. This relationship highlights an unmistakable pattern that savvy observers are already leveraging to their advantage.",
                    "When people search for {related_query1}, they're expressing a genuine need. The {query_trend} in these searches demonstrates the growing importance of addressing this topic.",
                    "Leaders in this space are already capitalizing on the growing interest in {keyword}. Those who hesitate to acknowledge this trend risk being left behind as the landscape evolves.",
                    "The regional data is particularly telling\u{2014}{geo_insight} shows that this isn't just a localized phenomenon but a widespread movement gaining momentum across diverse areas.",
                ],
                &[
                    "The time to act on these {keyword} trends is now. As interest continues to grow, early adopters will secure the advantages that come with foresight and decisive action.",
                    "Don't allow your competitors to monopolize the opportunities presented by the rising interest in {keyword}. Use these insights to position yourself at the forefront of this important development.",
                    "The Google Trends data makes a compelling case: {keyword} represents not just a passing interest but a significant shift that will continue to influence preferences and behaviors moving forward.",
                ],
            ),
            TemplateSet::from_static(
                &[
                    "Well, well, well... looks like {keyword} is having quite the moment in the spotlight! Google Trends has caught this rising star, and we're here for the gossip.",
                    "Hold onto your search bars, folks! {keyword} is trending faster than celebrity scandals. Let's dive into this Google Trends phenomenon with a smile.",
                    "In today's episode of 'What's Breaking the Internet?' we have {keyword} stealing the show. Google Trends has the receipts, and we've got the story.",
                ],
                &[
                    "The trend line for {keyword} is going {trend_direction} faster than my motivation on a Monday morning. This sudden fame might be because {humorous_reason}.",
                    "People are also searching for {related_query1}, which is like the quirky sidekick to our main character {keyword}. They go together like awkward small talk and elevator rides.",
                    "Interestingly, {related_topic1} is riding on the coattails of {keyword}'s newfound popularity. It's the classic 'I knew them before they were famous' situation.",
                    "The geographical data shows that folks in {geo_insight} are particularly obsessed. Perhaps they have less exciting things to Google? No judgment here!",
                    "If {keyword} were a celebrity, its publicist would be popping champagne right now. Its rise to fame has been more dramatic than the plot twists in my favorite binge-worthy shows.",
                ],
                &[
                    "Whether {keyword} is having its fifteen minutes of fame or settling in for a long-term relationship with the limelight, one thing's certain: it's more popular than my attempts at home haircuts during quarantine.",
                    "So there you have it\u{2014}{keyword} is trending, and now you're in the loop. Feel free to casually drop this knowledge at your next social gathering to appear both informed and effortlessly cool.",
                    "Will {keyword} continue its reign of search supremacy, or will it join the ranks of forgotten trends like planking and fidget spinners? Only time (and Google Trends) will tell!",
                ],
            ),
            TemplateSet::from_static(
                &[
                    "Have you noticed how {keyword} seems to be everywhere these days? It's not just you\u{2014}Google Trends confirms this topic is gaining serious traction. Let's chat about what's going on.",
                    "So, I was looking at Google Trends the other day and couldn't help but notice that {keyword} is really taking off. I thought we might explore why that is and what it means for us.",
                    "Hey there! Wondering why everyone's suddenly talking about {keyword}? Google's search data shows there's a real surge of interest, and I think it's worth unpacking together.",
                ],
                &[
                    "You know how trends come and go, right? Well, with {keyword}, we're seeing something interesting\u{2014}interest has been {trend_direction} steadily. My take is that {conversational_insight}.",
                    "What's really caught my attention is how {related_topic1} ties into all this. It's like when you start thinking about one thing, and it naturally leads you to another connected idea.",
                    "People are also asking about {related_query1} a lot more. Does that surprise you? I find it makes sense because when you're exploring {keyword}, that question naturally comes up.",
                    "Between you and me, I think the reason we're seeing this trend might be {reason}. What do you think? Does that resonate with your experience?",
                    "It's fascinating to see that people in {geo_insight} are particularly interested in this topic. I wonder if that's because of {regional_reason} or if it's just coincidence.",
                ],
                &[
                    "At the end of the day, whether {keyword} is just having a moment or becoming a lasting part of our conversations, it's always interesting to see what captures our collective attention, isn't it?",
                    "So what do you make of all this? Is {keyword} something that matters in your world, or is it just another trending topic that will fade away? I'd love to hear your thoughts!",
                    "As we keep an eye on how interest in {keyword} develops, I think it's worth considering how these trends reflect our changing priorities and interests as a society. Just some food for thought!",
                ],
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = TemplateCatalog::builtin();
        assert!(catalog.validate().is_ok());
    }

    #[test]
    fn test_builtin_pool_sizes() {
        let catalog = TemplateCatalog::builtin();
        for tone in Tone::ALL {
            let set = catalog.get(tone);
            assert_eq!(set.intro.len(), 3, "{tone} intro");
            assert_eq!(set.body.len(), 5, "{tone} body");
            assert_eq!(set.conclusion.len(), 3, "{tone} conclusion");
        }
    }

    #[test]
    fn test_builtin_is_shared() {
        let a = TemplateCatalog::builtin();
        let b = TemplateCatalog::builtin();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_unknown_placeholder_rejected() {
        let toml = r#"
            [analytical]
            intro = ["About {keyword}"]
            body = ["{keyword} has {made_up_slot}"]
            conclusion = ["Done."]
        "#;

        match TemplateCatalog::from_toml_str(toml) {
            Err(GeneratorError::UnknownPlaceholder {
                tone,
                section,
                placeholder,
            }) => {
                assert_eq!(tone, Tone::Analytical);
                assert_eq!(section, Section::Body);
                assert_eq!(placeholder, "made_up_slot");
            }
            other => panic!("expected UnknownPlaceholder, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_section_rejected() {
        let toml = r#"
            [persuasive]
            intro = ["Look at {keyword}"]
            body = []
            conclusion = ["Act now."]
        "#;

        assert!(matches!(
            TemplateCatalog::from_toml_str(toml),
            Err(GeneratorError::EmptySection {
                tone: Tone::Persuasive,
                section: Section::Body
            })
        ));
    }

    #[test]
    fn test_partial_file_inherits_builtin() {
        let toml = r#"
            [entertaining]
            intro = ["Guess who's back: {keyword}!"]
            body = ["{keyword} is {trend_direction}."]
            conclusion = ["Stay tuned."]
        "#;

        let catalog = TemplateCatalog::from_toml_str(toml).unwrap();
        let builtin = TemplateCatalog::builtin();

        assert_eq!(catalog.get(Tone::Entertaining).body.len(), 1);
        assert_eq!(catalog.get(Tone::Informative), builtin.get(Tone::Informative));
    }

    #[test]
    fn test_unknown_tone_table_rejected() {
        let toml = r#"
            [sarcastic]
            intro = ["Oh great, {keyword}."]
            body = ["Wow."]
            conclusion = ["Sure."]
        "#;
        assert!(matches!(
            TemplateCatalog::from_toml_str(toml),
            Err(GeneratorError::InvalidCatalog(_))
        ));
    }

    #[test]
    fn test_from_file_missing() {
        let result = TemplateCatalog::from_file(Path::new("/nonexistent/templates.toml"));
        assert!(matches!(result, Err(GeneratorError::Io { .. })));
    }
}
