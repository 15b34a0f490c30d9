use crate::schema::{RegulationSection, Scenario};
use crate::utils::tokenize;
use log::debug;
use std::collections::HashSet;

pub const DEFAULT_RETRIEVAL_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSection<'a> {
    pub score: usize,
    pub section: &'a RegulationSection,
}

/// Scores regulatory sections by how many distinct query tokens they share.
pub struct SectionRetriever<'a> {
    sections: &'a [RegulationSection],
    limit: usize,
}

impl<'a> SectionRetriever<'a> {
    pub fn new(sections: &'a [RegulationSection]) -> Self {
        Self {
            sections,
            limit: DEFAULT_RETRIEVAL_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn query_tokens(question: &str, scenario: &Scenario) -> HashSet<String> {
        tokenize(question)
            .into_iter()
            .chain(tokenize(&scenario.to_canonical_json()))
            .collect()
    }

    /// Sections with a non-zero score, best first.
    ///
    /// Equal scores keep their input order; `sort_by` is stable and only the score is
    /// compared.
    pub fn score(&self, question: &str, scenario: &Scenario) -> Vec<ScoredSection<'a>> {
        let query = Self::query_tokens(question, scenario);

        let mut scored: Vec<ScoredSection<'a>> = self
            .sections
            .iter()
            .filter_map(|section| {
                let section_tokens: HashSet<String> = tokenize(&section.text)
                    .into_iter()
                    .chain(tokenize(&section.tags.join(" ")))
                    .collect();
                let score = query.intersection(&section_tokens).count();
                debug!("Section {} scored {}", section.id, score);
                (score > 0).then_some(ScoredSection { score, section })
            })
            .collect();

        scored.sort_by(|a, b| b.score.cmp(&a.score));
        scored
    }

    pub fn retrieve(&self, question: &str, scenario: &Scenario) -> Vec<&'a RegulationSection> {
        self.score(question, scenario)
            .into_iter()
            .take(self.limit)
            .map(|scored| scored.section)
            .collect()
    }
}

pub fn retrieve_sections<'a>(
    question: &str,
    scenario: &Scenario,
    sections: &'a [RegulationSection],
    limit: usize,
) -> Vec<&'a RegulationSection> {
    SectionRetriever::new(sections)
        .with_limit(limit)
        .retrieve(question, scenario)
}
