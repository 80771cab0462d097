// log classification - applies the pattern catalog to raw deployment logs

use crate::catalog::{Category, PatternCatalog};
use tracing::debug;

/// categories whose patterns matched a log, in catalog order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Findings {
    matches: Vec<(Category, Vec<String>)>,
}

impl Findings {
    /// record a category's matched patterns; categories with no matches are ignored
    pub fn insert(&mut self, category: Category, patterns: Vec<String>) {
        if patterns.is_empty() {
            return;
        }
        match self.matches.iter_mut().find(|(c, _)| *c == category) {
            Some((_, existing)) => existing.extend(patterns),
            None => self.matches.push((category, patterns)),
        }
    }

    pub fn get(&self, category: Category) -> Option<&[String]> {
        self.matches
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, p)| p.as_slice())
    }

    pub fn contains(&self, category: Category) -> bool {
        self.get(category).is_some()
    }

    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.matches.iter().map(|(c, _)| *c)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &[String])> + '_ {
        self.matches.iter().map(|(c, p)| (*c, p.as_slice()))
    }

    /// number of categories found
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// scan log text for every catalog pattern; a pattern counts once however often it occurs
pub fn analyze(log_text: &str, catalog: &PatternCatalog) -> Findings {
    let mut findings = Findings::default();
    if log_text.is_empty() {
        return findings;
    }

    let logs_lower = log_text.to_lowercase();

    for category in catalog.categories() {
        let matched: Vec<String> = catalog
            .patterns_for(category)
            .iter()
            .filter(|pattern| pattern.is_match(&logs_lower))
            .map(|pattern| pattern.as_str().to_string())
            .collect();

        if !matched.is_empty() {
            debug!(category = %category, matched = matched.len(), "log matched category");
            findings.insert(category, matched);
        }
    }

    findings
}
