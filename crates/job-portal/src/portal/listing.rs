//! Filtered, paginated views over job postings.
//!
//! [`JobListingQuery`] turns raw request parameters into a [`JobFilter`] and a [`PageWindow`].
//! Stores with a text index can translate the filter natively; [`JobFilter::matches`] is the
//! reference predicate used by stores that evaluate it record by record.

use serde::{Deserialize, Serialize};

use super::domain::{Job, UserId};
use super::error::PortalError;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

/// Raw pagination parameters as they arrive on the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
}

impl PageParams {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: Some(page.to_string()),
            limit: Some(limit.to_string()),
        }
    }
}

/// Validated page request: `page` and `limit` are both at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    page: u32,
    limit: u32,
}

impl Default for PageWindow {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageWindow {
    pub fn new(page: u32, limit: u32) -> Result<Self, PortalError> {
        if page == 0 {
            return Err(PortalError::invalid_input("page must be at least 1"));
        }
        if limit == 0 {
            return Err(PortalError::invalid_input("limit must be at least 1"));
        }
        Ok(Self { page, limit })
    }

    /// First page holding up to `limit` records. A zero limit is raised to one.
    pub const fn first(limit: u32) -> Self {
        Self {
            page: 1,
            limit: if limit == 0 { 1 } else { limit },
        }
    }

    /// A single window large enough to hold every record.
    pub const fn everything() -> Self {
        Self::first(u32::MAX)
    }

    pub fn from_params(params: &PageParams) -> Result<Self, PortalError> {
        let page = parse_positive("page", params.page.as_deref())?.unwrap_or(DEFAULT_PAGE);
        let limit = parse_positive("limit", params.limit.as_deref())?.unwrap_or(DEFAULT_LIMIT);
        Self::new(page, limit)
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn skip(&self) -> usize {
        (self.page as usize - 1).saturating_mul(self.limit as usize)
    }

    /// Cut an already ordered result set down to this window.
    pub fn slice<T>(&self, ordered: Vec<T>) -> Vec<T> {
        ordered
            .into_iter()
            .skip(self.skip())
            .take(self.limit as usize)
            .collect()
    }

    pub fn page_count(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.limit))
    }
}

fn parse_positive(field: &str, raw: Option<&str>) -> Result<Option<u32>, PortalError> {
    let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };

    let value: i64 = raw
        .parse()
        .map_err(|_| PortalError::invalid_input(format!("{field} must be a whole number")))?;
    if value < 1 {
        return Err(PortalError::invalid_input(format!(
            "{field} must be at least 1"
        )));
    }
    u32::try_from(value)
        .map(Some)
        .map_err(|_| PortalError::invalid_input(format!("{field} is too large")))
}

/// One page of records plus totals over the whole filtered set.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub pages: u64,
    pub current_page: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, window: PageWindow) -> Self {
        Self {
            items,
            total,
            pages: window.page_count(total),
            current_page: window.page(),
        }
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<Page<U>, E> {
        let items = self.items.into_iter().map(f).collect::<Result<Vec<_>, E>>()?;
        Ok(Page {
            items,
            total: self.total,
            pages: self.pages,
            current_page: self.current_page,
        })
    }
}

/// Query string accepted by the public job listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobListingQuery {
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub salary: Option<String>,
}

impl JobListingQuery {
    /// Active postings only, with every present filter ANDed together.
    pub fn build(&self) -> Result<(JobFilter, PageWindow), PortalError> {
        let window = PageWindow::from_params(&PageParams {
            page: self.page.clone(),
            limit: self.limit.clone(),
        })?;

        let filter = JobFilter {
            active_only: true,
            created_by: None,
            search: self.search.as_deref().and_then(TextSearch::parse),
            location: needle(self.location.as_deref()),
            company: needle(self.company.as_deref()),
            salary: needle(self.salary.as_deref()),
        };

        Ok((filter, window))
    }
}

fn needle(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_lowercase)
}

/// Predicate over job postings. Substring needles are stored lowercased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobFilter {
    pub active_only: bool,
    pub created_by: Option<UserId>,
    pub search: Option<TextSearch>,
    pub location: Option<String>,
    pub company: Option<String>,
    pub salary: Option<String>,
}

impl JobFilter {
    pub fn active() -> Self {
        Self {
            active_only: true,
            ..Self::default()
        }
    }

    /// Every posting by `owner`, including deactivated ones.
    pub fn created_by(owner: UserId) -> Self {
        Self {
            created_by: Some(owner),
            ..Self::default()
        }
    }

    pub fn matches(&self, job: &Job) -> bool {
        if self.active_only && !job.is_active {
            return false;
        }
        if let Some(owner) = &self.created_by {
            if &job.created_by != owner {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let fields = [
                job.title.as_str(),
                job.description.as_str(),
                job.company.as_str(),
            ];
            if !search.matches(&fields) {
                return false;
            }
        }

        contains_folded(&job.location, self.location.as_deref())
            && contains_folded(&job.company, self.company.as_deref())
            && contains_folded(&job.salary, self.salary.as_deref())
    }
}

fn contains_folded(haystack: &str, needle: Option<&str>) -> bool {
    match needle {
        Some(needle) => haystack.to_lowercase().contains(needle),
        None => true,
    }
}

/// Free-text search with text-index semantics: any term may match a word prefix, quoted phrases
/// must all appear, and `-term` excludes documents containing that exact word.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextSearch {
    terms: Vec<String>,
    phrases: Vec<String>,
    negations: Vec<String>,
}

impl TextSearch {
    /// Returns `None` when the input holds nothing searchable.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut search = Self::default();
        let mut loose = String::new();

        let mut inside_quotes = false;
        for segment in raw.split('"') {
            if inside_quotes {
                let phrase = segment.trim().to_lowercase();
                if !phrase.is_empty() {
                    search.phrases.push(phrase);
                }
            } else {
                loose.push(' ');
                loose.push_str(segment);
            }
            inside_quotes = !inside_quotes;
        }

        for word in loose.split_whitespace() {
            match word.strip_prefix('-') {
                Some(negated) => search.negations.extend(tokenize(negated)),
                None => search.terms.extend(tokenize(word)),
            }
        }

        if search.terms.is_empty() && search.phrases.is_empty() && search.negations.is_empty() {
            None
        } else {
            Some(search)
        }
    }

    pub fn matches(&self, fields: &[&str]) -> bool {
        if self.terms.is_empty() && self.phrases.is_empty() {
            return false;
        }

        let text = fields.join(" ").to_lowercase();
        let tokens = tokenize(&text);

        if self
            .negations
            .iter()
            .any(|negated| tokens.iter().any(|token| token == negated))
        {
            return false;
        }
        if !self.phrases.iter().all(|phrase| text.contains(phrase.as_str())) {
            return false;
        }
        self.terms.is_empty()
            || self
                .terms
                .iter()
                .any(|term| tokens.iter().any(|token| term_matches(term, token)))
    }
}

/// Single characters (e.g. what is left of `c++`) only match a whole token.
fn term_matches(term: &str, token: &str) -> bool {
    if term.chars().count() < 2 {
        token == term
    } else {
        token.starts_with(term)
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portal::domain::JobId;
    use chrono::Utc;

    fn job(title: &str, location: &str, company: &str, salary: &str, active: bool) -> Job {
        let now = Utc::now();
        Job {
            id: JobId::generate(),
            title: title.to_string(),
            description: format!("{title} role working on distributed systems"),
            location: location.to_string(),
            salary: salary.to_string(),
            company: company.to_string(),
            created_by: "owner".into(),
            is_active: active,
            created_at: now,
            updated_at: now,
        }
    }

    fn query() -> JobListingQuery {
        JobListingQuery::default()
    }

    #[test]
    fn defaults_apply_when_parameters_are_absent() {
        let (filter, window) = query().build().expect("defaults are valid");
        assert_eq!(window.page(), 1);
        assert_eq!(window.limit(), 10);
        assert_eq!(filter, JobFilter::active());
    }

    #[test]
    fn rejects_zero_and_negative_pagination() {
        for (page, limit) in [("0", "10"), ("1", "0"), ("-2", "10"), ("abc", "10")] {
            let params = JobListingQuery {
                page: Some(page.to_string()),
                limit: Some(limit.to_string()),
                ..query()
            };
            let err = params.build().expect_err("out of range");
            assert!(matches!(err, PortalError::InvalidInput(_)), "{page}/{limit}");
        }
    }

    #[test]
    fn location_filter_is_case_insensitive_and_skips_inactive() {
        let remote = job("Engineer", "Remote", "Acme", "100k", true);
        let new_york = job("Engineer", "NY", "Acme", "100k", true);
        let closed = job("Engineer", "Remote", "Acme", "100k", false);

        let (filter, _) = JobListingQuery {
            location: Some("rEmOtE".to_string()),
            ..query()
        }
        .build()
        .expect("valid query");

        assert!(filter.matches(&remote));
        assert!(!filter.matches(&new_york));
        assert!(!filter.matches(&closed));
    }

    #[test]
    fn substring_filters_are_anded() {
        let listing = job("Engineer", "Berlin, DE", "Globex GmbH", "EUR 70-80k", true);
        let (filter, _) = JobListingQuery {
            location: Some("berlin".to_string()),
            company: Some("GLOBEX".to_string()),
            salary: Some("70".to_string()),
            ..query()
        }
        .build()
        .expect("valid");
        assert!(filter.matches(&listing));

        let (filter, _) = JobListingQuery {
            location: Some("berlin".to_string()),
            company: Some("initech".to_string()),
            ..query()
        }
        .build()
        .expect("valid");
        assert!(!filter.matches(&listing));
    }

    #[test]
    fn blank_filters_are_ignored() {
        let (filter, _) = JobListingQuery {
            location: Some("   ".to_string()),
            search: Some("  ".to_string()),
            ..query()
        }
        .build()
        .expect("valid");
        assert_eq!(filter, JobFilter::active());
    }

    #[test]
    fn text_search_matches_any_term_over_title_description_company() {
        let search = TextSearch::parse("rust kotlin").expect("terms");
        assert!(search.matches(&["Senior Rust Developer", "", "Acme"]));
        assert!(search.matches(&["Mobile", "Kotlin and Swift", "Acme"]));
        assert!(!search.matches(&["Designer", "Figma", "Acme"]));
    }

    #[test]
    fn text_search_treats_terms_as_word_prefixes() {
        let search = TextSearch::parse("engineer").expect("term");
        assert!(search.matches(&["Platform Engineering Lead", "", ""]));
        assert!(!search.matches(&["Reengineered pipelines", "", ""]));
    }

    #[test]
    fn text_search_supports_phrases_and_negations() {
        let search = TextSearch::parse("\"site reliability\" engineer -intern").expect("parsed");
        assert!(search.matches(&["Site Reliability Engineer", "", "Acme"]));
        assert!(!search.matches(&["Site Reliability Engineer Intern", "", "Acme"]));
        assert!(!search.matches(&["Reliability of site tooling", "engineer", "Acme"]));
    }

    #[test]
    fn negations_exclude_whole_words_only() {
        let search = TextSearch::parse("engineer -intern").expect("parsed");
        assert!(search.matches(&["International Platform Engineer", "", "Acme"]));
        assert!(search.matches(&["Engineer", "Internet scale traffic", "Acme"]));
        assert!(!search.matches(&["Engineer", "summer intern cohort", "Acme"]));
    }

    #[test]
    fn single_character_terms_need_a_whole_word() {
        let search = TextSearch::parse("c++").expect("term");
        assert!(!search.matches(&["Cloud Architect", "", "Contoso"]));
        assert!(search.matches(&["Systems Programmer", "C and C++ codebase", "Acme"]));
    }

    #[test]
    fn negation_only_search_matches_nothing() {
        let search = TextSearch::parse("-manager").expect("negation parsed");
        assert!(!search.matches(&["Engineer", "", ""]));
    }

    #[test]
    fn page_count_rounds_up() {
        let window = PageWindow::new(2, 10).expect("valid");
        assert_eq!(window.skip(), 10);
        assert_eq!(window.page_count(15), 2);
        assert_eq!(window.page_count(0), 0);
        let page = Page::new(vec![1, 2, 3, 4, 5], 15, window);
        assert_eq!(page.pages, 2);
        assert_eq!(page.count(), 5);
        assert_eq!(page.current_page, 2);
    }
}
