use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull, NoneAsEmptyString};

/// One author entry from the enrichment source, typed at the ingestion boundary.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalAuthorRecord {
    pub name: String,
    /// Stable identifier in the enrichment source. Empty strings and nulls are
    /// read as absent.
    #[serde_as(as = "DefaultOnNull<NoneAsEmptyString>")]
    #[serde(default, alias = "authorId", alias = "author_id")]
    pub external_id: Option<String>,
}

impl ExternalAuthorRecord {
    pub fn new(name: impl Into<String>, external_id: Option<&str>) -> Self {
        Self {
            name: name.into(),
            external_id: external_id
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string),
        }
    }
}

/// A raw primary-source name string at one position of one paper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mention {
    pub paper_id: String,
    /// 1-based, source order.
    pub position: usize,
    pub raw: String,
}

/// Paper-level statistics the aggregation stages need.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperStats {
    #[serde(default, alias = "citationCount")]
    pub citation_count: Option<u64>,
    #[serde(default, alias = "influentialCitationCount")]
    pub influential_citation_count: Option<u64>,
    #[serde(default)]
    pub year: Option<i32>,
}

/// One row of the paper-keyed input relation.
///
/// `primary_authors` and `enrichment_authors` are optional because the
/// upstream relation may lack either list; such rows are reported as
/// malformed by the authorship builder rather than treated as empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperRecord {
    pub paper_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub primary_authors: Option<Vec<String>>,
    #[serde(default)]
    pub enrichment_authors: Option<Vec<ExternalAuthorRecord>>,
    #[serde(flatten)]
    pub stats: PaperStats,
}

impl PaperRecord {
    pub fn new(
        paper_id: impl Into<String>,
        title: impl Into<String>,
        primary_authors: Vec<String>,
        enrichment_authors: Vec<ExternalAuthorRecord>,
    ) -> Self {
        Self {
            paper_id: paper_id.into(),
            title: title.into(),
            primary_authors: Some(primary_authors),
            enrichment_authors: Some(enrichment_authors),
            stats: PaperStats::default(),
        }
    }

    pub fn with_stats(mut self, citation_count: Option<u64>, year: Option<i32>) -> Self {
        self.stats.citation_count = citation_count;
        self.stats.year = year;
        self
    }

    pub fn with_influential_citations(mut self, count: Option<u64>) -> Self {
        self.stats.influential_citation_count = count;
        self
    }

    /// Mentions in source order, positions starting at 1.
    pub fn mentions(&self) -> Vec<Mention> {
        self.primary_authors
            .iter()
            .flatten()
            .enumerate()
            .map(|(idx, raw)| Mention {
                paper_id: self.paper_id.clone(),
                position: idx + 1,
                raw: raw.clone(),
            })
            .collect()
    }
}
