//! The locate pipeline: parse → extract → scope → score → sort → synthesize.

use pinpoint_config::PinpointConfig;
use pinpoint_core::{ContainerClause, LocateError, Query, RankedResult};
use pinpoint_dom::{extract, scope_records, Document};
use pinpoint_intent::{QueryParser, VerbTable};
use pinpoint_scoring::Scorer;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::ranking::{self, Ranked};

/// Per-request options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocateOptions {
    /// Container phrase used when the query names none itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_hint: Option<String>,
    /// Number of top candidates to synthesize locators for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

/// Immutable, shareable locate engine.
#[derive(Debug, Clone)]
pub struct Engine {
    parser: QueryParser,
    scorer: Scorer,
    min_confidence: u32,
    display_limit: usize,
    max_document_bytes: usize,
}

impl Engine {
    pub fn new(config: &PinpointConfig) -> Self {
        let verbs = VerbTable::new(&config.enabled_locales(), &config.extra_verbs());
        debug!(verbs = verbs.len(), "Engine verb table loaded");
        Self {
            parser: QueryParser::new(verbs),
            scorer: Scorer::from_config(config),
            min_confidence: config.min_confidence(),
            display_limit: config.display_limit(),
            max_document_bytes: config.max_document_bytes(),
        }
    }

    pub fn min_confidence(&self) -> u32 {
        self.min_confidence
    }

    pub fn max_document_bytes(&self) -> usize {
        self.max_document_bytes
    }

    pub fn parse_query(&self, raw: &str) -> Query {
        self.parser.parse(raw)
    }

    /// Parse `html` and locate `query` in it.
    pub fn locate_html(&self, html: &str, query: &str, options: &LocateOptions) -> Result<RankedResult, LocateError> {
        let doc = self.load(html)?;
        Ok(self.locate(&doc, query, options))
    }

    /// Parse a document, enforcing the configured size limit.
    pub fn load(&self, html: &str) -> Result<Document, LocateError> {
        if html.len() > self.max_document_bytes {
            return Err(LocateError::DocumentTooLarge {
                size: html.len(),
                limit: self.max_document_bytes,
            });
        }
        Document::parse(html)
    }

    pub fn locate(&self, doc: &Document, query: &str, options: &LocateOptions) -> RankedResult {
        let query = self.parse_query(query);
        self.locate_query(doc, &query, options)
    }

    pub fn locate_query(&self, doc: &Document, query: &Query, options: &LocateOptions) -> RankedResult {
        if let Some(selector) = query.literal() {
            return ranking::literal(doc, selector);
        }

        let query = with_container_hint(query, options.container_hint.as_deref());
        let mut records = extract(doc);
        let mut container_fallback = false;
        if let Some(clause) = &query.container {
            let scoped = scope_records(records, clause);
            container_fallback = scoped.fell_back;
            records = scoped.records;
        }

        let ctx = self.scorer.context(&query, doc);
        let mut ranked: Vec<Ranked> = records
            .iter()
            .map(|record| Ranked::new(record, self.scorer.score(&ctx, record)))
            .collect();
        ranking::sort(&mut ranked);

        // The top candidate always gets locators so it can be reported as best.
        let limit = options.limit.unwrap_or(self.display_limit).max(1);
        for entry in ranked.iter_mut().take(limit) {
            entry.synthesize(doc);
        }

        let best = ranked
            .first()
            .filter(|top| top.candidate.score > self.min_confidence)
            .map(|top| top.candidate.clone());

        info!(
            intent = %query.intent,
            total_candidates = ranked.len(),
            best_score = best.as_ref().map(|b| b.score),
            container_fallback,
            "Ranked candidates"
        );

        RankedResult {
            best,
            total_candidates: ranked.len(),
            candidates: ranked.into_iter().map(|r| r.candidate).collect(),
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(&PinpointConfig::default())
    }
}

/// The query's own container clause wins over a caller-supplied hint.
fn with_container_hint(query: &Query, hint: Option<&str>) -> Query {
    let mut query = query.clone();
    if query.container.is_none() {
        if let Some(phrase) = hint.map(str::trim).filter(|h| !h.is_empty()) {
            query.container = Some(ContainerClause {
                phrase: phrase.to_string(),
                kind: None,
            });
        }
    }
    query
}
