//! Response analyzers and their pool
//!
//! An [`Analyzer`] runs a set of caller-supplied [`ParseResponse`] functions
//! over a downloaded [`Response`]. Each function may yield new requests,
//! finished items, and errors; the analyzer merges them.

use std::sync::Arc;

use crate::middleware::{Entity, IdGenerator, Pool, PoolResult};
use crate::models::{CrawlerError, Data, Response};

/// Rule applied to a response. Yields discovered data and any errors.
pub type ParseResponse = Arc<dyn Fn(&Response) -> (Vec<Data>, Vec<CrawlerError>) + Send + Sync>;

/// Turns responses into requests and items
pub trait Analyzer: Entity + Send + Sync {
    fn analyze(&self, parsers: &[ParseResponse], response: &Response) -> (Vec<Data>, Vec<CrawlerError>);
}

/// Pool of boxed analyzers
pub type AnalyzerPool = Pool<Box<dyn Analyzer>>;

/// Build a pool of `total` [`GenericAnalyzer`]s
pub fn generic_analyzer_pool(total: u32, ids: &dyn IdGenerator) -> PoolResult<AnalyzerPool> {
    Pool::new(total, ids, |id| Box::new(GenericAnalyzer::new(id)) as Box<dyn Analyzer>)
}

/// Default analyzer
///
/// - rejects responses with no parsers or an invalid status
/// - runs every parser, even after earlier ones reported errors
/// - drops invalid outputs
/// - stamps discovered requests with `response.depth + 1`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenericAnalyzer {
    id: u32,
}

impl GenericAnalyzer {
    pub fn new(id: u32) -> Self {
        Self { id }
    }
}

impl Entity for GenericAnalyzer {
    fn id(&self) -> u32 {
        self.id
    }
}

impl Analyzer for GenericAnalyzer {
    fn analyze(&self, parsers: &[ParseResponse], response: &Response) -> (Vec<Data>, Vec<CrawlerError>) {
        if parsers.is_empty() {
            return (Vec::new(), vec![CrawlerError::analyzer("no response parsers given")]);
        }
        if !response.is_valid() {
            return (
                Vec::new(),
                vec![CrawlerError::analyzer(format!(
                    "invalid response status {} for {}",
                    response.status, response.url
                ))],
            );
        }

        let mut data = Vec::new();
        let mut errors = Vec::new();

        for parse in parsers {
            let (found, failed) = parse(response);
            errors.extend(failed);

            for entry in found {
                let entry = match entry {
                    Data::Request(mut request) => {
                        request.depth = response.depth.saturating_add(1);
                        Data::Request(request)
                    }
                    item => item,
                };

                if entry.is_valid() {
                    data.push(entry);
                } else {
                    tracing::debug!(analyzer = self.id, url = %response.url, "Dropping invalid parser output");
                }
            }
        }

        tracing::debug!(
            analyzer = self.id,
            url = %response.url,
            data = data.len(),
            errors = errors.len(),
            "Response analyzed"
        );

        (data, errors)
    }
}
