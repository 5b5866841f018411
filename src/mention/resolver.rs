//! Suggestion resolvers supplied by the host application.
//!
//! A resolver maps a search string to ranked candidates for one mention
//! kind. The composer never calls resolvers directly: it emits
//! `Cmd::ResolveSuggestions` and the runtime hands the request to a
//! [`SuggestionWorker`], which answers with `Msg::SuggestionsResolved`.
//! Failures degrade to an empty list.

use std::collections::HashMap;
use std::path::Path;
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::messages::Msg;

use super::kind::MentionKind;
use super::suggestions::{Candidate, ResolveRequest};

/// Error type for suggestion resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// No resolver registered for the kind
    NoResolver(MentionKind),
    /// Backing directory could not be read
    Io(String),
    /// Backing directory could not be parsed
    Parse(String),
    /// The resolver itself failed
    Failed(String),
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveError::NoResolver(kind) => write!(f, "No resolver for kind: {}", kind),
            ResolveError::Io(e) => write!(f, "IO error: {}", e),
            ResolveError::Parse(e) => write!(f, "Parse error: {}", e),
            ResolveError::Failed(e) => write!(f, "Resolver failed: {}", e),
        }
    }
}

impl std::error::Error for ResolveError {}

/// Resolves a search string to ranked candidates
pub trait SuggestionResolver: Send + Sync {
    fn resolve(&self, query: &str) -> Result<Vec<Candidate>, ResolveError>;
}

impl<F> SuggestionResolver for F
where
    F: Fn(&str) -> Result<Vec<Candidate>, ResolveError> + Send + Sync,
{
    fn resolve(&self, query: &str) -> Result<Vec<Candidate>, ResolveError> {
        self(query)
    }
}

/// In-memory directory of candidates.
///
/// Ranking is case-insensitive: label prefix matches first, then label or
/// id substring matches, each group in directory order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryResolver {
    entries: Vec<Candidate>,
}

impl DirectoryResolver {
    pub fn new(entries: Vec<Candidate>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[Candidate] {
        &self.entries
    }

    fn rank(&self, query: &str) -> Vec<Candidate> {
        let query = query.to_lowercase();
        if query.is_empty() {
            return self.entries.clone();
        }

        let (prefix, rest): (Vec<&Candidate>, Vec<&Candidate>) = self
            .entries
            .iter()
            .filter(|c| {
                c.label.to_lowercase().contains(&query) || c.id.to_lowercase().contains(&query)
            })
            .partition(|c| c.label.to_lowercase().starts_with(&query));

        prefix.into_iter().chain(rest).cloned().collect()
    }
}

impl SuggestionResolver for DirectoryResolver {
    fn resolve(&self, query: &str) -> Result<Vec<Candidate>, ResolveError> {
        Ok(self.rank(query))
    }
}

/// Memoizes results of a wrapped resolver per query.
///
/// Errors are not cached.
pub struct CachedResolver<R> {
    inner: R,
    cache: Mutex<HashMap<String, Vec<Candidate>>>,
}

impl<R: SuggestionResolver> CachedResolver<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn cached_len(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }
}

impl<R: SuggestionResolver> SuggestionResolver for CachedResolver<R> {
    fn resolve(&self, query: &str) -> Result<Vec<Candidate>, ResolveError> {
        if let Ok(cache) = self.cache.lock() {
            if let Some(hit) = cache.get(query) {
                return Ok(hit.clone());
            }
        }

        let result = self.inner.resolve(query)?;
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(query.to_string(), result.clone());
        }
        Ok(result)
    }
}

/// One resolver per mention kind
#[derive(Clone, Default)]
pub struct ResolverRegistry {
    resolvers: HashMap<MentionKind, Arc<dyn SuggestionResolver>>,
}

impl ResolverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<R: SuggestionResolver + 'static>(&mut self, kind: MentionKind, resolver: R) {
        self.resolvers.insert(kind, Arc::new(resolver));
    }

    pub fn with<R: SuggestionResolver + 'static>(mut self, kind: MentionKind, resolver: R) -> Self {
        self.register(kind, resolver);
        self
    }

    pub fn contains(&self, kind: MentionKind) -> bool {
        self.resolvers.contains_key(&kind)
    }

    pub fn try_resolve(&self, kind: MentionKind, query: &str) -> Result<Vec<Candidate>, ResolveError> {
        let resolver = self
            .resolvers
            .get(&kind)
            .ok_or(ResolveError::NoResolver(kind))?;
        resolver.resolve(query)
    }

    /// Resolve, turning any failure into an empty list
    pub fn resolve(&self, kind: MentionKind, query: &str) -> Vec<Candidate> {
        match self.try_resolve(kind, query) {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!(%kind, query, "suggestion resolver failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Build cached directory resolvers from YAML (or JSON) of the form
    /// `{ user: [{id, label}], version: [...] }`
    pub fn from_directory_str(content: &str) -> Result<Self, ResolveError> {
        let directory: HashMap<MentionKind, Vec<Candidate>> =
            serde_yaml::from_str(content).map_err(|e| ResolveError::Parse(e.to_string()))?;
        let mut registry = Self::new();
        for (kind, entries) in directory {
            registry.register(kind, CachedResolver::new(DirectoryResolver::new(entries)));
        }
        Ok(registry)
    }

    pub fn load_directory(path: &Path) -> Result<Self, ResolveError> {
        let content = std::fs::read_to_string(path).map_err(|e| ResolveError::Io(e.to_string()))?;
        Self::from_directory_str(&content)
    }
}

impl std::fmt::Debug for ResolverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<&MentionKind> = self.resolvers.keys().collect();
        kinds.sort_by_key(|k| k.as_str());
        f.debug_struct("ResolverRegistry")
            .field("kinds", &kinds)
            .finish()
    }
}

/// Background thread executing resolve requests in arrival order
pub struct SuggestionWorker {
    request_tx: Option<Sender<ResolveRequest>>,
    handle: Option<JoinHandle<()>>,
}

impl SuggestionWorker {
    /// Spawn the worker; results are posted to `msg_tx`
    pub fn spawn(registry: ResolverRegistry, msg_tx: Sender<Msg>) -> Self {
        let (request_tx, request_rx) = mpsc::channel::<ResolveRequest>();
        let handle = std::thread::spawn(move || {
            while let Ok(request) = request_rx.recv() {
                let candidates = registry.resolve(request.kind, &request.ticket.query);
                tracing::trace!(
                    seq = request.ticket.seq,
                    count = candidates.len(),
                    "suggestions resolved"
                );
                let msg = Msg::SuggestionsResolved {
                    ticket: request.ticket,
                    candidates,
                };
                if msg_tx.send(msg).is_err() {
                    break;
                }
            }
        });
        Self {
            request_tx: Some(request_tx),
            handle: Some(handle),
        }
    }

    /// Queue a request. Never blocks.
    pub fn submit(&self, request: ResolveRequest) {
        if let Some(tx) = &self.request_tx {
            if tx.send(request).is_err() {
                tracing::warn!("suggestion worker has stopped");
            }
        }
    }
}

impl Drop for SuggestionWorker {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop
        self.request_tx.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mention::{ResolveTicket, SessionKey};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn directory() -> DirectoryResolver {
        DirectoryResolver::new(vec![
            Candidate::new("u2", "Martina"),
            Candidate::new("u1", "Tim"),
            Candidate::new("u3", "Timothy"),
        ])
    }

    #[test]
    fn test_directory_prefix_before_substring() {
        let ids: Vec<String> = directory()
            .resolve("TI")
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["u1", "u3", "u2"]);
    }

    #[test]
    fn test_directory_empty_query_returns_all() {
        assert_eq!(directory().resolve("").unwrap().len(), 3);
        assert!(directory().resolve("zzz").unwrap().is_empty());
    }

    #[test]
    fn test_directory_matches_ids() {
        let hits = directory().resolve("u3").unwrap();
        assert_eq!(hits, vec![Candidate::new("u3", "Timothy")]);
    }

    #[test]
    fn test_cached_resolver_memoizes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let cached = CachedResolver::new(move |q: &str| -> Result<Vec<Candidate>, ResolveError> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(vec![Candidate::new(q, q)])
        });

        cached.resolve("ti").unwrap();
        cached.resolve("ti").unwrap();
        cached.resolve("tim").unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cached.cached_len(), 2);
    }

    #[test]
    fn test_cached_resolver_does_not_cache_errors() {
        let cached = CachedResolver::new(|_: &str| -> Result<Vec<Candidate>, ResolveError> {
            Err(ResolveError::Failed("offline".to_string()))
        });
        assert!(cached.resolve("x").is_err());
        assert_eq!(cached.cached_len(), 0);
    }

    #[test]
    fn test_registry_failure_is_empty_list() {
        let registry = ResolverRegistry::new()
            .with(MentionKind::Task, |_: &str| -> Result<Vec<Candidate>, ResolveError> {
                Err(ResolveError::Failed("boom".to_string()))
            });
        assert!(registry.resolve(MentionKind::Task, "x").is_empty());
        assert!(registry.resolve(MentionKind::User, "x").is_empty());
        assert_eq!(
            registry.try_resolve(MentionKind::User, "x"),
            Err(ResolveError::NoResolver(MentionKind::User))
        );
    }

    #[test]
    fn test_registry_from_directory_yaml() {
        let yaml = "user:\n  - id: u1\n    label: Tim\nversion:\n  - id: v1\n    label: v003\n    detail: shot010\n";
        let registry = ResolverRegistry::from_directory_str(yaml).unwrap();
        assert!(registry.contains(MentionKind::User));
        let versions = registry.resolve(MentionKind::Version, "v0");
        assert_eq!(versions[0].detail.as_deref(), Some("shot010"));
        assert!(matches!(
            ResolverRegistry::from_directory_str("bogus: [1"),
            Err(ResolveError::Parse(_))
        ));
    }

    #[test]
    fn test_worker_posts_results() {
        let (tx, rx) = mpsc::channel();
        let registry = ResolverRegistry::new().with(MentionKind::User, directory());
        let worker = SuggestionWorker::spawn(registry, tx);

        let ticket = ResolveTicket {
            session: SessionKey {
                trigger: "@".to_string(),
                anchor: 1,
                generation: 1,
            },
            seq: 1,
            query: "tim".to_string(),
        };
        worker.submit(ResolveRequest {
            ticket: ticket.clone(),
            kind: MentionKind::User,
        });

        match rx.recv_timeout(Duration::from_secs(5)) {
            Ok(Msg::SuggestionsResolved {
                ticket: got,
                candidates,
            }) => {
                assert_eq!(got, ticket);
                assert_eq!(candidates.len(), 2);
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }
}
