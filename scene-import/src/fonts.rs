//! Font resolution and preload cache.
//!
//! Before any text node of a root is built, every font the root references
//! is resolved to something the host can load (the font itself, a
//! substitute from [`FALLBACKS`], or the default font) and loaded. Loads are
//! claimed per font before they are awaited, so concurrently imported roots
//! share one load call per font. The cache is owned by the importer and
//! outlives individual import calls.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{join_all, BoxFuture, FutureExt, Shared};
use scene_core::{tags, CanvasHost, FontName, SceneRecord};

use crate::report::{ImportIssue, IssueKind};

type SharedLoad = Shared<BoxFuture<'static, bool>>;

/// One row of the fallback table.
#[derive(Debug, Clone, Copy)]
pub struct Fallback {
    /// Family the row applies to, compared ignoring ASCII case.
    pub family: &'static str,
    /// Style the row applies to; `None` matches any style.
    pub style: Option<&'static str>,
    /// Substitute family.
    pub substitute_family: &'static str,
    /// Substitute style; `None` keeps the requested style.
    pub substitute_style: Option<&'static str>,
}

const fn row(
    family: &'static str,
    style: Option<&'static str>,
    substitute_family: &'static str,
    substitute_style: Option<&'static str>,
) -> Fallback {
    Fallback {
        family,
        style,
        substitute_family,
        substitute_style,
    }
}

/// Substitutes for fonts commonly missing on the host.
///
/// Exact (family, style) rows are consulted before family-only rows.
pub const FALLBACKS: &[Fallback] = &[
    row("SF Pro Display", Some("Semibold"), "Inter", Some("SemiBold")),
    row("SF Pro Text", Some("Semibold"), "Inter", Some("SemiBold")),
    row("Inter", Some("Semi Bold"), "Inter", Some("SemiBold")),
    row("Inter", Some("Extra Bold"), "Inter", Some("ExtraBold")),
    row("Roboto", Some("SemiBold"), "Roboto", Some("Medium")),
    row("Helvetica Neue", Some("Light"), "Inter", Some("Light")),
    row("SF Pro Display", None, "Inter", None),
    row("SF Pro Text", None, "Inter", None),
    row("SF Pro", None, "Inter", None),
    row("San Francisco", None, "Inter", None),
    row("Helvetica Neue", None, "Inter", None),
    row("Helvetica", None, "Inter", None),
    row("Arial", None, "Roboto", None),
    row("Segoe UI", None, "Roboto", None),
    row("Open Sans", None, "Roboto", None),
];

/// Substitute for a font the host does not have.
///
/// Exact rows win over family-only rows; with no row, `default`.
#[must_use]
pub fn fallback_for(font: &FontName, default: &FontName) -> FontName {
    let family_matches = |f: &&Fallback| f.family.eq_ignore_ascii_case(&font.family);

    let exact = FALLBACKS.iter().filter(family_matches).find(|f| {
        f.style
            .is_some_and(|style| style.eq_ignore_ascii_case(&font.style))
    });
    let family_only = || {
        FALLBACKS
            .iter()
            .filter(family_matches)
            .find(|f| f.style.is_none())
    };

    match exact.or_else(family_only) {
        Some(f) => FontName::new(
            f.substitute_family,
            f.substitute_style.unwrap_or(font.style.as_str()),
        ),
        None => default.clone(),
    }
}

/// Fallback for `font`, or `default` when the fallback is not on the host.
async fn choose_substitute(
    host: &Arc<dyn CanvasHost>,
    font: &FontName,
    default: &FontName,
) -> FontName {
    let substitute = fallback_for(font, default);
    if substitute == *default {
        return substitute;
    }
    match host.font_available(&substitute).await {
        Ok(true) => substitute,
        Ok(false) | Err(_) => default.clone(),
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Loads answered by an existing claim.
    pub hits: u64,
    /// Loads that issued a host call.
    pub misses: u64,
    /// Fonts the host could not provide.
    pub substitutions: u64,
}

#[derive(Default)]
struct CacheState {
    loads: HashMap<FontName, SharedLoad>,
    /// Requested font to the font actually chosen for it.
    resolutions: HashMap<FontName, FontName>,
    stats: CacheStats,
}

/// Process-wide font cache, shared by every import of one importer.
#[derive(Default)]
pub struct FontCache {
    state: Mutex<CacheState>,
}

impl std::fmt::Debug for FontCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("FontCache")
            .field("claimed", &state.loads.len())
            .field("resolutions", &state.resolutions)
            .field("stats", &state.stats)
            .finish()
    }
}

impl FontCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current statistics.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.lock().stats
    }

    /// Whether `font` was loaded successfully.
    #[must_use]
    pub fn is_loaded(&self, font: &FontName) -> bool {
        self.lock()
            .loads
            .get(font)
            .and_then(|load| load.peek().copied())
            .unwrap_or(false)
    }

    /// Font chosen for `requested`, if it has been resolved.
    #[must_use]
    pub fn resolution(&self, requested: &FontName) -> Option<FontName> {
        self.lock().resolutions.get(requested).cloned()
    }

    /// The loaded font to use for `requested`.
    ///
    /// Follows the recorded resolution; anything not loaded lands on
    /// `default`.
    #[must_use]
    pub fn resolve(&self, requested: Option<&FontName>, default: &FontName) -> FontName {
        let Some(requested) = requested else {
            return default.clone();
        };
        let target = self
            .resolution(requested)
            .unwrap_or_else(|| requested.clone());
        if self.is_loaded(&target) {
            target
        } else {
            default.clone()
        }
    }

    /// Return the shared load of `font`, claiming it first if needed.
    fn claim(&self, host: &Arc<dyn CanvasHost>, font: &FontName) -> SharedLoad {
        let mut state = self.lock();
        if let Some(load) = state.loads.get(font) {
            let load = load.clone();
            state.stats.hits += 1;
            return load;
        }
        state.stats.misses += 1;

        let host = Arc::clone(host);
        let key = font.clone();
        let load = async move {
            match host.load_font(&key).await {
                Ok(()) => {
                    tracing::debug!(font = %key, "Font loaded");
                    true
                }
                Err(e) => {
                    tracing::warn!(font = %key, error = %e, "Font load failed");
                    false
                }
            }
        }
        .boxed()
        .shared();
        state.loads.insert(font.clone(), load.clone());
        load
    }

    async fn load(&self, host: &Arc<dyn CanvasHost>, font: &FontName) -> bool {
        let loaded = self.claim(host, font).await;
        if !loaded {
            // Release the claim so a later import retries.
            self.lock().loads.remove(font);
        }
        loaded
    }

    /// Resolve and load every font referenced by text records in the
    /// subtree of `root`, plus `default`.
    ///
    /// Fonts resolved by an earlier call are not queried again. A failing
    /// availability query counts as unavailable. Returns one
    /// [`IssueKind::FontUnavailable`] per substituted font, attributed to
    /// the first record that referenced it.
    pub async fn preload(
        &self,
        host: &Arc<dyn CanvasHost>,
        root: &SceneRecord,
        default: &FontName,
    ) -> Vec<ImportIssue> {
        let mut pending: BTreeMap<FontName, &str> = BTreeMap::new();
        let mut stack = vec![root];
        while let Some(record) = stack.pop() {
            if record.is(tags::TEXT) {
                for font in record.referenced_fonts() {
                    pending.entry(font).or_insert(record.id.as_str());
                }
            }
            stack.extend(record.children.iter());
        }
        pending.retain(|font, _| self.resolution(font).is_none());

        let queries = join_all(pending.iter().map(|(font, record_id)| async move {
            let available = match host.font_available(font).await {
                Ok(available) => available,
                Err(e) => {
                    tracing::warn!(font = %font, error = %e, "Font query failed");
                    false
                }
            };
            if available {
                return (font.clone(), font.clone(), None);
            }
            let substitute = choose_substitute(host, font, default).await;
            tracing::warn!(
                record_id = %record_id,
                requested = %font,
                substitute = %substitute,
                "Font unavailable, substituting"
            );
            let issue = ImportIssue::new(
                *record_id,
                IssueKind::FontUnavailable {
                    requested: font.clone(),
                    substitute: substitute.clone(),
                },
            );
            (font.clone(), substitute, Some(issue))
        }))
        .await;

        let mut targets = vec![default.clone()];
        let mut issues = Vec::new();
        {
            let mut state = self.lock();
            for (requested, target, issue) in queries {
                if let Some(issue) = issue {
                    state.stats.substitutions += 1;
                    issues.push(issue);
                }
                if !targets.contains(&target) {
                    targets.push(target.clone());
                }
                state.resolutions.insert(requested, target);
            }
        }

        let results = join_all(targets.iter().map(|font| self.load(host, font))).await;
        let failed: Vec<&FontName> = targets
            .iter()
            .zip(&results)
            .filter_map(|(font, loaded)| (!loaded).then_some(font))
            .collect();
        if !failed.is_empty() {
            // Forget resolutions onto fonts that did not load so a later
            // preload queries and loads them again.
            self.lock()
                .resolutions
                .retain(|_, target| !failed.contains(&&*target));
        }
        tracing::debug!(
            root = %root.label(),
            fonts = targets.len(),
            failed = failed.len(),
            "Fonts preloaded"
        );
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scene_core::MemoryCanvas;

    fn text(id: &str, family: &str, style: &str) -> SceneRecord {
        let mut record = SceneRecord::new(id, tags::TEXT);
        record.font_name = Some(FontName::new(family, style));
        record
    }

    fn host(canvas: &Arc<MemoryCanvas>) -> Arc<dyn CanvasHost> {
        Arc::clone(canvas) as Arc<dyn CanvasHost>
    }

    #[test]
    fn test_fallback_exact_row() {
        let default = FontName::default();
        assert_eq!(
            fallback_for(&FontName::new("SF Pro Display", "Semibold"), &default),
            FontName::new("Inter", "SemiBold")
        );
    }

    #[test]
    fn test_fallback_family_row_keeps_style() {
        let default = FontName::default();
        assert_eq!(
            fallback_for(&FontName::new("helvetica", "Bold"), &default),
            FontName::new("Inter", "Bold")
        );
    }

    #[test]
    fn test_fallback_default() {
        let default = FontName::default();
        assert_eq!(
            fallback_for(&FontName::new("Papyrus", "Regular"), &default),
            default
        );
    }

    #[tokio::test]
    async fn test_preload_loads_default_once() {
        let canvas = Arc::new(MemoryCanvas::new());
        let cache = FontCache::new();
        let default = FontName::default();
        let root = SceneRecord::new("f", "FRAME");

        let issues = cache.preload(&host(&canvas), &root, &default).await;
        assert!(issues.is_empty());
        cache.preload(&host(&canvas), &root, &default).await;

        assert_eq!(canvas.load_count(&default), 1);
        assert!(cache.is_loaded(&default));
        assert_eq!(cache.stats().misses, 1);
    }

    #[tokio::test]
    async fn test_preload_substitutes_missing_font() {
        let canvas = Arc::new(MemoryCanvas::new());
        let cache = FontCache::new();
        let default = FontName::default();
        let mut root = SceneRecord::new("f", "FRAME");
        root.children.push(text("t1", "Helvetica", "Bold"));

        let issues = cache.preload(&host(&canvas), &root, &default).await;

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].record_id, "t1");
        let requested = FontName::new("Helvetica", "Bold");
        assert_eq!(
            cache.resolve(Some(&requested), &default),
            FontName::new("Inter", "Bold")
        );
        assert_eq!(cache.stats().substitutions, 1);
    }

    #[tokio::test]
    async fn test_failing_query_goes_through_fallback() {
        let canvas = Arc::new(MemoryCanvas::new());
        canvas.fail_font_queries_for("Roboto");
        let cache = FontCache::new();
        let default = FontName::default();
        let root = text("t1", "Roboto", "Bold");

        let issues = cache.preload(&host(&canvas), &root, &default).await;

        assert_eq!(issues.len(), 1);
        assert_eq!(
            cache.resolve(Some(&FontName::new("Roboto", "Bold")), &default),
            default
        );
    }

    #[tokio::test]
    async fn test_failed_load_releases_claim() {
        let canvas = Arc::new(MemoryCanvas::empty());
        let cache = FontCache::new();
        let default = FontName::default();
        let root = SceneRecord::new("f", "FRAME");

        cache.preload(&host(&canvas), &root, &default).await;
        assert!(!cache.is_loaded(&default));

        canvas.register_font(default.clone());
        cache.preload(&host(&canvas), &root, &default).await;
        assert!(cache.is_loaded(&default));
        assert_eq!(canvas.load_count(&default), 2);
    }

    #[tokio::test]
    async fn test_failed_substitute_load_is_retried() {
        let canvas = Arc::new(MemoryCanvas::new());
        let roboto = FontName::new("Roboto", "Bold");
        canvas.fail_next_font_load(roboto.clone());
        let cache = FontCache::new();
        let default = FontName::default();
        let root = text("t1", "Roboto", "Bold");

        cache.preload(&host(&canvas), &root, &default).await;
        assert!(!cache.is_loaded(&roboto));
        assert_eq!(cache.resolution(&roboto), None);
        assert_eq!(cache.resolve(Some(&roboto), &default), default);

        cache.preload(&host(&canvas), &root, &default).await;
        assert!(cache.is_loaded(&roboto));
        assert_eq!(cache.resolve(Some(&roboto), &default), roboto);
        assert_eq!(canvas.load_count(&roboto), 2);
    }

    #[tokio::test]
    async fn test_concurrent_preloads_share_loads() {
        let canvas = Arc::new(MemoryCanvas::new());
        let cache = FontCache::new();
        let default = FontName::default();
        let a = text("a", "Roboto", "Bold");
        let b = text("b", "Roboto", "Bold");
        let host = host(&canvas);

        futures::join!(
            cache.preload(&host, &a, &default),
            cache.preload(&host, &b, &default)
        );

        assert_eq!(canvas.load_count(&FontName::new("Roboto", "Bold")), 1);
        assert_eq!(canvas.load_count(&default), 1);
    }
}
