//! Import configuration.

use scene_core::{BoundingBox, FontName};

/// Default number of top-level records imported concurrently.
pub const DEFAULT_BATCH_SIZE: usize = 20;

/// Region reported as the viewport when no root carries geometry.
pub const DEFAULT_VIEWPORT: BoundingBox = BoundingBox::new(0.0, 0.0, 800.0, 600.0);

/// Environment variable overriding [`DEFAULT_BATCH_SIZE`].
pub const BATCH_SIZE_ENV: &str = "SCENE_IMPORT_BATCH_SIZE";

/// Tunables of an [`Importer`](crate::Importer).
#[derive(Debug, Clone, PartialEq)]
pub struct ImportConfig {
    /// Roots per chunk. Values below 1 are treated as 1.
    pub batch_size: usize,
    /// Font every text node can land on. Always preloaded.
    pub default_font: FontName,
    /// Viewport reported when no imported root has bounds.
    pub default_viewport: BoundingBox,
    /// Select and focus the imported roots on the host when done.
    pub focus_viewport: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            default_font: FontName::default(),
            default_viewport: DEFAULT_VIEWPORT,
            focus_viewport: true,
        }
    }
}

impl ImportConfig {
    /// Defaults, with the batch size read from `SCENE_IMPORT_BATCH_SIZE`
    /// when it is set to a positive integer.
    #[must_use]
    pub fn from_env() -> Self {
        let batch_size = std::env::var(BATCH_SIZE_ENV)
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|&n: &usize| n > 0)
            .unwrap_or(DEFAULT_BATCH_SIZE);
        Self {
            batch_size,
            ..Self::default()
        }
    }

    /// Override the batch size.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Override the default font.
    #[must_use]
    pub fn with_default_font(mut self, font: FontName) -> Self {
        self.default_font = font;
        self
    }

    /// Enable or disable focusing the imported roots.
    #[must_use]
    pub fn with_focus(mut self, focus: bool) -> Self {
        self.focus_viewport = focus;
        self
    }
}
