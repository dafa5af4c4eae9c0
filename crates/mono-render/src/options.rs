//! Render pipeline options.

/// Default bias added on top of the computed Otsu threshold. Biasing toward
/// white keeps thin icon strokes visible on the small panels.
pub const DEFAULT_THRESHOLD_BIAS: u8 = 25;

/// Configuration for a single bitmap render.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Resample the source to the icon size before compositing. Disabled
    /// for static files already sized for the display.
    pub resize: bool,

    /// Bias added to the Otsu threshold (saturating at 255).
    pub threshold_bias: u8,

    /// Draw this display index in the canvas corner.
    pub label: Option<u8>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            resize: true,
            threshold_bias: DEFAULT_THRESHOLD_BIAS,
            label: None,
        }
    }
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the resize flag.
    pub fn with_resize(mut self, val: bool) -> Self {
        self.resize = val;
        self
    }

    /// Builder: set the threshold bias.
    pub fn with_threshold_bias(mut self, val: u8) -> Self {
        self.threshold_bias = val;
        self
    }

    /// Builder: draw an index label.
    pub fn with_label(mut self, index: u8) -> Self {
        self.label = Some(index);
        self
    }
}
