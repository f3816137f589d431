//! Context configuration.
//!
//! Capacities are fixed for the lifetime of a [`Context`](crate::Context);
//! exceeding one reports a degraded diagnostic and skips the declaration.

/// Default maximum number of elements per frame (including the implicit root).
pub const DEFAULT_MAX_ELEMENTS: usize = 8192;

/// Default maximum number of configuration records per frame, all categories.
pub const DEFAULT_MAX_CONFIG_RECORDS: usize = 16384;

/// Default capacity of the dynamic text arena in bytes (256 KiB).
pub const DEFAULT_TEXT_CAPACITY: usize = 256 * 1024;

/// Default lines scrolled per wheel notch.
pub const DEFAULT_WHEEL_SCROLL_LINES: f32 = 3.0;

/// Default number of frames an undeclared id keeps its cached bounds.
pub const DEFAULT_BOUNDS_RETENTION: u64 = 60;

/// Settings for one UI context.
#[derive(Clone, Debug, PartialEq)]
pub struct ContextConfig {
    pub max_elements: usize,
    pub max_config_records: usize,
    /// Bytes.
    pub text_capacity: usize,
    pub wheel_scroll_lines: f32,
    /// Omit draw commands for elements entirely outside the viewport.
    pub culling: bool,
    /// Frames an identifier may go undeclared before its cached bounds are
    /// evicted. Redeclaring always overwrites.
    pub bounds_retention: u64,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_elements: DEFAULT_MAX_ELEMENTS,
            max_config_records: DEFAULT_MAX_CONFIG_RECORDS,
            text_capacity: DEFAULT_TEXT_CAPACITY,
            wheel_scroll_lines: DEFAULT_WHEEL_SCROLL_LINES,
            culling: true,
            bounds_retention: DEFAULT_BOUNDS_RETENTION,
        }
    }
}

impl ContextConfig {
    pub fn with_max_elements(mut self, max_elements: usize) -> Self {
        self.max_elements = max_elements;
        self
    }

    pub fn with_max_config_records(mut self, max_config_records: usize) -> Self {
        self.max_config_records = max_config_records;
        self
    }

    pub fn with_text_capacity(mut self, bytes: usize) -> Self {
        self.text_capacity = bytes;
        self
    }

    pub fn with_wheel_scroll_lines(mut self, lines: f32) -> Self {
        self.wheel_scroll_lines = lines;
        self
    }

    pub fn with_culling(mut self, culling: bool) -> Self {
        self.culling = culling;
        self
    }

    pub fn with_bounds_retention(mut self, frames: u64) -> Self {
        self.bounds_retention = frames;
        self
    }
}
