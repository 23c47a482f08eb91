// Constants module - centralized default values for configuration
//
// Defaults shared by the configuration sections and the CLI.

// =============================================================================
// Font defaults
// =============================================================================

/// Family used when a template names a font that is not installed
pub const DEFAULT_FONT_FAMILY: &str = "Arial";

// =============================================================================
// Preview defaults
// =============================================================================

/// Default preview area width in pixels
pub const DEFAULT_PREVIEW_MAX_WIDTH: u32 = 800;

/// Default preview area height in pixels
pub const DEFAULT_PREVIEW_MAX_HEIGHT: u32 = 600;

/// Default minimum time between preview redraws (~60 Hz)
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 16;

// =============================================================================
// Export defaults
// =============================================================================

/// Default JPEG quality (1-100)
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Default background for formats without alpha
pub const DEFAULT_BACKGROUND: &str = "#ffffff";

// =============================================================================
// Template store defaults
// =============================================================================

/// Default templates file
pub const DEFAULT_TEMPLATES_FILE: &str = "watermark_templates.json";

/// Default last-used settings file
pub const DEFAULT_LAST_SETTINGS_FILE: &str = "last_watermark_settings.json";

// =============================================================================
// Logging defaults
// =============================================================================

/// Default log level when RUST_LOG is unset
pub const DEFAULT_LOG_LEVEL: &str = "info";
