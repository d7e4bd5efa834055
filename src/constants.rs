//! Shared constants/defaults for things
//!

use crate::color::Color;

/// Color preselected in the form and the CLI, `#FF5733`
pub const DEFAULT_COLOR: Color = Color::new(0xFF, 0x57, 0x33);

/// Where the OpenAI API lives
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1/";

/// Image model used unless configured otherwise
pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";

/// Square output resolution
pub const DEFAULT_IMAGE_SIZE: &str = "1024x1024";

/// Quality tier requested from the Images API
pub const DEFAULT_IMAGE_QUALITY: &str = "standard";

/// Upper bound (in seconds) on each outbound request.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 120;

/// Default output directory for the command-line generator
pub const DEFAULT_OUT_DIR: &str = "./mandalas";

/// Mime type of the downloadable image
pub const PNG_MIME: &str = "image/png";
