//! One form submission, from raw inputs to a downloadable mandala.

use std::fmt;

use image::DynamicImage;
use tracing::{debug, info, warn};

use crate::color::{Color, ColorLabel, name_color};
use crate::error::{MandalaError, ValidationError};
use crate::generation::{GenerationClient, ImageSource};
use crate::prompt::{PromptMode, build_prompt};

/// Where a submission is in its life.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    /// Nothing submitted yet
    Idle,
    /// Inputs passed validation
    Submitted,
    /// Waiting on the image API
    Requesting,
    /// Image decoded and encoded for download
    Succeeded,
    /// Validation or generation failed
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Submitted => "submitted",
            Self::Requesting => "requesting",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Inputs for one generation. Built fresh per submission and dropped after.
#[derive(Clone)]
pub struct GenerationRequest {
    /// Free-text seed for the artwork's theme
    pub inspiration: String,
    /// The chosen color
    pub color: Color,
    /// Name of the color, when the caller already computed one
    pub label: Option<ColorLabel>,
    credential: String,
}

impl GenerationRequest {
    /// A request without a precomputed label.
    pub fn new(inspiration: impl Into<String>, color: Color, credential: impl Into<String>) -> Self {
        Self {
            inspiration: inspiration.into(),
            color,
            label: None,
            credential: credential.into(),
        }
    }

    /// Attaches the label to use in the prompt and filename.
    #[must_use]
    pub fn with_label(mut self, label: ColorLabel) -> Self {
        self.label = Some(label);
        self
    }

    /// Checks the inputs in the order the form reports them.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.inspiration.trim().is_empty() {
            return Err(ValidationError::EmptyInspiration);
        }
        if self.credential.trim().is_empty() {
            return Err(ValidationError::MissingCredential);
        }
        Ok(())
    }
}

impl fmt::Debug for GenerationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationRequest")
            .field("inspiration", &self.inspiration)
            .field("color", &self.color)
            .field("label", &self.label)
            .field("credential", &"<redacted>")
            .finish()
    }
}

/// A finished mandala, ready to show and download.
#[derive(Debug)]
pub struct Mandala {
    /// Decoded image
    pub image: DynamicImage,
    /// PNG encoding of `image`
    pub png: Vec<u8>,
    /// Where the API put the original
    pub source: ImageSource,
    /// Prompt that was sent
    pub prompt: String,
    /// Prompt as rewritten by the model, if reported
    pub revised_prompt: Option<String>,
    /// Name of the color used in the prompt, when the mode names it
    pub label: Option<ColorLabel>,
    /// Suggested download filename
    pub filename: String,
    /// Caption for the preview
    pub caption: String,
}

/// The label a mode puts in the prompt: emphatic names the color, simple does not.
pub fn label_for_mode(request: &GenerationRequest, mode: PromptMode) -> Option<ColorLabel> {
    match mode {
        PromptMode::Simple => None,
        PromptMode::Emphatic => Some(
            request
                .label
                .clone()
                .unwrap_or_else(|| name_color(request.color)),
        ),
    }
}

/// `mandala_<inspiration>.png`, with `_<label>` before the extension when there is a label.
pub fn suggested_filename(inspiration: &str, label: Option<&ColorLabel>) -> String {
    let stem = match label {
        Some(label) => format!("mandala_{inspiration}_{}", label.to_string().replace(' ', "_")),
        None => format!("mandala_{inspiration}"),
    };
    let stem: String = stem
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    format!("{stem}.png")
}

fn caption(inspiration: &str, label: Option<&ColorLabel>) -> String {
    match label {
        Some(label) => format!("Mandala inspired by '{inspiration}' with {label}"),
        None => format!("Mandala inspired by '{inspiration}'"),
    }
}

/// Runs one submission: validate, name, prompt, generate, encode.
///
/// `on_phase` sees every transition, so callers can show progress. A failure
/// at any step ends the submission; nothing is retried.
pub async fn submit(
    client: &GenerationClient,
    request: &GenerationRequest,
    mode: PromptMode,
    mut on_phase: impl FnMut(Phase),
) -> Result<Mandala, MandalaError> {
    on_phase(Phase::Idle);
    if let Err(err) = request.validate() {
        debug!("Submission rejected: {}", err);
        on_phase(Phase::Failed);
        return Err(err.into());
    }
    on_phase(Phase::Submitted);

    let inspiration = request.inspiration.trim();
    let label = label_for_mode(request, mode);
    let prompt = build_prompt(inspiration, request.color, label.as_ref(), mode);
    debug!("Prompt ({mode}): {prompt}");

    on_phase(Phase::Requesting);
    let result = match client.generate(&prompt, &request.credential).await {
        Ok(generated) => generated.to_png().map(|png| (generated, png)),
        Err(err) => Err(err),
    };
    let (generated, png) = match result {
        Ok(ok) => ok,
        Err(err) => {
            warn!("Mandala generation failed: {}", err);
            on_phase(Phase::Failed);
            return Err(err.into());
        }
    };
    on_phase(Phase::Succeeded);
    info!("Generated mandala for '{}' ({} bytes)", inspiration, png.len());

    Ok(Mandala {
        image: generated.image,
        png,
        source: generated.source,
        prompt,
        revised_prompt: generated.revised_prompt,
        filename: suggested_filename(inspiration, label.as_ref()),
        caption: caption(inspiration, label.as_ref()),
        label,
    })
}
