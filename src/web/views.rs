use base64::Engine;
use base64::engine::general_purpose;

use super::prelude::*;
use crate::constants::PNG_MIME;
use crate::submission::Mandala;

#[derive(Clone, Debug)]
pub(crate) struct ModeOption {
    pub(crate) value: &'static str,
    pub(crate) description: &'static str,
    pub(crate) selected: bool,
}

#[derive(Template, WebTemplate)]
#[template(path = "form.html")]
pub(crate) struct FormTemplate {
    pub(crate) inspiration: String,
    pub(crate) color_value: String,
    pub(crate) color_label: String,
    pub(crate) mode_options: Vec<ModeOption>,
    pub(crate) has_error: bool,
    pub(crate) error_message: String,
}

impl FormTemplate {
    /// The form pre-filled with what the user last entered. The API key is
    /// never echoed back.
    pub(crate) fn new(inspiration: &str, color: Color, mode: PromptMode) -> Self {
        Self {
            inspiration: inspiration.to_string(),
            color_value: color.to_html_value(),
            color_label: name_color(color).to_string(),
            mode_options: PromptMode::ALL
                .into_iter()
                .map(|option| ModeOption {
                    value: option.as_str(),
                    description: option.description(),
                    selected: option == mode,
                })
                .collect(),
            has_error: false,
            error_message: String::new(),
        }
    }

    pub(crate) fn with_error(mut self, message: String) -> Self {
        self.has_error = true;
        self.error_message = message;
        self
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "result.html")]
pub(crate) struct ResultTemplate {
    pub(crate) caption: String,
    pub(crate) image_data_url: String,
    pub(crate) filename: String,
    pub(crate) has_source_url: bool,
    pub(crate) source_url: String,
    pub(crate) prompt: String,
    pub(crate) has_revised_prompt: bool,
    pub(crate) revised_prompt: String,
}

impl From<&Mandala> for ResultTemplate {
    fn from(mandala: &Mandala) -> Self {
        let source_url = mandala.source.url().unwrap_or_default().to_string();
        let revised_prompt = mandala.revised_prompt.clone().unwrap_or_default();
        Self {
            caption: mandala.caption.clone(),
            image_data_url: format!(
                "data:{PNG_MIME};base64,{}",
                general_purpose::STANDARD.encode(&mandala.png)
            ),
            filename: mandala.filename.clone(),
            has_source_url: !source_url.is_empty(),
            source_url,
            prompt: mandala.prompt.clone(),
            has_revised_prompt: !revised_prompt.is_empty(),
            revised_prompt,
        }
    }
}

#[derive(Serialize, Debug)]
pub(crate) struct ColorName {
    pub(crate) color: String,
    pub(crate) label: String,
}

impl From<Color> for ColorName {
    fn from(color: Color) -> Self {
        Self {
            color: color.to_string(),
            label: name_color(color).to_string(),
        }
    }
}
