use thiserror::Error;
use wasm_bindgen::JsValue;

/// Everything that can disable one of the page embellishments.
///
/// None of these are fatal to the page: callers log them and carry on
/// without the affected feature.
#[derive(Error, Debug)]
pub enum PetalError {
    #[error("no {0}")]
    MissingGlobal(&'static str),

    #[error("element {0} not found")]
    MissingElement(String),

    #[error("element {0} has the wrong type")]
    WrongElementType(String),

    #[error("2d rendering context unavailable")]
    NoContext,

    #[error("sprite {src} failed to load: {reason}")]
    SpriteLoad { src: String, reason: String },

    #[error("image bitmap unavailable: {0}")]
    Bitmap(String),

    #[error("could not schedule callback: {0}")]
    Schedule(String),

    #[error("invalid config json: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),

    #[error("clipboard api unavailable")]
    ClipboardUnavailable,

    #[error("clipboard write rejected: {0}")]
    ClipboardRejected(String),

    #[error("dom operation failed: {0}")]
    Dom(String),
}

pub type Result<T> = std::result::Result<T, PetalError>;

impl From<PetalError> for JsValue {
    fn from(err: PetalError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

/// Render a thrown JS value for an error message.
pub fn describe(value: &JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{:?}", value))
}
