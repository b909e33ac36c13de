//! Capabilities the report core requests effects through.
//!
//! HTTP and render are Crux's own; image loading is ours. Crux's render
//! carries no payload, so which part of the screen changed travels in the
//! view model as a [`RenderScope`].

mod http;
mod image;

pub use self::http::{
    HttpOutput, HttpRequest, HttpResponse, HttpResult, UrlError, ValidatedUrl, MAX_URL_LENGTH,
};
pub use self::image::{Image, ImageError, ImageOperation, ImageResult};

pub use crux_core::render::Render;
pub use crux_http::Http;

use serde::{Deserialize, Serialize};

use crate::event::Event;

// The derive reads the event type off each field, so no aliases here.
#[derive(crux_core::macros::Effect)]
#[effect(app = "crate::App")]
pub struct Capabilities {
    pub http: Http<Event>,
    pub render: Render<Event>,
    pub image: Image<Event>,
}

/// How much of the screen the last render request covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum RenderScope {
    #[default]
    Full,
    /// Only the list row at `index` changed.
    Row { index: usize },
}
