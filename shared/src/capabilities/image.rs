//! Remote image loading, delegated to the shell's image library.
//!
//! The core never sees pixels. It asks the shell to load a URL into the detail
//! view's image slot and only learns whether that worked.

use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone)]
pub struct Image<E> {
    context: CapabilityContext<ImageOperation, E>,
}

impl<Ev> Capability<Ev> for Image<Ev> {
    type Operation = ImageOperation;
    type MappedSelf<MappedEv> = Image<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Image::new(self.context.map_event(f))
    }
}

impl<E> Image<E>
where
    E: 'static,
{
    pub fn new(context: CapabilityContext<ImageOperation, E>) -> Self {
        Self { context }
    }

    /// Asks the shell to load `url`; `callback` builds the event for the outcome.
    pub fn load<F>(&self, url: impl Into<String>, callback: F)
    where
        F: FnOnce(ImageResult) -> E + Send + 'static,
    {
        let operation = ImageOperation::Load { url: url.into() };
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let result = ctx.request_from_shell(operation).await;
            ctx.update_app(callback(result));
        });
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImageOperation {
    /// Load `url`; the shell shows the placeholder until it completes and the
    /// error image if it fails.
    Load { url: String },
}

impl Operation for ImageOperation {
    type Output = ImageResult;
}

/// The shell could not show the photo, for whatever reason its image library
/// gave.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[error("image could not be loaded: {reason}")]
pub struct ImageError {
    pub reason: String,
}

impl ImageError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

pub type ImageResult = Result<(), ImageError>;
