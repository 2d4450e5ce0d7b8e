//! Helpers for building server-driven datastar SSE responses.

use std::convert::Infallible;

use async_stream::stream;
use axum::response::{
    IntoResponse, Response,
    sse::{Event, Sse},
};
use datastar::prelude::{ElementPatchMode, PatchElements};

/// Ordered list of datastar events sent back for a single user action.
///
/// An empty stream is a valid answer: the browser keeps what it shows.
#[derive(Default)]
pub struct PatchStream {
    events: Vec<Event>,
}

impl PatchStream {
    /// Empty stream; sending it leaves the page untouched.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stream with a single replace patch for `selector`.
    pub fn replace(selector: &str, html: String) -> Self {
        let mut stream = Self::new();
        stream.push_patch(html, selector, ElementPatchMode::Replace);
        stream
    }

    /// Queue a `PatchElements` event that applies `html` to `selector` with `mode`.
    pub fn push_patch(
        &mut self,
        html: String,
        selector: &str,
        mode: ElementPatchMode,
    ) -> &mut Self {
        let event = PatchElements::new(html)
            .selector(selector)
            .mode(mode)
            .write_as_axum_sse_event();
        self.events.push(event);
        self
    }
}

impl IntoResponse for PatchStream {
    fn into_response(self) -> Response {
        let events = self.events;
        let stream = stream! {
            for event in events {
                yield Ok::<Event, Infallible>(event);
            }
        };
        Sse::new(stream).into_response()
    }
}
