//! Shared fixtures for client integration tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use image_compare_client::{
    ComparisonRequest, ComparisonTransport, ImageSelection, InMemoryImage, TransportError,
    TransportResponse,
};

/// Transport that replays canned results and records what it was sent.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    replies: RefCell<VecDeque<Result<TransportResponse, TransportError>>>,
    calls: Cell<usize>,
    last_fields: RefCell<Vec<String>>,
}

#[allow(dead_code)]
impl ScriptedTransport {
    /// Queues one reply.
    pub fn reply(self, reply: Result<TransportResponse, TransportError>) -> Self {
        self.replies.borrow_mut().push_back(reply);
        self
    }

    /// Queues one JSON reply with the given status.
    pub fn json(self, status: u16, body: &str) -> Self {
        self.reply(Ok(TransportResponse {
            status,
            body: body.to_string(),
        }))
    }

    /// Number of POSTs performed.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    /// Field names of the last request, in order.
    pub fn last_fields(&self) -> Vec<String> {
        self.last_fields.borrow().clone()
    }
}

impl ComparisonTransport for ScriptedTransport {
    type File = InMemoryImage;

    async fn post_multipart(
        &self,
        _endpoint: &str,
        request: &ComparisonRequest<InMemoryImage>,
    ) -> Result<TransportResponse, TransportError> {
        self.calls.set(self.calls.get() + 1);
        *self.last_fields.borrow_mut() = request
            .parts()
            .iter()
            .map(|(field, _)| field.to_string())
            .collect();
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or(Err(TransportError::Unavailable))
    }
}

/// Creates a complete two-image selection.
#[allow(dead_code)]
pub fn fixture_selection() -> ImageSelection<InMemoryImage> {
    ImageSelection::from_slots(
        Some(InMemoryImage::new("left.png", vec![1, 2, 3, 4])),
        Some(InMemoryImage::new("right.jpg", vec![5, 6, 7])),
    )
}
