//! Shared fixtures for web integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use image_compare_client::{
    ComparisonClient, ComparisonRequest, ComparisonTransport, ImageSelection, InMemoryImage,
    SelectionPolicy, TransportError, TransportResponse,
};
use image_compare_contract::ImageSlot;
use image_compare_ui::{MetricsUpdate, PreviewSurface, RenderedResult, ResultSurface};
use image_compare_web::{PreviewError, PreviewReader, SubmissionController};

/// One observable write to a surface.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    Result(RenderedResult),
    Metrics(MetricsUpdate),
    SubmitEnabled(bool),
    Preview(ImageSlot, String),
    PreviewCleared(ImageSlot),
    Notice(ImageSlot, String),
}

/// Surface that records every write. Clones share one log.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    events: Rc<RefCell<Vec<SurfaceEvent>>>,
    submit_enabled: Rc<Cell<bool>>,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self {
            events: Rc::default(),
            submit_enabled: Rc::new(Cell::new(true)),
        }
    }
}

impl RecordingSurface {
    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.events.borrow().clone()
    }

    pub fn submit_enabled(&self) -> bool {
        self.submit_enabled.get()
    }

    pub fn last_result(&self) -> Option<RenderedResult> {
        self.events().into_iter().rev().find_map(|event| match event {
            SurfaceEvent::Result(result) => Some(result),
            _ => None,
        })
    }

    pub fn last_metrics(&self) -> Option<MetricsUpdate> {
        self.events().into_iter().rev().find_map(|event| match event {
            SurfaceEvent::Metrics(update) => Some(update),
            _ => None,
        })
    }

    pub fn toggles(&self) -> Vec<bool> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                SurfaceEvent::SubmitEnabled(enabled) => Some(enabled),
                _ => None,
            })
            .collect()
    }
}

impl ResultSurface for RecordingSurface {
    fn show_result(&self, result: &RenderedResult) {
        self.events
            .borrow_mut()
            .push(SurfaceEvent::Result(result.clone()));
    }

    fn apply_metrics(&self, update: &MetricsUpdate) {
        self.events
            .borrow_mut()
            .push(SurfaceEvent::Metrics(update.clone()));
    }

    fn set_submit_enabled(&self, enabled: bool) {
        self.submit_enabled.set(enabled);
        self.events
            .borrow_mut()
            .push(SurfaceEvent::SubmitEnabled(enabled));
    }
}

impl PreviewSurface for RecordingSurface {
    fn show_preview(&self, slot: ImageSlot, data_url: &str) {
        self.events
            .borrow_mut()
            .push(SurfaceEvent::Preview(slot, data_url.to_string()));
    }

    fn clear_preview(&self, slot: ImageSlot) {
        self.events
            .borrow_mut()
            .push(SurfaceEvent::PreviewCleared(slot));
    }

    fn show_preview_notice(&self, slot: ImageSlot, notice: &str) {
        self.events
            .borrow_mut()
            .push(SurfaceEvent::Notice(slot, notice.to_string()));
    }
}

/// Future that is pending on its first poll.
#[derive(Default)]
pub struct YieldOnce {
    yielded: bool,
}

impl Future for YieldOnce {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            Poll::Ready(())
        } else {
            self.yielded = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

/// Transport replaying canned replies.
///
/// Observes the submit control through `surface` at dispatch time.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    replies: RefCell<VecDeque<Result<TransportResponse, TransportError>>>,
    calls: Cell<usize>,
    enabled_during_call: RefCell<Vec<bool>>,
    surface: Option<RecordingSurface>,
    yield_first: bool,
    panic_on_send: bool,
}

impl ScriptedTransport {
    pub fn observing(surface: &RecordingSurface) -> Self {
        Self {
            surface: Some(surface.clone()),
            ..Self::default()
        }
    }

    pub fn json(self, status: u16, body: &str) -> Self {
        self.reply(Ok(TransportResponse {
            status,
            body: body.to_string(),
        }))
    }

    pub fn reply(self, reply: Result<TransportResponse, TransportError>) -> Self {
        self.replies.borrow_mut().push_back(reply);
        self
    }

    pub fn yielding(mut self) -> Self {
        self.yield_first = true;
        self
    }

    pub fn panicking(mut self) -> Self {
        self.panic_on_send = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    pub fn enabled_during_call(&self) -> Vec<bool> {
        self.enabled_during_call.borrow().clone()
    }
}

impl ComparisonTransport for ScriptedTransport {
    type File = InMemoryImage;

    async fn post_multipart(
        &self,
        _endpoint: &str,
        _request: &ComparisonRequest<InMemoryImage>,
    ) -> Result<TransportResponse, TransportError> {
        self.calls.set(self.calls.get() + 1);
        if let Some(surface) = &self.surface {
            self.enabled_during_call
                .borrow_mut()
                .push(surface.submit_enabled());
        }
        if self.yield_first {
            YieldOnce::default().await;
        }
        if self.panic_on_send {
            panic!("transport exploded");
        }
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or(Err(TransportError::Unavailable))
    }
}

/// Preview reader returning a fake data URL, or failing for named files.
#[derive(Debug, Default)]
pub struct FakeReader {
    pub failing_name: Option<String>,
}

impl PreviewReader for FakeReader {
    type File = InMemoryImage;

    async fn read_data_url(&self, file: &InMemoryImage) -> Result<String, PreviewError> {
        if self.failing_name.as_deref() == Some(file.name.as_str()) {
            return Err(PreviewError::Read("NotReadableError".to_string()));
        }
        YieldOnce::default().await;
        Ok(format!("data:image/png;base64,{}", file.bytes.len()))
    }
}

/// Controller wired to a scripted transport and a recording surface.
pub fn controller(
    transport: ScriptedTransport,
    surface: &RecordingSurface,
) -> SubmissionController<ScriptedTransport, RecordingSurface> {
    let client = ComparisonClient::new("/compare", transport).expect("client should build");
    SubmissionController::new(client, surface.clone(), SelectionPolicy::permissive())
}

/// Both slots populated.
pub fn full_selection() -> ImageSelection<InMemoryImage> {
    ImageSelection::from_slots(
        Some(InMemoryImage::new("fileA.png", vec![1, 2, 3])),
        Some(InMemoryImage::new("fileB.png", vec![4, 5, 6])),
    )
}

/// Only slot 1 populated.
pub fn first_only_selection() -> ImageSelection<InMemoryImage> {
    ImageSelection::from_slots(Some(InMemoryImage::new("fileA.png", vec![1, 2, 3])), None)
}
