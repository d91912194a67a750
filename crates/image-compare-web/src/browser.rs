//! Browser bindings: DOM surfaces, `fetch` transport, `FileReader` previews,
//! and the wasm entry point.

use std::rc::Rc;

use image_compare_client::{
    ComparisonClient, ComparisonRequest, ComparisonTransport, ImageSelection, ImageSource,
    TransportError, TransportResponse,
};
use image_compare_contract::ImageSlot;
use image_compare_ui::{MetricsPanel, MetricsUpdate, PreviewSurface, RenderedResult, ResultSurface};
use js_sys::Promise;
use thiserror::Error;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{
    Document, Element, Event, File, FileReader, FormData, HtmlElement, HtmlFormElement,
    HtmlImageElement, HtmlInputElement, RequestInit, Response,
};

use crate::{
    AppConfig, ElementIds, PreviewController, PreviewError, PreviewReader, SubmissionController,
};

/// Browser file handle.
#[derive(Debug, Clone)]
pub struct BrowserFile(File);

impl ImageSource for BrowserFile {
    fn file_name(&self) -> String {
        self.0.name()
    }

    fn byte_len(&self) -> u64 {
        self.0.size() as u64
    }
}

struct SlotElements {
    input: HtmlInputElement,
    preview: HtmlImageElement,
    placeholder_icon: HtmlElement,
    placeholder_text: HtmlElement,
}

/// Every element the page workflow touches, resolved once at startup.
struct DomBindings {
    document: Document,
    form: HtmlFormElement,
    submit: Element,
    result: HtmlElement,
    metrics: Element,
    slots: [SlotElements; 2],
}

impl DomBindings {
    fn resolve(document: Document, ids: &ElementIds) -> Result<Self, BindingError> {
        let slot = |slot: ImageSlot| -> Result<SlotElements, BindingError> {
            Ok(SlotElements {
                input: lookup(&document, &ids.input(slot))?,
                preview: lookup(&document, &ids.preview(slot))?,
                placeholder_icon: lookup(&document, &ids.placeholder_icon(slot))?,
                placeholder_text: lookup(&document, &ids.placeholder_text(slot))?,
            })
        };
        let slots = [slot(ImageSlot::First)?, slot(ImageSlot::Second)?];

        Ok(Self {
            form: lookup(&document, &ids.form)?,
            submit: lookup(&document, &ids.submit)?,
            result: lookup(&document, &ids.result)?,
            metrics: lookup(&document, &ids.metrics)?,
            slots,
            document,
        })
    }

    fn slot(&self, slot: ImageSlot) -> &SlotElements {
        match slot {
            ImageSlot::First => &self.slots[0],
            ImageSlot::Second => &self.slots[1],
        }
    }

    fn selected_file(&self, slot: ImageSlot) -> Option<BrowserFile> {
        self.slot(slot)
            .input
            .files()
            .and_then(|files| files.get(0))
            .map(BrowserFile)
    }

    fn current_selection(&self) -> ImageSelection<BrowserFile> {
        ImageSelection::from_slots(
            self.selected_file(ImageSlot::First),
            self.selected_file(ImageSlot::Second),
        )
    }

    fn render_metrics(&self, panel: &MetricsPanel) -> Result<(), JsValue> {
        self.metrics.set_inner_html("");
        for row in &panel.rows {
            let line = self.document.create_element("p")?;
            let label = self.document.create_element("strong")?;
            label.set_text_content(Some(&format!("{}:", row.label)));
            line.append_child(&label)?;
            line.append_child(&self.document.create_text_node(&format!(" {}", row.value)))?;
            self.metrics.append_child(&line)?;
        }
        Ok(())
    }
}

fn lookup<T: JsCast>(document: &Document, id: &str) -> Result<T, BindingError> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| BindingError::MissingElement(id.to_string()))?
        .dyn_into::<T>()
        .map_err(|_| BindingError::WrongElementType(id.to_string()))
}

/// Shared DOM writer for results and previews.
#[derive(Clone)]
struct DomSurface(Rc<DomBindings>);

impl ResultSurface for DomSurface {
    fn show_result(&self, result: &RenderedResult) {
        self.0.result.set_text_content(Some(&result.text));
        self.0.result.set_class_name(result.classification.css_class());
    }

    fn apply_metrics(&self, update: &MetricsUpdate) {
        match update {
            MetricsUpdate::Show(panel) => {
                if let Err(error) = self.0.render_metrics(panel) {
                    log::error!("render | metrics | {}", js_error_message(&error));
                }
            }
            MetricsUpdate::Clear => self.0.metrics.set_inner_html(""),
        }
    }

    fn set_submit_enabled(&self, enabled: bool) {
        let toggled = if enabled {
            self.0.submit.remove_attribute("disabled")
        } else {
            self.0.submit.set_attribute("disabled", "")
        };
        if let Err(error) = toggled {
            log::error!("render | submit_toggle | {}", js_error_message(&error));
        }
    }
}

impl PreviewSurface for DomSurface {
    fn show_preview(&self, slot: ImageSlot, data_url: &str) {
        let elements = self.0.slot(slot);
        let styled = elements
            .placeholder_icon
            .style()
            .set_property("display", "none")
            .and_then(|()| elements.placeholder_text.style().set_property("display", "none"))
            .and_then(|()| {
                elements.preview.set_src(data_url);
                elements.preview.style().set_property("display", "block")
            });
        if let Err(error) = styled {
            log::error!("preview | style | {}", js_error_message(&error));
        }
    }

    fn clear_preview(&self, slot: ImageSlot) {
        let preview = &self.0.slot(slot).preview;
        preview.set_src("");
        if let Err(error) = preview.style().set_property("display", "none") {
            log::error!("preview | clear | {}", js_error_message(&error));
        }
    }

    fn show_preview_notice(&self, slot: ImageSlot, notice: &str) {
        let text = &self.0.slot(slot).placeholder_text;
        text.set_text_content(Some(notice));
        if let Err(error) = text.style().remove_property("display") {
            log::error!("preview | notice | {}", js_error_message(&error));
        }
    }
}

/// `fetch` + `FormData` transport.
struct FetchTransport;

impl ComparisonTransport for FetchTransport {
    type File = BrowserFile;

    async fn post_multipart(
        &self,
        endpoint: &str,
        request: &ComparisonRequest<BrowserFile>,
    ) -> Result<TransportResponse, TransportError> {
        let window = web_sys::window().ok_or(TransportError::Unavailable)?;

        let form = FormData::new().map_err(network_error)?;
        for (field, file) in request.parts() {
            form.append_with_blob_and_filename(field, &file.0, &file.0.name())
                .map_err(network_error)?;
        }

        let init = RequestInit::new();
        init.set_method("POST");
        init.set_body(&form);

        let response: Response = JsFuture::from(window.fetch_with_str_and_init(endpoint, &init))
            .await
            .map_err(network_error)?
            .dyn_into()
            .map_err(network_error)?;
        let body = JsFuture::from(response.text().map_err(network_error)?)
            .await
            .map_err(network_error)?;

        Ok(TransportResponse {
            status: response.status(),
            body: body.as_string().unwrap_or_default(),
        })
    }
}

fn network_error(value: JsValue) -> TransportError {
    TransportError::Network(js_error_message(&value))
}

/// `FileReader::read_as_data_url` awaited through a promise.
struct FileReaderPreview;

impl PreviewReader for FileReaderPreview {
    type File = BrowserFile;

    async fn read_data_url(&self, file: &BrowserFile) -> Result<String, PreviewError> {
        let reader = FileReader::new().map_err(read_error)?;
        let loaded = Promise::new(&mut |resolve, reject| {
            reader.set_onload(Some(&resolve));
            reader.set_onerror(Some(&reject));
            reader.set_onabort(Some(&reject));
        });

        reader.read_as_data_url(&file.0).map_err(read_error)?;
        JsFuture::from(loaded).await.map_err(read_error)?;

        reader
            .result()
            .map_err(read_error)?
            .as_string()
            .ok_or_else(|| PreviewError::Read("reader produced no data url".to_string()))
    }
}

fn read_error(value: JsValue) -> PreviewError {
    let message = js_error_message(&value);
    if message.is_empty() {
        PreviewError::Read("read aborted".to_string())
    } else {
        PreviewError::Read(message)
    }
}

fn js_error_message(value: &JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    value.as_string().unwrap_or_default()
}

/// Startup failures.
#[derive(Debug, Error)]
enum BindingError {
    #[error("no window or document available")]
    NoDocument,
    #[error("element #{0} not found")]
    MissingElement(String),
    #[error("element #{0} has an unexpected type")]
    WrongElementType(String),
    #[error(transparent)]
    Config(#[from] crate::ConfigError),
    #[error("invalid endpoint: {0}")]
    Client(#[from] image_compare_client::ClientError),
}

/// Wasm entry point.
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    if let Err(error) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&format!("logger already initialised: {error}").into());
    }

    run().map_err(|error| {
        log::error!("startup | failed | {error}");
        JsValue::from_str(&error.to_string())
    })
}

fn run() -> Result<(), BindingError> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or(BindingError::NoDocument)?;

    let defaults = ElementIds::default();
    let form: HtmlFormElement = lookup(&document, &defaults.form)?;
    let config = AppConfig::from_lookup(|key| form.get_attribute(&format!("data-{key}")))?;
    log::info!(
        "startup | config | version={} endpoint={} upload_policy={}",
        crate::app_version(),
        config.endpoint,
        config.upload_policy.name()
    );

    let bindings = Rc::new(DomBindings::resolve(document, &config.ids)?);
    let surface = DomSurface(Rc::clone(&bindings));

    let client = ComparisonClient::new(config.endpoint.clone(), FetchTransport)?;
    let submissions = Rc::new(SubmissionController::new(
        client,
        surface.clone(),
        config.upload_policy.selection_policy(),
    ));
    let previews = Rc::new(PreviewController::new(FileReaderPreview, surface));

    for slot in ImageSlot::ALL {
        let bindings_for_change = Rc::clone(&bindings);
        let previews = Rc::clone(&previews);
        let on_change = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
            let file = bindings_for_change.selected_file(slot);
            let previews = Rc::clone(&previews);
            spawn_local(async move {
                previews.on_selection_change(slot, file.as_ref()).await;
            });
        });
        bindings
            .slot(slot)
            .input
            .add_event_listener_with_callback("change", on_change.as_ref().unchecked_ref())
            .map_err(|_| BindingError::WrongElementType(config.ids.input(slot)))?;
        on_change.forget();
    }

    let bindings_for_submit = Rc::clone(&bindings);
    let on_submit = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        event.prevent_default();
        let selection = bindings_for_submit.current_selection();
        let submissions = Rc::clone(&submissions);
        spawn_local(async move {
            submissions.submit(selection).await;
        });
    });
    bindings
        .form
        .add_event_listener_with_callback("submit", on_submit.as_ref().unchecked_ref())
        .map_err(|_| BindingError::WrongElementType(config.ids.form.clone()))?;
    on_submit.forget();

    log::info!("startup | ready | listeners attached");
    Ok(())
}
