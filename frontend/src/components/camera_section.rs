use super::utils::{debounce, extract_image_files};
use crate::{Model, Msg};
use wasm_bindgen::JsCast;
use web_sys::HtmlInputElement;
use yew::prelude::*;

/// Single live capture. On supporting (mostly mobile) browsers the
/// `capture` attribute opens the camera directly; elsewhere it degrades to
/// a file picker. The photo is scanned the moment it is taken.
pub fn render_camera_section(model: &Model, ctx: &Context<Model>) -> Html {
    let link = ctx.link();

    let handle_capture = link.callback(|e: Event| {
        let input: HtmlInputElement = e.target_unchecked_into();
        let files = input.files();
        let captured = files.as_ref().map(extract_image_files).unwrap_or_default();

        input.set_value("");

        match captured.into_iter().next() {
            Some(file) => Msg::CaptureScan(file),
            None => Msg::SetError(Some("No photo captured.".into())),
        }
    });

    let trigger_camera_input = Callback::from(|_| {
        if let Some(input) = web_sys::window()
            .unwrap()
            .document()
            .unwrap()
            .get_element_by_id("camera-input")
        {
            if let Ok(html_input) = input.dyn_into::<web_sys::HtmlElement>() {
                html_input.click();
            }
        }
    });

    html! {
        <div class="camera-section">
            <input
                type="file"
                id="camera-input"
                accept="image/*"
                capture="environment"
                style="display: none;"
                onchange={handle_capture}
            />
            <button
                id="camera-button"
                class="analyze-btn camera-btn"
                onclick={debounce(300, {
                    let trigger_camera_input = trigger_camera_input.clone();
                    move || trigger_camera_input.emit(())
                })}
            >
                <i class="fa-solid fa-camera"></i>{" Take Photo"}
            </button>
            <p class="camera-hint">{"A capture is scanned immediately."}</p>
            {
                if model.loading {
                    html! {
                        <p class="camera-progress">
                            <i class="fa-solid fa-spinner fa-spin"></i>{" Reading code..."}
                        </p>
                    }
                } else {
                    html! {}
                }
            }
        </div>
    }
}
