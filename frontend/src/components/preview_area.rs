use super::handlers::sorted_files;
use super::results::{render_result_badge, render_waiting_hint};
use super::utils::debounce;
use crate::{FileData, Model, Msg};
use shared::MAX_BATCH_IMAGES;
use yew::prelude::*;

pub fn render_preview_area(model: &Model, ctx: &Context<Model>) -> Html {
    if model.files.is_empty() {
        return html! {};
    }

    let link = ctx.link().clone();
    let pending = sorted_files(model)
        .iter()
        .filter(|fd| !model.results.contains_key(&fd.identity()))
        .count();

    html! {
        <div id="preview-container">
            <h2>{ format!("Images: {} / {}", model.files.len(), MAX_BATCH_IMAGES) }</h2>
            <div id="image-previews">
                {
                    sorted_files(model)
                        .iter()
                        .map(|file_data| render_preview_item(ctx, model, file_data))
                        .collect::<Html>()
                }
            </div>
            <div class="button-container">
                <button
                    id="reset-btn"
                    class="analyze-btn"
                    style="background-color: var(--danger-color);"
                    onclick={debounce(300, {
                        let link = link.clone();
                        move || link.send_message(Msg::ResetSession)
                    })}
                >
                    <i class="fa-solid fa-trash"></i>{" Reset Session"}
                </button>
                <button
                    id="start-scan-btn"
                    class="analyze-btn"
                    style="background-color: var(--primary-color);"
                    onclick={debounce(300, {
                        let link = link.clone();
                        move || link.send_message(Msg::StartScan)
                    })}
                    disabled={model.loading || pending == 0}
                >
                    { render_scan_button_content(model, pending) }
                </button>
            </div>
        </div>
    }
}

fn render_scan_button_content(model: &Model, pending: usize) -> Html {
    if model.loading {
        html! { <><i class="fa-solid fa-spinner fa-spin"></i>{" Scanning..."}</> }
    } else if pending == 0 {
        html! { <><i class="fa-solid fa-check"></i>{" All images scanned"}</> }
    } else {
        html! { <><i class="fa-solid fa-rocket"></i>{ format!(" Start Scan ({} new)", pending) }</> }
    }
}

fn render_preview_item(ctx: &Context<Model>, model: &Model, file_data: &FileData) -> Html {
    let file_id = file_data.id;
    let link = ctx.link();

    html! {
        <div
            class="preview-item"
            key={file_id.to_string()}
            title={file_data.file.name()}
        >
            {
                if let Some(url) = &file_data.preview_url {
                    html! { <img src={url.to_string()} alt={file_data.file.name()} /> }
                } else {
                    html! { <div class="preview-placeholder preview-placeholder-centered">{"..."}</div> }
                }
            }
            <button
                class="remove-btn"
                title="Remove this image"
                onclick={link.callback(move |e: MouseEvent| {
                    e.stop_propagation();
                    Msg::RemoveFile(file_id)
                })}
            >
                <i class="fa-solid fa-times" style="font-size: 10px;"></i>
            </button>
            <p class="preview-filename">{ file_data.file.name() }</p>
            {
                match model.results.get(&file_data.identity()) {
                    Some(result) => render_result_badge(result),
                    None => render_waiting_hint(),
                }
            }
        </div>
    }
}
