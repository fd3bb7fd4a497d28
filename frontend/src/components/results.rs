use crate::Model;
use shared::{ScanOutcome, ScanResponse, SERIAL_CODE_LENGTH};
use std::collections::HashSet;
use yew::prelude::*;

/// Cleaned code plus a completeness badge, or the failure message.
/// The length check is display-side: interior whitespace is stripped first,
/// and failures never get a completeness verdict.
pub fn render_result_badge(result: &ScanResponse) -> Html {
    match &result.outcome {
        ScanOutcome::Failed { message } => html! {
            <div class="scan-error">
                <i class="fa-solid fa-circle-exclamation"></i>
                <p>{ message }</p>
            </div>
        },
        outcome @ ScanOutcome::Recognized { .. } => {
            let cleaned = outcome.cleaned().unwrap_or_default();
            let length = cleaned.chars().count();
            let complete = outcome.is_complete();

            html! {
                <div class={classes!("scan-result", if complete { "complete" } else { "incomplete" })}>
                    <code class="serial-code">{ cleaned }</code>
                    {
                        if complete {
                            html! {
                                <span class="code-badge ok">
                                    <i class="fa-solid fa-check"></i>
                                    { format!(" {} characters", SERIAL_CODE_LENGTH) }
                                </span>
                            }
                        } else {
                            html! {
                                <span class="code-badge warn">
                                    <i class="fa-solid fa-triangle-exclamation"></i>
                                    { format!(" read {} characters", length) }
                                </span>
                            }
                        }
                    }
                </div>
            }
        }
    }
}

pub fn render_waiting_hint() -> Html {
    html! {
        <p class="waiting-hint">{"Waiting for Start Scan..."}</p>
    }
}

/// Results restored from the session cache whose files are no longer loaded
/// in this tab (e.g. after a reload). Shown without thumbnails.
pub fn render_restored_results(model: &Model) -> Html {
    let loaded_identities: HashSet<String> = model
        .files
        .values()
        .map(|file_data| file_data.identity())
        .collect();

    let mut restored: Vec<&ScanResponse> = model
        .results
        .values()
        .filter(|result| !loaded_identities.contains(&result.identity))
        .collect();

    if restored.is_empty() {
        return html! {};
    }
    restored.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    html! {
        <div class="restored-results">
            <h3><i class="fa-solid fa-clock-rotate-left"></i>{" Earlier in this session"}</h3>
            {
                restored
                    .iter()
                    .map(|result| html! {
                        <div class="restored-row" key={result.identity.clone()}>
                            <span class="restored-filename">{ &result.file_name }</span>
                            { render_result_badge(result) }
                        </div>
                    })
                    .collect::<Html>()
            }
        </div>
    }
}
