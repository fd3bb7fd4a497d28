use yew::prelude::*;

/// Renders the application header
pub fn render_header() -> Html {
    html! {
        <header class="app-header">
            <h1><i class="fa-solid fa-bolt"></i> {" Cap Serial Scanner"}</h1>
            <p class="subtitle">{"Reads 12-character dot-matrix codes from bottle cap photos"}</p>
            <p class="model-note">{"Model: gemini-pro-latest (Batch Mode)"}</p>
        </header>
    }
}
