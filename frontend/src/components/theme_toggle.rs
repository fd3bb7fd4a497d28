use crate::{Model, Msg};
use yew::html::Scope;
use yew::prelude::*;

pub fn render_theme_toggle(theme: &str, link: &Scope<Model>) -> Html {
    let icon = if theme == "light" {
        "fa-solid fa-sun"
    } else {
        "fa-solid fa-moon"
    };

    html! {
        <div class="top-right">
            <button
                id="theme-toggle"
                class="theme-toggle"
                onclick={link.callback(|_| Msg::ToggleTheme)}
                title={ if theme == "light" { "Switch to Dark Mode" } else { "Switch to Light Mode" } }
            >
                <i class={icon}></i>
            </button>
        </div>
    }
}
