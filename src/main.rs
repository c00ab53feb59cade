#![allow(non_snake_case)]

mod components;
mod error;
mod models;
mod services;

use dioxus::desktop::{Config, LogicalSize, WindowBuilder};
use dioxus::prelude::*;

use components::{flow_logs_container::FlowLogsContainer, flow_logs_page::FlowLogsPage};
use services::config::load_config;

#[derive(Routable, Clone, PartialEq, Debug)]
#[rustfmt::skip]
pub enum Route {
    #[layout(FlowLogsPage)]
        #[route("/")]
        FlowLogsContainer {},
        #[route("/denied")]
        DeniedFlowLogs {},
    #[end_layout]
    #[route("/:..segments")]
    NotFound { segments: Vec<String> },
}

fn main() {
    dioxus_logger::init(tracing::Level::INFO).expect("failed to init logger");

    let window_builder = WindowBuilder::new()
        .with_title("Whisker Flows")
        .with_inner_size(LogicalSize::new(1200.0, 760.0));

    let config = Config::new().with_window(window_builder);

    LaunchBuilder::desktop().with_cfg(config).launch(App);
}

#[component]
fn App() -> Element {
    use_context_provider(|| Signal::new(load_config()));

    rsx! {
        document::Stylesheet { href: asset!("/assets/main.css") }

        ErrorBoundary {
            handle_error: |error: ErrorContext| {
                tracing::error!("render failed: {error:?}");
                rsx! {
                    div { class: "list-status error",
                        div { class: "error-title", "Something went wrong" }
                        pre { class: "error-message", "{error:?}" }
                    }
                }
            },
            Router::<Route> {}
        }
    }
}

/// Same adapter as the all-flows route; the layout narrows the records.
#[component]
fn DeniedFlowLogs() -> Element {
    rsx! {
        FlowLogsContainer {}
    }
}

#[component]
fn NotFound(segments: Vec<String>) -> Element {
    let path = segments.join("/");
    rsx! {
        div { class: "list-status empty",
            div { "Nothing at /{path}" }
            Link { to: Route::FlowLogsContainer {}, "Back to flow logs" }
        }
    }
}
