use std::rc::Rc;
use std::time::Duration;

use dioxus::core::Task;
use dioxus::prelude::*;
use reqwest::Client;

use crate::error::StreamError;
use crate::models::{ApiError, FlowLog, FlowLogs, FlowLogsContext, FlowLogsView, RowClickHandler};
use crate::services::api::{stream_flow_logs, FlowLogsQuery};
use crate::services::config::AppConfig;
use crate::Route;

pub fn view_for_route(route: &Route) -> FlowLogsView {
    match route {
        Route::DeniedFlowLogs {} => FlowLogsView::Denied,
        _ => FlowLogsView::All,
    }
}

/// Records shown for `view`. The all view shares the buffer itself.
pub fn visible_flow_logs(view: FlowLogsView, flow_logs: &FlowLogs) -> FlowLogs {
    match view {
        FlowLogsView::All => flow_logs.clone(),
        FlowLogsView::Denied => Rc::new(flow_logs.iter().filter(|f| f.is_denied()).cloned().collect()),
    }
}

/// Newest first, never more than `max` entries.
pub fn push_newest(flow_logs: &mut FlowLogs, flow: Rc<FlowLog>, max: usize) {
    let logs = Rc::make_mut(flow_logs);
    logs.push_front(flow);
    logs.truncate(max);
}

/// Buffered records plus the last stream failure. The failure is dropped as
/// soon as the backend answers again, or when the user pauses or clears.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamState {
    pub flow_logs: FlowLogs,
    pub error: Option<Rc<ApiError>>,
}

impl StreamState {
    pub fn connected(&mut self) {
        self.error = None;
    }

    pub fn record(&mut self, flow: FlowLog, max: usize) {
        self.error = None;
        push_newest(&mut self.flow_logs, Rc::new(flow), max);
    }

    pub fn failed(&mut self, err: &StreamError) {
        self.error = Some(Rc::new(ApiError::from(err)));
    }

    pub fn paused(&mut self) {
        self.error = None;
    }

    pub fn clear(&mut self) {
        self.flow_logs = FlowLogs::default();
        self.error = None;
    }

    pub fn denied_count(&self) -> usize {
        self.flow_logs.iter().filter(|f| f.is_denied()).count()
    }
}

/// The context published to the routed child for `view`.
pub fn page_context(view: FlowLogsView, state: &StreamState, on_row_clicked: &RowClickHandler) -> FlowLogsContext {
    FlowLogsContext {
        view,
        flow_logs: visible_flow_logs(view, &state.flow_logs),
        error: state.error.clone(),
        on_row_clicked: on_row_clicked.clone(),
    }
}

async fn run_stream(config: AppConfig, mut state: Signal<StreamState>) {
    let client = Client::new();
    let query = FlowLogsQuery::default();
    let delay = Duration::from_millis(config.reconnect_delay_ms);
    let max = config.max_flow_logs;

    loop {
        let result = stream_flow_logs(
            &client,
            &config,
            &query,
            move || {
                tracing::info!("flow log stream connected");
                state.with_mut(StreamState::connected);
            },
            move |flow| state.with_mut(|s| s.record(flow, max)),
        )
        .await;

        match result {
            Ok(count) => tracing::info!("flow log stream ended after {count} records, reconnecting"),
            Err(e) => {
                tracing::warn!("flow log stream failed: {e}");
                state.with_mut(|s| s.failed(&e));
            }
        }
        tokio::time::sleep(delay).await;
    }
}

/// Layout for the flow log routes. Owns the stream and publishes
/// `FlowLogsContext` to the routed child.
#[component]
pub fn FlowLogsPage() -> Element {
    let config = use_context::<Signal<AppConfig>>();
    let route = use_route::<Route>();
    let view = view_for_route(&route);

    let mut state = use_signal(StreamState::default);
    let mut is_streaming = use_signal(|| config.peek().auto_stream);
    let mut stream_task = use_signal(|| None::<Task>);

    use_effect(move || {
        let streaming = is_streaming();
        if let Some(task) = stream_task.write().take() {
            task.cancel();
        }
        if streaming {
            let cfg = config.peek().clone();
            tracing::info!("starting flow log stream");
            stream_task.set(Some(spawn(run_stream(cfg, state))));
        } else {
            tracing::info!("flow log stream paused");
            state.with_mut(StreamState::paused);
        }
    });

    let on_row_clicked = use_hook(|| {
        RowClickHandler::new(move || {
            let mut streaming = is_streaming;
            if *streaming.peek() {
                tracing::debug!("row selected, pausing stream");
                streaming.set(false);
            }
        })
    });

    let context = use_memo(use_reactive((&view,), move |(view,)| {
        page_context(view, &state.read(), &on_row_clicked)
    }));
    use_context_provider(|| context);

    let total = state.read().flow_logs.len();
    let denied = state.read().denied_count();

    rsx! {
        div { class: "flow-logs-page",
            div { class: "page-header",
                div { class: "title-text", "Flow Logs" }
                div { class: "header-actions",
                    if state.read().error.is_some() {
                        span { class: "stream-status error", "Disconnected" }
                    } else if is_streaming() {
                        span { class: "stream-status live", "Live" }
                    } else {
                        span { class: "stream-status paused", "Paused" }
                    }
                    button {
                        class: "icon-btn",
                        title: if is_streaming() { "Pause" } else { "Play" },
                        onclick: move |_| {
                            let next = !is_streaming();
                            is_streaming.set(next);
                        },
                        if is_streaming() { "⏸" } else { "▶" }
                    }
                    button {
                        class: "icon-btn",
                        title: "Clear",
                        onclick: move |_| state.with_mut(StreamState::clear),
                        "🗑"
                    }
                }
            }

            div { class: "tabs",
                Link {
                    class: if view == FlowLogsView::All { "tab active" } else { "tab" },
                    to: Route::FlowLogsContainer {},
                    "All Flows ({total})"
                }
                Link {
                    class: if view == FlowLogsView::Denied { "tab active" } else { "tab" },
                    to: Route::DeniedFlowLogs {},
                    "Denied Flows ({denied})"
                }
            }

            div { class: "content-area", Outlet::<Route> {} }
        }
    }
}
