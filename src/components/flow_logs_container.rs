use dioxus::prelude::*;

use crate::components::flow_logs_list::{FlowLogsList, FlowLogsListProps};
use crate::error::MissingContextError;
use crate::models::FlowLogsContext;

/// Map the layout's context onto the list's props. `view` is not consulted
/// and nothing is loading: the records are already streamed in by the layout.
pub fn list_props(context: &FlowLogsContext) -> FlowLogsListProps {
    FlowLogsListProps {
        flow_logs: context.flow_logs.clone(),
        is_loading: false,
        error: context.error.clone(),
        on_row_clicked: context.on_row_clicked.clone(),
    }
}

/// Routed child of `FlowLogsPage`: renders whatever flow logs the page publishes.
#[component]
pub fn FlowLogsContainer() -> Element {
    let context = try_use_context::<Memo<FlowLogsContext>>()
        .ok_or(MissingContextError("FlowLogsContext"))?;
    let props = list_props(&context.read());

    rsx! {
        FlowLogsList {
            flow_logs: props.flow_logs,
            is_loading: props.is_loading,
            error: props.error,
            on_row_clicked: props.on_row_clicked,
        }
    }
}
