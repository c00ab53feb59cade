use std::rc::Rc;

use dioxus::prelude::*;
use uuid::Uuid;

use crate::components::flow_log_details::FlowLogDetails;
use crate::models::{Action, ApiError, FlowLog, FlowLogs, RowClickHandler};

const COLUMNS: [&str; 9] = [
    "Start Time",
    "End Time",
    "Action",
    "Source Namespace",
    "Source",
    "Dest Namespace",
    "Dest",
    "Protocol",
    "Port",
];

#[derive(Props, Clone, PartialEq)]
pub struct FlowLogsListProps {
    pub flow_logs: FlowLogs,
    pub is_loading: bool,
    #[props(!optional)]
    pub error: Option<Rc<ApiError>>,
    pub on_row_clicked: RowClickHandler,
}

fn action_class(action: Action) -> &'static str {
    match action {
        Action::Allow => "action-badge allow",
        Action::Deny => "action-badge deny",
        Action::Pass => "action-badge pass",
        Action::Unknown => "action-badge",
    }
}

fn error_text(error: &ApiError) -> String {
    match error.status {
        Some(status) => format!("{} (HTTP {status})", error.message),
        None => error.message.clone(),
    }
}

#[component]
pub fn FlowLogsList(props: FlowLogsListProps) -> Element {
    let expanded = use_signal(|| None::<Uuid>);

    if props.is_loading {
        return rsx! {
            div { class: "list-status loading", "Loading flow logs..." }
        };
    }

    if let Some(error) = &props.error {
        let text = error_text(error);
        return rsx! {
            div { class: "list-status error",
                div { class: "error-title", "Could not load flow logs" }
                div { class: "error-message", "{text}" }
            }
        };
    }

    if props.flow_logs.is_empty() {
        return rsx! {
            div { class: "list-status empty", "No flow logs yet" }
        };
    }

    let rows = props.flow_logs.iter().map(|flow: &Rc<FlowLog>| {
        let mut expanded = expanded;
        let flow_id = flow.id;
        let is_open = expanded() == Some(flow_id);
        let on_row_clicked = props.on_row_clicked.clone();

        rsx! {
            tbody { key: "{flow_id}",
                tr {
                    class: if is_open { "flow-row open" } else { "flow-row" },
                    onclick: move |_| {
                        let next = if expanded() == Some(flow_id) { None } else { Some(flow_id) };
                        expanded.set(next);
                        on_row_clicked.call();
                    },
                    td { "{flow.start_time}" }
                    td { "{flow.end_time}" }
                    td {
                        span { class: action_class(flow.action), "{flow.action}" }
                    }
                    td { "{flow.source_namespace}" }
                    td { "{flow.source_name}" }
                    td { "{flow.dest_namespace}" }
                    td { "{flow.dest_name}" }
                    td { "{flow.protocol}" }
                    td { "{flow.dest_port}" }
                }
                if is_open {
                    tr { class: "flow-details-row",
                        td { colspan: "{COLUMNS.len()}",
                            FlowLogDetails { flow: flow.clone() }
                        }
                    }
                }
            }
        }
    });

    rsx! {
        div { class: "table-container",
            table { class: "flow-table",
                thead {
                    tr {
                        for column in COLUMNS {
                            th { "{column}" }
                        }
                    }
                }
                {rows}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_text_includes_status_when_known() {
        let mut error = ApiError::new("upstream timeout");
        assert_eq!(error_text(&error), "upstream timeout");
        error.status = Some(504);
        assert_eq!(error_text(&error), "upstream timeout (HTTP 504)");
    }

    #[test]
    fn deny_rows_get_deny_badge() {
        assert_eq!(action_class(Action::Deny), "action-badge deny");
        assert_eq!(action_class(Action::Unknown), "action-badge");
    }
}
