use std::rc::Rc;

use dioxus::prelude::*;

use crate::models::{FlowLog, PolicyHit};

fn policy_line(hit: &PolicyHit) -> String {
    let scope = if hit.namespace.is_empty() {
        hit.tier.clone()
    } else {
        format!("{}/{}", hit.tier, hit.namespace)
    };
    format!(
        "{} {} [{}] rule {} -> {}",
        hit.kind, hit.name, scope, hit.rule_index, hit.action
    )
}

fn detail_rows(flow: &FlowLog) -> Vec<(&'static str, String)> {
    vec![
        ("Start time", flow.start_time.clone()),
        ("End time", flow.end_time.clone()),
        ("Action", flow.action.to_string()),
        ("Reporter", flow.reporter.clone()),
        ("Source", format!("{}/{}", flow.source_namespace, flow.source_name)),
        ("Source labels", flow.source_labels.clone()),
        ("Destination", format!("{}/{}", flow.dest_namespace, flow.dest_name)),
        ("Destination labels", flow.dest_labels.clone()),
        ("Protocol", flow.protocol.clone()),
        ("Port", flow.dest_port.to_string()),
        ("Packets in / out", format!("{} / {}", flow.packets_in, flow.packets_out)),
        ("Bytes in / out", format!("{} / {}", flow.bytes_in, flow.bytes_out)),
    ]
}

#[component]
pub fn FlowLogDetails(flow: Rc<FlowLog>) -> Element {
    let mut show_json = use_signal(|| false);

    let rows = detail_rows(&flow);
    let enforced: Vec<String> = flow.policies.enforced.iter().map(policy_line).collect();
    let pending: Vec<String> = flow.policies.pending.iter().map(policy_line).collect();
    let raw = serde_json::to_string_pretty(flow.as_ref()).unwrap_or_else(|e| format!("unable to render: {e}"));

    rsx! {
        div { class: "flow-details",
            div { class: "details-tabs",
                div {
                    class: if !show_json() { "details-tab active" } else { "details-tab" },
                    onclick: move |evt| {
                        evt.stop_propagation();
                        show_json.set(false);
                    },
                    "Details"
                }
                div {
                    class: if show_json() { "details-tab active" } else { "details-tab" },
                    onclick: move |evt| {
                        evt.stop_propagation();
                        show_json.set(true);
                    },
                    "JSON"
                }
            }

            if show_json() {
                pre { class: "details-json", "{raw}" }
            } else {
                table { class: "details-table",
                    tbody {
                        for (label, value) in rows {
                            tr {
                                th { "{label}" }
                                td { "{value}" }
                            }
                        }
                        tr {
                            th { "Enforced policies" }
                            td {
                                for line in enforced {
                                    div { "{line}" }
                                }
                            }
                        }
                        tr {
                            th { "Pending policies" }
                            td {
                                for line in pending {
                                    div { "{line}" }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Action;

    #[test]
    fn policy_line_with_namespace() {
        let hit = PolicyHit {
            kind: "NetworkPolicy".into(),
            name: "deny-frontend".into(),
            namespace: "data".into(),
            tier: "default".into(),
            action: Action::Deny,
            rule_index: 1,
            ..PolicyHit::default()
        };
        assert_eq!(policy_line(&hit), "NetworkPolicy deny-frontend [default/data] rule 1 -> Deny");
    }

    #[test]
    fn global_policy_has_tier_only() {
        let hit = PolicyHit {
            kind: "GlobalNetworkPolicy".into(),
            name: "allow-dns".into(),
            tier: "platform".into(),
            action: Action::Allow,
            ..PolicyHit::default()
        };
        assert_eq!(policy_line(&hit), "GlobalNetworkPolicy allow-dns [platform] rule 0 -> Allow");
    }

    #[test]
    fn details_cover_counters() {
        let flow = FlowLog {
            packets_in: 4,
            packets_out: 2,
            bytes_in: 400,
            bytes_out: 120,
            ..FlowLog::default()
        };
        let rows = detail_rows(&flow);
        assert!(rows.contains(&("Packets in / out", "4 / 2".to_string())));
        assert!(rows.contains(&("Bytes in / out", "400 / 120".to_string())));
    }
}
