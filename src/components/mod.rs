pub mod flow_log_details;
pub mod flow_logs_container;
pub mod flow_logs_list;
pub mod flow_logs_page;
