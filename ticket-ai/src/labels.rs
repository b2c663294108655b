//! Human-readable (localized) labels used inside LLM prompts.
//!
//! Unknown codes fall through unchanged so new enum values degrade to their
//! wire name instead of breaking prompt construction.

pub(crate) fn category_label(code: &str) -> &str {
    match code {
        "TICKET_PROCESS" => "工单处理",
        "SYSTEM_FAILURE" => "系统故障",
        "COST_OPTIMIZATION" => "系统提升",
        other => other,
    }
}

pub(crate) fn source_label(code: &str) -> &str {
    match code {
        "TMS" => "TMS运输管理系统",
        "OMS" => "OMS订单管理系统",
        "WMS" => "WMS仓储管理系统",
        other => other,
    }
}
