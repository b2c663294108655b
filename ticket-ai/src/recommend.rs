//! Grounded handling recommendations.
//!
//! The prompt hard-constrains the model to recommend only from retrieved
//! resolution details and to cite only ids from the supplied allowlist; the
//! citation footer is additionally scrubbed after generation so a
//! fabricated id can never reach the caller.

use std::sync::LazyLock;

use regex::Regex;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::AiService;
use crate::labels::{category_label, source_label};
use crate::similarity::Candidate;
use ticket_store::Ticket;

/// External ticket id shape (`AS-YYYYMMDD-NN`).
static TICKET_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"AS-\d{8}-\d{2}").expect("ticket id regex"));

/// Marker opening the citation footer in the generated text.
const CITATION_MARKER: &str = "参考工单";

/// Sentence the model must emit when there is nothing to cite.
const NO_SIMILAR: &str = "无相似工单";

/// Generates a handling recommendation for `ticket_id` grounded in similar
/// resolved tickets.
///
/// Returns `None` when the ticket does not exist, when no generation
/// provider is configured, or on any provider failure or timeout; this
/// path never raises.
pub(crate) async fn generate_recommendation(svc: &AiService, ticket_id: &str) -> Option<String> {
    let Some(generator) = svc.generator() else {
        debug!("recommendation skipped: generation provider not configured");
        return None;
    };

    let ticket = match svc.repo().get_by_id(ticket_id).await {
        Ok(Some(t)) => t,
        Ok(None) => return None,
        Err(err) => {
            // A store failure while fetching the current ticket is treated
            // as "not found", keeping the core ticket flow available.
            warn!(ticket_id, error = %err, "ticket lookup failed");
            return None;
        }
    };

    let candidates = match crate::similarity::find_similar(svc, &ticket.description, 3).await {
        Ok(c) => c,
        Err(err) => {
            warn!(ticket_id, error = %err, "similarity search failed during recommendation");
            return None;
        }
    };

    let prompt = build_recommendation_prompt(&ticket, &candidates);
    debug!(ticket_id, prompt_len = prompt.len(), "recommendation prompt built");

    let budget = svc.config().generation_timeout + svc.config().generation_buffer;
    match timeout(budget, generator.generate(&prompt)).await {
        Err(_) => {
            warn!(ticket_id, "timeout generating recommendation");
            None
        }
        Ok(Err(err)) => {
            warn!(ticket_id, error = %err, "error generating recommendation");
            None
        }
        Ok(Ok(text)) => {
            let allowlist: Vec<String> = candidates.into_iter().map(|c| c.ticket_id).collect();
            let cleaned = sanitize_citations(text.trim(), &allowlist);
            info!(ticket_id, response_len = cleaned.len(), "recommendation generated");
            Some(cleaned)
        }
    }
}

/// Builds the grounded prompt from the current ticket and its candidates.
pub(crate) fn build_recommendation_prompt(ticket: &Ticket, candidates: &[Candidate]) -> String {
    let category_name = category_label(ticket.category.as_str());
    let source_name = source_label(ticket.system_source.as_str());

    let mut similar_context = String::new();
    let mut ticket_ids: Vec<&str> = Vec::new();
    if !candidates.is_empty() {
        similar_context.push_str("\n## 历史相似工单及处理方式\n\n");
        for (i, c) in candidates.iter().enumerate() {
            ticket_ids.push(&c.ticket_id);
            similar_context.push_str(&format!("### 相似工单 {}\n", i + 1));
            similar_context.push_str(&format!("- 工单编号: {}\n", c.ticket_id));
            similar_context.push_str(&format!(
                "- 相似度: {:.1}%\n",
                c.score.unwrap_or(0.0) * 100.0
            ));
            similar_context.push_str(&format!("- 问题描述: {}\n", c.description));
            similar_context.push_str(&format!("- 处理详情: {}\n", c.handle_detail));
            if let Some(template) = &c.solution_template {
                similar_context.push_str(&format!("- 解决方案模板: {}\n", template));
            }
            similar_context.push('\n');
        }
    }

    let available_ids = if ticket_ids.is_empty() {
        "无".to_string()
    } else {
        ticket_ids
            .iter()
            .map(|id| format!("- {id}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "你是一个售后工单处理助手。你只能根据历史相似工单的处理详情，为当前工单推荐处理步骤。\n\
\n\
## 当前工单信息\n\
- 工单编号: {id}\n\
- 来源系统: {source}\n\
- 工单类型: {category}\n\
- 问题描述: {description}\n\
\n\
{similar_context}\n\
\n\
## 严格要求\n\
1. 如果没有历史相似工单，必须回答\"暂无相似工单推荐\"\n\
2. 如果有历史相似工单，推荐的处理步骤必须来自上述相似工单的\"处理详情\"，不能自己凭空编造，可以根据当前问题的具体情况，对历史处理步骤进行适当的顺序调整或合并，但不能添加新的内容\n\
3. 输出格式要清晰，便于阅读和执行\n\
4. 在输出内容的最后，必须列出你参考的工单编号（**只能使用下面列出的真实编号，如果可用真实工单编号没有，就显示 无相似工单**）：\n\
\n\
可用的真实工单编号：\n\
{available_ids}\n\
\n\
---\n\
**参考工单：**\n\
（只能填写上面列出的真实编号）\n\
- AS-XXXXXXXX-XX\n\
- ...\n\
\n\
请直接输出处理步骤，不要输出开场白或其他无关内容。",
        id = ticket.id,
        source = source_name,
        category = category_name,
        description = ticket.description,
        similar_context = similar_context,
        available_ids = available_ids,
    )
}

/// Strips fabricated identifiers from the citation footer.
///
/// Everything before the last citation marker is returned verbatim; within
/// the footer, any line citing an id outside `allowlist` is dropped. If no
/// citation survives, the footer states "无相似工单" instead.
pub(crate) fn sanitize_citations(text: &str, allowlist: &[String]) -> String {
    let Some(idx) = text.rfind(CITATION_MARKER) else {
        return text.to_string();
    };

    let (body, footer) = text.split_at(idx);

    let mut kept_lines: Vec<&str> = Vec::new();
    let mut cited = 0usize;
    for line in footer.lines() {
        let ids: Vec<&str> = TICKET_ID_RE.find_iter(line).map(|m| m.as_str()).collect();
        if ids.is_empty() {
            kept_lines.push(line);
            continue;
        }
        if ids.iter().all(|id| allowlist.iter().any(|a| a == id)) {
            cited += ids.len();
            kept_lines.push(line);
        }
    }

    let mut out = String::with_capacity(text.len());
    out.push_str(body);
    out.push_str(&kept_lines.join("\n"));

    if cited == 0 && !footer.contains(NO_SIMILAR) {
        out.push('\n');
        out.push_str(NO_SIMILAR);
    }

    out
}
