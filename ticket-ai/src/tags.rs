//! Tag suggestions for new tickets.
//!
//! Same invocation pattern as the recommendation path, with a simpler
//! line-oriented parse. Independent of the vector pipeline.

use tokio::time::timeout;
use tracing::{debug, warn};

use crate::AiService;
use crate::labels::{category_label, source_label};

/// Maximum number of tags returned.
const MAX_TAGS: usize = 5;
/// Longest accepted tag, in characters.
const MAX_TAG_CHARS: usize = 10;

/// Generates 0–5 short tags for a ticket description.
///
/// Returns an empty list on any failure or timeout; this path never raises.
pub(crate) async fn generate_tags(
    svc: &AiService,
    description: &str,
    category: &str,
    system_source: &str,
) -> Vec<String> {
    let Some(generator) = svc.generator() else {
        debug!("tag generation skipped: generation provider not configured");
        return Vec::new();
    };

    let prompt = build_tag_prompt(description, category, system_source);

    let budget = svc.config().generation_timeout + svc.config().generation_buffer;
    match timeout(budget, generator.generate(&prompt)).await {
        Err(_) => {
            warn!("timeout generating tags");
            Vec::new()
        }
        Ok(Err(err)) => {
            warn!(error = %err, "error generating tags");
            Vec::new()
        }
        Ok(Ok(text)) => parse_tags(&text),
    }
}

/// Builds the tag-suggestion prompt.
pub(crate) fn build_tag_prompt(description: &str, category: &str, system_source: &str) -> String {
    let category_name = category_label(category);
    let source_name = source_label(system_source);

    format!(
        "你是一个售后工单系统的标签分析助手。请根据以下工单信息，生成3-5个合适的标签。\n\
\n\
## 工单信息\n\
- 来源系统: {source_name}\n\
- 工单类型: {category_name}\n\
- 问题描述: {description}\n\
\n\
## 标签要求\n\
1. 标签应该简洁明了，2-6个字为宜\n\
2. 标签应该能概括问题的关键特征\n\
3. 可以包含：问题类型、紧急程度、影响范围、涉及的模块等\n\
4. 标签应该是通用的，便于后续筛选和统计\n\
\n\
## 常见标签示例\n\
- 订单异常、支付问题、物流延迟、库存问题\n\
- 系统报错、接口超时、数据不一致、权限问题\n\
- 紧急、高优先级、需跟进、已复现\n\
- TMS相关、OMS相关、WMS相关\n\
- 用户投诉、批量问题、偶发问题\n\
\n\
请直接输出标签，每行一个，不要输出其他内容。"
    )
}

/// Parses the generated response into at most [`MAX_TAGS`] tags.
///
/// One tag per line; leading enumeration markers and bullets are stripped,
/// lines longer than [`MAX_TAG_CHARS`] characters are discarded.
pub(crate) fn parse_tags(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| {
            line.trim()
                .trim_start_matches(|c: char| {
                    c.is_ascii_digit() || matches!(c, '.' | '-' | '•' | '、' | ' ')
                })
                .to_string()
        })
        .filter(|tag| !tag.is_empty() && tag.chars().count() <= MAX_TAG_CHARS)
        .take(MAX_TAGS)
        .collect()
}
