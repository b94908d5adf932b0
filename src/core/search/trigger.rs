//! Lexical rules deciding whether a message needs live web results.

use regex::Regex;
use std::sync::LazyLock;

/// Informational-intent markers. Any match triggers a search.
const INTENT_PATTERNS: [&str; 7] = [
    // interrogatives
    r"(?i)\b(what is|what's|what are|how|where|when|who is|which)\b",
    // time-sensitive
    r"(?i)\b(latest|today|tonight|tomorrow|yesterday|right now|currently|this (week|month|year)|last (week|month|year)|next (week|month|year))\b",
    // live domains
    r"(?i)\b(weather|forecast|news|headlines|stock price|share price|exchange rate|score|scores)\b",
    // tutorials and comparisons
    r"(?i)\b(how to|steps|tutorial|guide|comparison|compare|versus|difference between|review)\b",
    r"(搜索|查|找|了解|知道|什么是|是什么|怎么样|如何|怎么|哪里|哪儿|哪个|哪些|谁是|谁的|几点|时间|日期|天气|新闻|最新|最近|现在)",
    r"(天气|新闻|股价|比分|时间|日期|定义|解释|介绍|攻略|评测|比较|区别|方法|步骤|教程|怎么做)",
    r"(最新|最近|现在|今天|明天|昨天|今年|去年|这个月|下个月|上个月)",
];

/// Explicit query prefixes, matched against the trimmed start of the text.
const PREFIX_PATTERN: &str =
    r"(?i)^(please tell me|i want to know|i'd like to know|query:|查询|请问|我想了解|我想知道)";

static INTENT_RULES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    INTENT_PATTERNS
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
});

static PREFIX_RULE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(PREFIX_PATTERN).ok());

/// Whether `text` should be augmented with web search results.
///
/// Pure and deterministic. Empty or absent text never searches; any
/// question mark (ASCII or full-width) always does.
pub fn should_search(text: Option<&str>) -> bool {
    let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
        return false;
    };

    if text.contains(['?', '？']) {
        return true;
    }

    if PREFIX_RULE.as_ref().is_some_and(|re| re.is_match(text)) {
        return true;
    }

    INTENT_RULES.iter().any(|re| re.is_match(text))
}
