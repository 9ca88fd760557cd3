use std::fmt::Display;

/// Deterministic stand-in analysis used when the remote service fails.
/// Carries the same three section headers as a real analysis plus a note
/// naming the captured error, so callers always receive usable text.
pub fn fallback_analysis(title: &str, author: &str, error: impl Display) -> String {
    format!(
        "【创作背景】这首{title}是{author}的代表作之一，创作于特定的历史时期。\n\n\
         【意象解读】诗中运用了丰富的意象手法，通过具体景物表达抽象情感。\n\n\
         【情感表达】作者通过这首诗抒发了深刻的思想感情，具有很高的艺术价值。\n\n\
         （注：当前使用备用分析结果，AI服务调用异常：{error}）"
    )
}
