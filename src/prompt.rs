/// Renders the fixed analysis instruction for one poem. Pure and
/// deterministic; the three sections and length caps mirror what the
/// frontend expects to display.
pub fn compose_prompt(title: &str, author: &str, content: &str) -> String {
    let mut prompt = String::with_capacity(content.len() + 300);
    prompt.push_str("请你以中学生能理解的语言，分析以下诗词：\n");
    prompt.push_str(&format!("标题：{}\n", title));
    prompt.push_str(&format!("作者：{}\n", author));
    prompt.push_str(&format!("原文：{}\n\n", content));
    prompt.push_str("请按照以下三个部分进行分析，每个部分不超过100字：\n\n");
    prompt.push_str("1. 创作背景：简单说明作者写这首诗时的情况或当时的历史背景；\n");
    prompt.push_str("2. 意象解读：解释诗中关键事物（如月亮、山水）的含义；\n");
    prompt.push_str("3. 情感表达：说明这首诗传递了作者什么感情。\n\n");
    prompt.push_str("要求：\n");
    prompt.push_str("- 语言要口语化，通俗易懂\n");
    prompt.push_str("- 不要使用复杂术语\n");
    prompt.push_str("- 分析要准确、有深度\n");
    prompt.push_str("- 总字数控制在300字以内");
    prompt
}
