//! 在截图页面中执行的脚本
//!
//! 每个脚本都是返回 JSON 值的立即执行函数，执行器总能拿到结果。

use serde_json::to_string as js_string;

use crate::models::Background;

/// 模板设置就绪全局变量后为 `true`
pub fn readiness_script(flag: &str) -> String {
    format!("window[{}] === true", js_literal(flag))
}

/// 将文档和指定容器设置为背景色
pub fn background_script(background: Background, container_id: &str) -> String {
    format!(
        r#"(() => {{
    const bg = {bg};
    document.body.style.background = bg;
    document.documentElement.style.background = bg;
    const container = document.getElementById({id});
    if (container) {{
        container.style.background = bg;
    }}
    return true;
}})()"#,
        bg = js_literal(background.css_value()),
        id = js_literal(container_id),
    )
}

/// 以左上角为原点缩放容器；找不到容器时返回 `false`
pub fn scale_script(factor: f64, selector: &str) -> String {
    format!(
        r#"(() => {{
    const container = document.querySelector({selector});
    if (!container) {{
        return false;
    }}
    container.style.transform = {transform};
    container.style.transformOrigin = 'top left';
    return true;
}})()"#,
        selector = js_literal(selector),
        transform = js_literal(&format!("scale({})", factor)),
    )
}

fn js_literal(value: &str) -> String {
    // JSON 字符串即合法的 JS 字符串字面量
    js_string(value).unwrap_or_else(|_| "\"\"".to_string())
}
