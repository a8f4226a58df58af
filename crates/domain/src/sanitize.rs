//! 自由文本净化。
//!
//! 入库前去除标记内容和控制字符。纯函数，总是成功。

/// 净化自由文本：丢弃 `<`..`>` 之间的内容（含括号本身，
/// 未闭合的 `<` 丢弃到行尾）、丢弃控制字符，并去除首尾空白。
///
/// 输出不再含尖括号，因此满足 `sanitize(sanitize(x)) == sanitize(x)`。
pub fn sanitize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_tag = false;
    for ch in input.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if in_tag => {}
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out.trim().to_owned()
}
