//! 打印内容编码
//!
//! 咕咕机只接受 GBK 文本，打印内容格式为 `T:` 前缀加 base64(GBK 字节)。

use base64::{engine::general_purpose::STANDARD, Engine as _};
use encoding_rs::GBK;
use tracing::debug;

/// 文本段前缀
pub const TEXT_PART_PREFIX: &str = "T:";

/// 将 UTF-8 文本编码为 GBK 字节
///
/// GBK 无法表示的字符会被替换为 HTML 数字实体 (`&#NNNN;`)。
pub fn to_gbk(text: &str) -> Vec<u8> {
    let (bytes, _, had_unmappable) = GBK.encode(text);
    if had_unmappable {
        debug!("text contains characters outside GBK; replaced with numeric references");
    }
    bytes.into_owned()
}

/// 构造 printpaper 接口的 `printcontent` 字段
pub fn encode_text_part(text: &str) -> String {
    format!("{TEXT_PART_PREFIX}{}", STANDARD.encode(to_gbk(text)))
}
