//! 辅助程序指纹：对两个关键可执行文件做内容寻址摘要。
//!
//! 指纹格式（文本）：
//! - `<main_sha256_hex>:<extension_sha256_hex>`
//! - 分隔符 `:` 不属于十六进制字母表，不会与摘要本身混淆
//!
//! 约束：
//! - 纯函数：相同字节总是得到相同指纹；任一文件任一字节变化都会改变指纹
//! - 任一文件缺失时返回 `None`（表示“无法确认身份”），不是错误
//!
//! 作者：Peekdown 项目组（自动生成）
//! 创建时间：2026-10-18
//! 修改时间：2026-10-18

use std::fmt;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::config::HelperLayout;

/// 两段摘要之间的分隔符。
pub const SEPARATOR: char = ':';

/// 辅助程序指纹。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// 由两段十六进制摘要组合指纹。
    pub fn from_digests(main: &str, extension: &str) -> Self {
        Self(format!("{main}{SEPARATOR}{extension}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 日志用短格式（每段前 12 个字符）。
    pub fn short(&self) -> String {
        self.0
            .split(SEPARATOR)
            .map(|part| part.chars().take(12).collect::<String>())
            .collect::<Vec<_>>()
            .join(&SEPARATOR.to_string())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 计算辅助程序包的指纹。
///
/// 参数：
/// - `bundle`：辅助程序包根目录（模板或已安装副本均可）
/// - `layout`：包内两个关键可执行文件的相对位置
///
/// 返回值：
/// - `Some(fingerprint)`：两个文件均存在且可读
/// - `None`：任一文件缺失或不可读（包不完整/已损坏）
pub fn fingerprint(bundle: &Path, layout: &HelperLayout) -> Option<Fingerprint> {
    let main = layout.main_executable_in(bundle);
    let extension = layout.extension_executable_in(bundle);
    if !main.is_file() || !extension.is_file() {
        return None;
    }
    match (hash_file(&main), hash_file(&extension)) {
        (Ok(m), Ok(e)) => Some(Fingerprint::from_digests(&m, &e)),
        (Err(e), _) | (_, Err(e)) => {
            warn!("计算指纹失败，视为无法确认身份: {e:#}");
            None
        }
    }
}

/// 流式计算单个文件的 SHA-256（十六进制小写）。
fn hash_file(path: &Path) -> Result<String> {
    let mut file = std::fs::File::open(path)
        .with_context(|| format!("打开文件失败: {}", path.display()))?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    loop {
        let n = file
            .read(&mut buffer)
            .with_context(|| format!("读取文件失败: {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}
