//! 信任校验：签名完整性 + 能力授权声明。
//!
//! 校验项（两项都必须通过）：
//! - 签名有效：包的代码签名完整且深度覆盖所有嵌套内容
//! - 能力授权：内嵌扩展可执行文件的能力声明中包含必需的沙箱能力
//!
//! 约定：
//! - 校验为阻塞操作，结果是注册决策的输入，必须在提交之前得出
//! - 校验失败不自动重试；需要随新版本主程序发布正确签名的辅助程序
//!
//! 作者：Peekdown 项目组（自动生成）
//! 创建时间：2026-10-18
//! 修改时间：2026-10-18

use std::path::Path;

use thiserror::Error;
use tracing::debug;

/// 不受信任的原因。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UntrustedReason {
    #[error("签名无效或包已被篡改/未签名: {detail}")]
    SignatureInvalid { detail: String },
    #[error("缺少必需的能力授权: {capability}")]
    CapabilityMissing { capability: String },
}

/// 信任校验结论。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrustVerdict {
    Trusted,
    Untrusted(UntrustedReason),
}

impl TrustVerdict {
    pub fn is_trusted(&self) -> bool {
        matches!(self, TrustVerdict::Trusted)
    }
}

/// 信任校验接口。
///
/// 实现要求：
/// - 同步执行，返回前必须得出结论
/// - 无法执行校验工具时按 [`UntrustedReason::SignatureInvalid`] 处理（宁可拒绝，不可放行）
pub trait TrustVerifier {
    /// 校验辅助程序包。
    ///
    /// 参数：
    /// - `bundle`：辅助程序包根目录
    /// - `extension_executable`：内嵌扩展的可执行文件（能力声明所在）
    /// - `capability`：必需的能力键
    fn verify(&self, bundle: &Path, extension_executable: &Path, capability: &str) -> TrustVerdict;
}

/// 判断能力声明（XML plist 文本）中 `capability` 是否被授予。
///
/// 参数：
/// - `entitlements`：`codesign -d --entitlements :-` 输出的 plist 文本
/// - `capability`：能力键，例如 `com.apple.security.app-sandbox`
///
/// 返回值：
/// - `true`：顶层字典中存在该键且值为布尔 `true`
/// - `false`：未声明、值为 `false` 或其他类型、仅出现在嵌套字典/注释中，或 plist 无法解析
pub fn entitlements_grant(entitlements: &str, capability: &str) -> bool {
    match plist::Value::from_reader_xml(entitlements.as_bytes()) {
        Ok(value) => {
            value
                .as_dictionary()
                .and_then(|dict| dict.get(capability))
                .and_then(plist::Value::as_boolean)
                == Some(true)
        }
        Err(e) => {
            debug!("解析能力声明失败: {e}");
            false
        }
    }
}
