//! 代码签名与能力授权校验（基于 `codesign`）。
//!
//! 说明：
//! - 签名：`codesign --verify --deep --strict <bundle>`，深度覆盖所有嵌套内容
//! - 能力：`codesign -d --entitlements :- <extension executable>` 输出 XML plist，检查必需能力键
//!
//! 作者：Peekdown 项目组（自动生成）
//! 创建时间：2026-10-18
//! 修改时间：2026-10-18

use std::ffi::OsStr;
use std::path::Path;

use peekdown_core::trust::{entitlements_grant, TrustVerdict, TrustVerifier, UntrustedReason};
use tracing::debug;

use crate::process::run_tool;

/// 基于 `codesign` 的信任校验器。
#[derive(Debug, Default, Clone, Copy)]
pub struct CodesignVerifier;

impl TrustVerifier for CodesignVerifier {
    fn verify(&self, bundle: &Path, extension_executable: &Path, capability: &str) -> TrustVerdict {
        if let Err(detail) = verify_signature(bundle) {
            return TrustVerdict::Untrusted(UntrustedReason::SignatureInvalid { detail });
        }
        match read_entitlements(extension_executable) {
            Ok(plist) if entitlements_grant(&plist, capability) => TrustVerdict::Trusted,
            Ok(_) => TrustVerdict::Untrusted(UntrustedReason::CapabilityMissing {
                capability: capability.to_string(),
            }),
            Err(detail) => {
                debug!("读取能力声明失败: {detail}");
                TrustVerdict::Untrusted(UntrustedReason::CapabilityMissing {
                    capability: capability.to_string(),
                })
            }
        }
    }
}

/// 深度校验包签名。
///
/// 返回值：
/// - `Ok(())`：签名完整
/// - `Err(detail)`：签名无效/未签名/被篡改，或 `codesign` 无法执行
fn verify_signature(bundle: &Path) -> Result<(), String> {
    let args = [
        OsStr::new("--verify"),
        OsStr::new("--deep"),
        OsStr::new("--strict"),
        bundle.as_os_str(),
    ];
    run_tool("codesign", &args)
        .and_then(|out| out.into_result("codesign"))
        .map(|_| ())
        .map_err(|e| format!("{e:#}"))
}

/// 读取可执行文件内嵌的能力声明（XML plist 文本）。
fn read_entitlements(executable: &Path) -> Result<String, String> {
    let args = [
        OsStr::new("-d"),
        OsStr::new("--entitlements"),
        OsStr::new(":-"),
        executable.as_os_str(),
    ];
    run_tool("codesign", &args)
        .and_then(|out| out.into_result("codesign"))
        .map(|out| out.stdout)
        .map_err(|e| format!("{e:#}"))
}
