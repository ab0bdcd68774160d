//! 交互对话框（基于 `osascript`）。
//!
//! 用途：
//! - 主程序不在可信目录时弹出三选一提示
//! - 移动失败时展示错误提示
//!
//! 作者：Peekdown 项目组（自动生成）
//! 创建时间：2026-10-18
//! 修改时间：2026-10-18

use std::path::Path;

use anyhow::Result;
use peekdown_core::location::{LocationChoice, LocationPrompter};
use tracing::warn;

use crate::process::run_tool;

pub const BUTTON_CANCEL: &str = "取消";
pub const BUTTON_USER: &str = "移到 ~/Applications";
pub const BUTTON_SYSTEM: &str = "移到 /Applications";

/// 基于 `osascript` 的交互提示。
#[derive(Debug, Default, Clone, Copy)]
pub struct OsaScriptPrompter;

impl LocationPrompter for OsaScriptPrompter {
    fn choose_location(&self, host: &Path) -> Result<LocationChoice> {
        let message = format!(
            "Peekdown 需要位于“应用程序”文件夹中才能启用快速查看扩展。\n\n当前位置：{}",
            host.display()
        );
        let script = format!(
            "display dialog {} with title \"Peekdown\" buttons {{{}, {}, {}}} default button 3 cancel button 1",
            applescript_string(&message),
            applescript_string(BUTTON_CANCEL),
            applescript_string(BUTTON_USER),
            applescript_string(BUTTON_SYSTEM),
        );
        let out = run_tool("osascript", &["-e", script.as_str()])?;
        // 点击“取消”时 osascript 以非 0 退出（错误 -128），按取消处理。
        if !out.success {
            return Ok(LocationChoice::Cancel);
        }
        Ok(parse_dialog_reply(&out.stdout))
    }

    fn show_error(&self, message: &str) {
        let script = format!(
            "display alert \"Peekdown\" message {} as critical",
            applescript_string(message)
        );
        if let Err(e) = run_tool("osascript", &["-e", script.as_str()]) {
            warn!("展示错误提示失败: {e:#}");
        }
    }
}

/// 解析 `display dialog` 的输出（形如 `button returned:移到 /Applications`）。
///
/// 返回值：
/// - 无法识别的按钮一律按取消处理
pub fn parse_dialog_reply(stdout: &str) -> LocationChoice {
    let button = stdout
        .trim()
        .split(',')
        .find_map(|part| part.trim().strip_prefix("button returned:"))
        .unwrap_or_default();
    match button {
        BUTTON_SYSTEM => LocationChoice::SystemApplications,
        BUTTON_USER => LocationChoice::UserApplications,
        _ => LocationChoice::Cancel,
    }
}

/// 生成 AppleScript 字符串字面量（转义反斜杠与双引号）。
pub fn applescript_string(raw: &str) -> String {
    format!("\"{}\"", raw.replace('\\', "\\\\").replace('"', "\\\""))
}
