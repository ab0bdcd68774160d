//! 扩展注册表操作（基于 `pluginkit` / `xattr` / `open`）。
//!
//! 说明：
//! - 激活：清除隔离标记 -> `pluginkit -a` 登记扩展 -> `open -g` 后台启动辅助程序完成自注册
//! - 注销：`pluginkit -r`，阻塞执行但忽略结果（随后的删除需要排在其后）
//!
//! 作者：Peekdown 项目组（自动生成）
//! 创建时间：2026-10-18
//! 修改时间：2026-10-18

use std::path::Path;

use peekdown_core::extension::ExtensionRegistry;
use peekdown_core::task::BestEffortTask;
use tracing::{debug, info};

use crate::process::{dispatch, run_tool};

/// 隔离标记属性名。
pub const QUARANTINE_ATTR: &str = "com.apple.quarantine";

/// 基于系统命令行工具的扩展注册表。
#[derive(Debug, Default, Clone, Copy)]
pub struct PluginKitRegistry;

impl ExtensionRegistry for PluginKitRegistry {
    fn activate(&self, helper: &Path, extension_bundle: &Path) {
        let task = activation_task(helper, extension_bundle);
        info!("派发扩展激活任务: {}", helper.display());
        dispatch(&task);
    }

    fn deactivate(&self, extension_bundle: &Path) {
        let path = extension_bundle.to_string_lossy().to_string();
        match run_tool("pluginkit", &["-r", path.as_str()]) {
            Ok(out) if out.success => debug!("已注销扩展: {path}"),
            Ok(out) => debug!("注销扩展失败（忽略）: {path} {}", out.stderr.trim()),
            Err(e) => debug!("注销扩展失败（忽略）: {path} {e:#}"),
        }
    }
}

/// 构建激活任务（顺序：清除隔离标记、登记扩展、后台启动辅助程序）。
pub fn activation_task(helper: &Path, extension_bundle: &Path) -> BestEffortTask {
    let helper = helper.to_string_lossy().to_string();
    let extension = extension_bundle.to_string_lossy().to_string();
    BestEffortTask::new("activate-helper")
        .step("xattr", ["-dr", QUARANTINE_ATTR, helper.as_str()])
        .step("pluginkit", ["-a", extension.as_str()])
        .step("open", ["-g", helper.as_str()])
}
