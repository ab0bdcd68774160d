//! 统一路径与目录约定（面向 macOS 用户目录与应用目录）。
//!
//! 目标：
//! - 将落盘路径集中管理，避免散落在注册流程各处
//! - 统一可信应用目录、辅助程序安装位置与状态文件路径，便于排障
//!
//! 作者：Peekdown 项目组（自动生成）
//! 创建时间：2026-10-18
//! 修改时间：2026-10-18

use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};

/// 用户数据目录下的产品目录名。
///
/// 示例（默认）：
/// - `~/Library/Application Support/Peekdown`
pub const VENDOR_DIR: &str = "Peekdown";

/// 注册状态文件名。
pub const STATE_FILE_NAME: &str = "registration-state.json";

/// 系统级应用目录。
pub const SYSTEM_APPLICATIONS: &str = "/Applications";

/// 获取当前用户主目录。
///
/// 异常处理：
/// - 当环境变量 `HOME` 不存在或不可读时，返回错误。
pub fn home_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("读取 HOME 环境变量失败")?;
    Ok(PathBuf::from(home))
}

/// 用户级应用目录。
///
/// 返回值：
/// - `~/Applications`
pub fn user_applications_dir(home: &Path) -> PathBuf {
    home.join("Applications")
}

/// 本项目在用户数据目录下的根目录。
///
/// 返回值：
/// - `~/Library/Application Support/Peekdown`
pub fn app_support_dir(home: &Path) -> PathBuf {
    home.join("Library").join("Application Support").join(VENDOR_DIR)
}

/// 默认注册状态文件路径。
pub fn default_state_file(home: &Path) -> PathBuf {
    app_support_dir(home).join(STATE_FILE_NAME)
}

/// 确保目录存在（不存在则递归创建）。
///
/// 异常处理：
/// - 目录创建失败（权限、路径非法等）会返回错误。
pub fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).with_context(|| format!("创建目录失败: {}", path.display()))?;
    Ok(())
}

/// 判断 `path` 是否位于 `root` 之下（按路径组件比较，不做符号链接解析）。
///
/// 说明：
/// - `/Applications/Utilities/X.app` 视为位于 `/Applications` 之下
/// - `/ApplicationsOld/X.app` 不视为位于 `/Applications` 之下
/// - 含 `..` 组件的路径一律不视为位于任何目录之下（`/Applications/../tmp/X.app`）
pub fn is_rooted_under(path: &Path, root: &Path) -> bool {
    if path.components().any(|c| c == Component::ParentDir) {
        return false;
    }
    path != root && path.starts_with(root)
}

/// 由目标路径推导同目录下的隐藏暂存路径。
///
/// 示例：
/// - `/Applications/Peekdown Helper.app` -> `/Applications/.Peekdown Helper.app.staging`
pub fn staging_path_for(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    target.with_file_name(format!(".{name}.staging"))
}
