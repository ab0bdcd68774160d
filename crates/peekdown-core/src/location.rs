//! 位置检查：确保主程序位于系统信任的应用目录。
//!
//! 流程：
//! - 主程序已在 `/Applications` 或 `~/Applications` 之下：直接放行
//! - 否则（仅交互式启动）弹出三选一：移到系统目录 / 移到用户目录 / 取消
//! - 移动 = 整包复制（与安装器相同的完整替换语义）+ 从新位置重新启动 + 当前进程退出
//!
//! 作者：Peekdown 项目组（自动生成）
//! 创建时间：2026-10-18
//! 修改时间：2026-10-18

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use tracing::{info, warn};

use crate::config::RegistrarConfig;
use crate::installer::BundleInstaller;
use crate::launch::LaunchContext;

/// 用户对“移动到可信目录”提示的选择。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationChoice {
    /// 移到系统级应用目录。
    SystemApplications,
    /// 移到用户级应用目录。
    UserApplications,
    Cancel,
}

/// 位置检查结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationOutcome {
    /// 已位于可信目录，可继续注册。
    AlreadyTrusted,
    /// 已复制到新位置并从新位置重新启动；当前进程应立即退出。
    Relocated(PathBuf),
    /// 用户取消（或非交互式启动无法询问）；当前进程应退出且不做任何修改。
    Declined,
}

/// 交互提示接口。
pub trait LocationPrompter {
    /// 展示三选一提示。
    ///
    /// 异常处理：
    /// - 无法展示提示时返回错误；调用方按取消处理
    fn choose_location(&self, host: &Path) -> Result<LocationChoice>;

    /// 向用户展示错误信息（复制失败等）。
    fn show_error(&self, message: &str);
}

/// 重新启动接口：从新位置启动同名可执行文件。
pub trait Relauncher {
    fn relaunch(&self, bundle: &Path, exe_name: &str) -> Result<()>;
}

/// 确保主程序位于可信应用目录。
///
/// 参数：
/// - `ctx`：启动上下文（需包含主程序包）
/// - `config`：可信目录配置
/// - `installer`：用于整包复制
/// - `prompter` / `relauncher`：交互与重新启动
///
/// 返回值：
/// - 见 [`LocationOutcome`]
///
/// 异常处理：
/// - 复制或重新启动失败：先通过 `prompter.show_error` 告知用户，再返回错误；调用方应终止进程，不自动重试
pub fn ensure_trusted_location(
    ctx: &LaunchContext,
    config: &RegistrarConfig,
    installer: &dyn BundleInstaller,
    prompter: &dyn LocationPrompter,
    relauncher: &dyn Relauncher,
) -> Result<LocationOutcome> {
    let host = ctx
        .host
        .as_ref()
        .ok_or_else(|| anyhow!("非打包运行，无法检查安装位置"))?;

    if config.is_trusted_location(&host.path) {
        return Ok(LocationOutcome::AlreadyTrusted);
    }
    if !ctx.is_interactive() {
        info!("主程序不在可信目录且非交互式启动，跳过: {}", host.path.display());
        return Ok(LocationOutcome::Declined);
    }

    let choice = match prompter.choose_location(&host.path) {
        Ok(choice) => choice,
        Err(e) => {
            warn!("无法展示移动提示，按取消处理: {e:#}");
            LocationChoice::Cancel
        }
    };
    let dest_dir = match choice {
        LocationChoice::SystemApplications => &config.system_applications,
        LocationChoice::UserApplications => &config.user_applications,
        LocationChoice::Cancel => {
            info!("用户取消移动，退出");
            return Ok(LocationOutcome::Declined);
        }
    };

    match relocate(&host.path, dest_dir, &ctx.exe_name, installer, relauncher) {
        Ok(target) => {
            info!("主程序已移动到 {}，已从新位置启动", target.display());
            Ok(LocationOutcome::Relocated(target))
        }
        Err(e) => {
            prompter.show_error(&format!("移动 Peekdown 失败：{e:#}"));
            Err(e)
        }
    }
}

fn relocate(
    host: &Path,
    dest_dir: &Path,
    exe_name: &str,
    installer: &dyn BundleInstaller,
    relauncher: &dyn Relauncher,
) -> Result<PathBuf> {
    let name = host
        .file_name()
        .ok_or_else(|| anyhow!("主程序路径缺少包名: {}", host.display()))?;
    std::fs::create_dir_all(dest_dir)
        .with_context(|| format!("创建目录失败: {}", dest_dir.display()))?;
    let target = dest_dir.join(name);
    installer.install(host, &target)?;
    relauncher.relaunch(&target, exe_name)?;
    Ok(target)
}
