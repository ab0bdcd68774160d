//! 启动上下文（一次构建，显式传递）。
//!
//! 说明：
//! - 进程启动时由入口程序构建 [`LaunchContext`]，随后以参数形式传给位置检查与注册器
//! - 不使用任何模块级可变状态保存窗口/文件信息
//!
//! 作者：Peekdown 项目组（自动生成）
//! 创建时间：2026-10-18
//! 修改时间：2026-10-18

use std::path::{Path, PathBuf};

/// 正在运行的主程序包。
///
/// 字段说明：
/// - `path`：`.app` 包根目录（绝对路径）
/// - `version`：当前构建的语义化版本号
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostBundle {
    pub path: PathBuf,
    pub version: String,
}

/// 本次启动方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    /// 交互式启动（双击/`open`，无子命令）。
    Interactive,
    /// 命令行子命令或帮助输出。
    Cli,
}

/// 启动上下文。
///
/// 字段说明：
/// - `host`：识别出的主程序包；非打包运行（如 `cargo run`）时为 `None`
/// - `exe_name`：当前可执行文件名（重新启动时沿用）
/// - `mode`：启动方式
/// - `os_supported`：当前系统是否支持预览扩展
#[derive(Debug, Clone)]
pub struct LaunchContext {
    pub host: Option<HostBundle>,
    pub exe_name: String,
    pub mode: LaunchMode,
    pub os_supported: bool,
}

impl LaunchContext {
    /// 是否为打包运行（能定位到 `.app` 包）。
    pub fn is_packaged(&self) -> bool {
        self.host.is_some()
    }

    pub fn is_interactive(&self) -> bool {
        self.mode == LaunchMode::Interactive
    }

    /// 注册入口条件：打包运行、受支持系统、交互式启动，三者同时满足。
    pub fn should_register(&self) -> bool {
        self.is_packaged() && self.os_supported && self.is_interactive()
    }
}

/// 由可执行文件路径推导 `.app` 包根目录。
///
/// 参数：
/// - `exe`：可执行文件绝对路径
///
/// 返回值：
/// - 路径形如 `<X>.app/Contents/MacOS/<exe>` 时返回 `<X>.app`
/// - 其他情况返回 `None`
pub fn host_bundle_from_exe(exe: &Path) -> Option<PathBuf> {
    let macos_dir = exe.parent()?;
    if macos_dir.file_name()? != "MacOS" {
        return None;
    }
    let contents = macos_dir.parent()?;
    if contents.file_name()? != "Contents" {
        return None;
    }
    let bundle = contents.parent()?;
    let is_app = bundle
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("app"))
        .unwrap_or(false);
    is_app.then(|| bundle.to_path_buf())
}
