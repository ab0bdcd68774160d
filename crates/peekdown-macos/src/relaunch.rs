//! 从新位置重新启动主程序。
//!
//! 作者：Peekdown 项目组（自动生成）
//! 创建时间：2026-10-18
//! 修改时间：2026-10-18

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{anyhow, Context, Result};
use peekdown_core::location::Relauncher;

/// 直接执行新位置下同名可执行文件的重新启动器。
#[derive(Debug, Default, Clone, Copy)]
pub struct ExecRelauncher;

impl Relauncher for ExecRelauncher {
    /// 启动 `<bundle>/Contents/MacOS/<exe_name>`，不等待其退出。
    ///
    /// 异常处理：
    /// - 新位置下可执行文件不存在或启动失败时返回错误
    fn relaunch(&self, bundle: &Path, exe_name: &str) -> Result<()> {
        let exe = executable_in(bundle, exe_name);
        if !exe.is_file() {
            return Err(anyhow!("新位置缺少可执行文件: {}", exe.display()));
        }
        let child = Command::new(&exe)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("重新启动失败: {}", exe.display()))?;
        drop(child);
        Ok(())
    }
}

/// 包内可执行文件路径。
pub fn executable_in(bundle: &Path, exe_name: &str) -> PathBuf {
    bundle.join("Contents").join("MacOS").join(exe_name)
}
