//! 外部工具调用（阻塞执行 / 分离派发）。
//!
//! 两种模式：
//! - [`run_tool`]：阻塞执行并收集输出，用于结果是决策输入的场景（签名校验等）
//! - [`dispatch`]：以分离子进程派发 [`BestEffortTask`]，不等待、不读取结果
//!
//! 作者：Peekdown 项目组（自动生成）
//! 创建时间：2026-10-18
//! 修改时间：2026-10-18

use std::process::{Command, Stdio};

use anyhow::{anyhow, Context, Result};
use peekdown_core::task::BestEffortTask;
use tracing::{debug, warn};

/// 工具执行结果。
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// 将失败结果转为错误（优先附带 stderr，为空时附带 stdout）。
    pub fn into_result(self, program: &str) -> Result<ToolOutput> {
        if self.success {
            return Ok(self);
        }
        let detail = if self.stderr.trim().is_empty() {
            self.stdout.trim()
        } else {
            self.stderr.trim()
        };
        Err(anyhow!("{program} 执行失败 (退出码 {:?}): {detail}", self.code))
    }
}

/// 阻塞执行外部工具并收集输出。
///
/// 参数：
/// - `program`：工具名或路径
/// - `args`：参数数组（不包含程序名）
///
/// 异常处理：
/// - 启动失败返回错误（通常是系统缺失该工具）；退出码非 0 不视为错误，由调用方判断
pub fn run_tool<S: AsRef<std::ffi::OsStr>>(program: &str, args: &[S]) -> Result<ToolOutput> {
    let out = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .with_context(|| format!("执行 {program} 失败"))?;
    Ok(ToolOutput {
        success: out.status.success(),
        code: out.status.code(),
        stdout: String::from_utf8_lossy(&out.stdout).to_string(),
        stderr: String::from_utf8_lossy(&out.stderr).to_string(),
    })
}

/// 以分离子进程派发尽力而为任务。
///
/// 说明：
/// - 通过 `/bin/sh -c` 顺序执行各步骤；子进程不被等待，主进程退出后仍继续运行
/// - 派发失败只记录警告，不向调用方返回
pub fn dispatch(task: &BestEffortTask) {
    if task.is_empty() {
        return;
    }
    let script = task.script();
    debug!("派发任务 [{}]: {script}", task.label());
    let spawned = Command::new("/bin/sh")
        .arg("-c")
        .arg(&script)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();
    match spawned {
        // 不 wait：结果由下一次启动的过期判定间接发现。
        Ok(child) => drop(child),
        Err(e) => warn!("派发任务失败 [{}]（忽略）: {e}", task.label()),
    }
}
