//! 尽力而为任务（best-effort task）。
//!
//! 契约：
//! - 任务被派发后立即返回，调用方不等待、不读取结果
//! - 任务失败只能在下一次启动的“是否过期”判断中被间接发现（届时重新注册）
//! - 任务内各步骤按顺序执行，前一步失败不阻止后一步
//!
//! 作者：Peekdown 项目组（自动生成）
//! 创建时间：2026-10-18
//! 修改时间：2026-10-18

/// 一个尽力而为任务：有序的外部工具调用列表。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestEffortTask {
    label: String,
    steps: Vec<Vec<String>>,
}

impl BestEffortTask {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            steps: Vec::new(),
        }
    }

    /// 追加一步工具调用。
    pub fn step<I, S>(mut self, program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut argv = vec![program.to_string()];
        argv.extend(args.into_iter().map(Into::into));
        self.steps.push(argv);
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn steps(&self) -> &[Vec<String>] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// 渲染为 `/bin/sh` 脚本：每步单独转义，以 `;` 串联（失败不短路）。
    pub fn script(&self) -> String {
        self.steps
            .iter()
            .map(|argv| shell_words::join(argv))
            .collect::<Vec<_>>()
            .join(" ; ")
    }
}
