//! macOS 平台能力封装（代码签名、扩展注册表、隔离标记、对话框、重新启动）。
//!
//! 目标：
//! - 将系统命令行工具调用集中封装，注册流程只依赖 `peekdown-core` 中的 trait
//! - 统一错误处理风格（以 `anyhow::Result` 形式向上返回）
//!
//! 安全注意：
//! - 签名与能力校验结论直接决定是否提交辅助程序，工具无法执行时一律按“不受信任”处理
//!
//! 作者：Peekdown 项目组（自动生成）
//! 创建时间：2026-10-18
//! 修改时间：2026-10-18

pub mod codesign;
pub mod dialog;
pub mod pluginkit;
pub mod process;
pub mod relaunch;
