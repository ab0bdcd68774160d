//! Peekdown 预览扩展注册核心库（平台无关）。
//!
//! 功能：
//! - 计算辅助程序指纹（两个关键可执行文件的内容摘要）
//! - 整包安装/提交/删除辅助程序
//! - 注册状态落盘模型（registration-state.json）与读写
//! - 信任校验结论与能力声明解析
//! - 位置检查（主程序必须位于可信应用目录）与注册器编排
//!
//! 所有系统交互（签名校验、扩展注册表、对话框、重新启动）均以 trait 表达，由平台 crate 实现。
//!
//! 作者：Peekdown 项目组（自动生成）
//! 创建时间：2026-10-18
//! 修改时间：2026-10-18

pub mod config;
pub mod extension;
pub mod fingerprint;
pub mod installer;
pub mod launch;
pub mod location;
pub mod paths;
pub mod registrar;
pub mod state;
pub mod task;
pub mod trust;
