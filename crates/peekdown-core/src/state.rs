//! 注册状态落盘模型（registration-state.json）。
//!
//! 目的：
//! - 记录“最近一次成功注册”的主程序位置、版本与辅助程序指纹
//! - 每次启动时作为唯一比对依据，判断是否需要重新注册
//!
//! 约定：
//! - 每次成功注册整体覆盖写入，从不部分更新
//! - 读取失败/解析失败一律视为“从未注册”，不作为致命错误
//! - 字段缺失或被重命名时同样视为“需要重新注册”
//!
//! 作者：Peekdown 项目组（自动生成）
//! 创建时间：2026-10-18
//! 修改时间：2026-10-18

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::fingerprint::Fingerprint;
use crate::paths;

/// 注册状态（序列化为 JSON 存储在用户数据目录）。
///
/// 字段说明：
/// - `state_id`：本次注册状态 ID（用于区分多次注册）
/// - `registered_at`：注册时间（UTC）
/// - `host_path`：注册时主程序包路径
/// - `host_version`：注册时主程序版本
/// - `helper_path`：注册时辅助程序安装路径
/// - `helper_fingerprint`：注册时辅助程序指纹
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationState {
    #[serde(default = "Uuid::nil")]
    pub state_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub registered_at: OffsetDateTime,
    pub host_path: PathBuf,
    pub host_version: String,
    pub helper_path: PathBuf,
    #[serde(default)]
    pub helper_fingerprint: Option<Fingerprint>,
}

impl RegistrationState {
    /// 创建一份新的注册状态，`registered_at` 为当前 UTC 时间。
    pub fn new(
        host_path: PathBuf,
        host_version: String,
        helper_path: PathBuf,
        helper_fingerprint: Fingerprint,
    ) -> Self {
        Self {
            state_id: Uuid::new_v4(),
            registered_at: OffsetDateTime::now_utc(),
            host_path,
            host_version,
            helper_path,
            helper_fingerprint: Some(helper_fingerprint),
        }
    }
}

/// 注册状态存储（单文件）。
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取注册状态。
    ///
    /// 返回值：
    /// - `Some(state)`：文件存在且可解析
    /// - `None`：文件不存在、不可读或内容损坏（统一视为“从未注册”）
    pub fn load(&self) -> Option<RegistrationState> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("注册状态文件不存在: {}", self.path.display());
                return None;
            }
            Err(e) => {
                warn!("读取注册状态失败，按未注册处理: {} ({e})", self.path.display());
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(state) => Some(state),
            Err(e) => {
                warn!("注册状态文件已损坏，按未注册处理: {} ({e})", self.path.display());
                None
            }
        }
    }

    /// 整体覆盖写入注册状态。
    ///
    /// 说明：
    /// - 父目录不存在时自动创建
    /// - 先写同目录临时文件再重命名，进程中途退出不会留下半个文件
    ///
    /// 异常处理：
    /// - 序列化失败或写文件失败会返回错误
    pub fn save(&self, state: &RegistrationState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            paths::ensure_dir(parent)?;
        }
        let bytes = serde_json::to_vec_pretty(state).context("序列化注册状态失败")?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, bytes)
            .with_context(|| format!("写入状态文件失败: {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("替换状态文件失败: {}", self.path.display()))?;
        Ok(())
    }

    /// 删除状态文件；不存在视为成功。
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("删除状态文件失败: {}", self.path.display())),
        }
    }
}
