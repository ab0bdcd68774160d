//! 注册器：判断辅助程序是否需要（重新）安装与注册，并执行之。
//!
//! 状态流转：
//! - `Unregistered -> Registering -> Registered -> Stale -> Registering -> Registered -> ...`
//!
//! 过期判定（任一成立即过期）：
//! - 没有任何历史注册状态
//! - 主程序路径或版本发生变化
//! - 记录的指纹与辅助程序模板当前指纹不一致
//! - 已安装副本自身的指纹与记录不一致（外部篡改/复制不完整）
//! - 安装目标路径与记录不一致
//!
//! 注册步骤：
//! 1) 将模板完整复制到同目录的隐藏暂存路径
//! 2) 校验暂存副本（指纹 + 签名 + 能力授权），阻塞等待结论
//! 3) 清理被取代的旧安装（先注销再删除）
//! 4) 提交暂存副本到目标路径
//! 5) 覆盖写入注册状态
//! 6) 派发激活任务（不等待）
//!
//! 限制：
//! - 未实现进程间加锁；假定同一时刻只有一个主程序实例执行本流程（桌面单用户场景）
//!
//! 作者：Peekdown 项目组（自动生成）
//! 创建时间：2026-10-18
//! 修改时间：2026-10-18

use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use tracing::{info, warn};

use crate::config::RegistrarConfig;
use crate::extension::ExtensionRegistry;
use crate::fingerprint::{fingerprint, Fingerprint};
use crate::installer::BundleInstaller;
use crate::launch::{HostBundle, LaunchContext};
use crate::paths;
use crate::state::{RegistrationState, StateStore};
use crate::trust::{TrustVerdict, TrustVerifier, UntrustedReason};

/// 过期原因。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaleReason {
    NeverRegistered,
    HostMoved { from: PathBuf, to: PathBuf },
    HostVersionChanged { from: String, to: String },
    SourceChanged,
    InstalledCopyDrifted,
    TargetChanged { from: PathBuf, to: PathBuf },
}

impl fmt::Display for StaleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaleReason::NeverRegistered => write!(f, "从未注册"),
            StaleReason::HostMoved { from, to } => {
                write!(f, "主程序位置变化: {} -> {}", from.display(), to.display())
            }
            StaleReason::HostVersionChanged { from, to } => {
                write!(f, "主程序版本变化: {from} -> {to}")
            }
            StaleReason::SourceChanged => write!(f, "辅助程序模板已更新"),
            StaleReason::InstalledCopyDrifted => write!(f, "已安装副本与记录不一致"),
            StaleReason::TargetChanged { from, to } => {
                write!(f, "安装目标变化: {} -> {}", from.display(), to.display())
            }
        }
    }
}

/// 过期判定结论。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assessment {
    /// 已注册且与当前一致，无需任何操作。
    Current,
    /// 需要重新注册。
    Stale(Vec<StaleReason>),
    /// 模板指纹无法计算：跳过注册（不对未知目标强制重装）。
    SourceUnverifiable,
}

/// 一次启动的注册计划（判定所需的全部输入与结论）。
#[derive(Debug, Clone)]
pub struct RegistrationPlan {
    pub host: HostBundle,
    pub source: PathBuf,
    pub target: PathBuf,
    pub source_fingerprint: Option<Fingerprint>,
    pub installed_fingerprint: Option<Fingerprint>,
    pub prior: Option<RegistrationState>,
    pub assessment: Assessment,
}

/// 注册流程结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// 入口条件不满足，未执行任何操作。
    Skipped,
    /// 已是最新，未执行任何修改。
    UpToDate,
    /// 已完成安装、提交与状态落盘；激活任务已派发。
    Registered(RegistrationState),
    /// 信任校验失败；旧安装与状态保持不变。
    Declined(UntrustedReason),
    /// 模板指纹无法计算，跳过注册。
    SourceUnverifiable,
}

/// 注册器（编排指纹、安装、信任校验、状态存储与扩展注册表）。
pub struct Registrar<'a> {
    config: &'a RegistrarConfig,
    store: &'a StateStore,
    installer: &'a dyn BundleInstaller,
    verifier: &'a dyn TrustVerifier,
    registry: &'a dyn ExtensionRegistry,
}

impl<'a> Registrar<'a> {
    pub fn new(
        config: &'a RegistrarConfig,
        store: &'a StateStore,
        installer: &'a dyn BundleInstaller,
        verifier: &'a dyn TrustVerifier,
        registry: &'a dyn ExtensionRegistry,
    ) -> Self {
        Self {
            config,
            store,
            installer,
            verifier,
            registry,
        }
    }

    /// 计算注册计划（只读：一次状态读取 + 模板与已安装副本各一次指纹计算）。
    pub fn assess(&self, host: &HostBundle) -> RegistrationPlan {
        let prior = self.store.load();
        let source = self.config.helper_source_in(&host.path);
        let target = self.config.helper_target_for(&host.path);
        let source_fingerprint = fingerprint(&source, &self.config.layout);
        let installed_fingerprint = prior
            .as_ref()
            .and_then(|p| fingerprint(&p.helper_path, &self.config.layout));

        let assessment = match &source_fingerprint {
            None => Assessment::SourceUnverifiable,
            Some(current) => {
                let reasons = stale_reasons(
                    host,
                    &target,
                    current,
                    installed_fingerprint.as_ref(),
                    prior.as_ref(),
                );
                if reasons.is_empty() {
                    Assessment::Current
                } else {
                    Assessment::Stale(reasons)
                }
            }
        };

        RegistrationPlan {
            host: host.clone(),
            source,
            target,
            source_fingerprint,
            installed_fingerprint,
            prior,
            assessment,
        }
    }

    /// 执行本次启动的注册流程。
    ///
    /// 返回值：
    /// - 见 [`RegistrationOutcome`]
    ///
    /// 异常处理：
    /// - 复制/提交/状态写入失败返回错误；此时状态文件保持原样，下次启动重新判定
    /// - 旧安装清理失败仅记录警告（尽力而为）
    pub fn run(&self, ctx: &LaunchContext) -> Result<RegistrationOutcome> {
        let Some(host) = ctx.host.as_ref().filter(|_| ctx.should_register()) else {
            info!("不满足注册入口条件，跳过注册");
            return Ok(RegistrationOutcome::Skipped);
        };

        let plan = self.assess(host);
        match &plan.assessment {
            Assessment::Current => {
                info!("辅助程序已是最新，无需注册: {}", plan.target.display());
                Ok(RegistrationOutcome::UpToDate)
            }
            Assessment::SourceUnverifiable => {
                warn!(
                    "无法计算辅助程序模板指纹，跳过注册: {}",
                    plan.source.display()
                );
                Ok(RegistrationOutcome::SourceUnverifiable)
            }
            Assessment::Stale(reasons) => {
                for reason in reasons {
                    info!("需要重新注册: {reason}");
                }
                self.register(&plan)
            }
        }
    }

    fn register(&self, plan: &RegistrationPlan) -> Result<RegistrationOutcome> {
        let expected = plan
            .source_fingerprint
            .clone()
            .ok_or_else(|| anyhow!("缺少模板指纹"))?;
        let layout = &self.config.layout;
        let staging = paths::staging_path_for(&plan.target);

        info!("开始注册: {} -> {}", plan.source.display(), plan.target.display());
        if let Err(e) = self.installer.install(&plan.source, &staging) {
            self.discard_staging(&staging);
            return Err(e).context("复制辅助程序到暂存位置失败");
        }

        if fingerprint(&staging, layout).as_ref() != Some(&expected) {
            self.discard_staging(&staging);
            return Err(anyhow!(
                "暂存副本指纹与模板不一致: {}",
                staging.display()
            ));
        }

        let verdict = self.verifier.verify(
            &staging,
            &layout.extension_executable_in(&staging),
            &self.config.required_capability,
        );
        if let TrustVerdict::Untrusted(reason) = verdict {
            warn!("辅助程序未通过信任校验，放弃注册: {reason}");
            self.discard_staging(&staging);
            return Ok(RegistrationOutcome::Declined(reason));
        }

        if let Some(prior) = &plan.prior {
            self.retire_superseded(&prior.helper_path, &plan.target);
        }

        self.installer.commit(&staging, &plan.target)?;

        let state = RegistrationState::new(
            plan.host.path.clone(),
            plan.host.version.clone(),
            plan.target.clone(),
            expected,
        );
        self.store.save(&state)?;
        info!(
            "注册完成: {} (指纹 {})",
            plan.target.display(),
            state
                .helper_fingerprint
                .as_ref()
                .map(Fingerprint::short)
                .unwrap_or_default()
        );

        self.registry
            .activate(&plan.target, &layout.extension_bundle_in(&plan.target));
        Ok(RegistrationOutcome::Registered(state))
    }

    /// 注销并删除被取代的旧安装（路径不同且仍存在时）。
    fn retire_superseded(&self, old: &Path, target: &Path) {
        if old == target || !old.exists() {
            return;
        }
        if !self.is_helper_install(old) {
            warn!("记录的旧安装不是辅助程序包，跳过清理: {}", old.display());
            return;
        }
        info!("清理旧安装: {}", old.display());
        self.registry
            .deactivate(&self.config.layout.extension_bundle_in(old));
        if let Err(e) = self.installer.remove(old) {
            warn!("删除旧安装失败（忽略）: {e:#}");
        }
    }

    /// 判断路径是否为本程序安装的辅助程序包（包名一致且包含两个关键组件）。
    ///
    /// 说明：
    /// - 状态文件可被外部改写，删除前必须确认目标确实是辅助程序包
    fn is_helper_install(&self, path: &Path) -> bool {
        let layout = &self.config.layout;
        path.file_name() == Some(OsStr::new(&self.config.helper_bundle_name))
            && layout.main_executable_in(path).is_file()
            && layout.extension_bundle_in(path).is_dir()
    }

    fn discard_staging(&self, staging: &Path) {
        if let Err(e) = self.installer.remove(staging) {
            warn!("删除暂存副本失败（忽略）: {e:#}");
        }
    }

    /// 注销扩展、删除已安装辅助程序并清除注册状态。
    ///
    /// 返回值：
    /// - `Ok(true)`：存在历史注册并已清理
    /// - `Ok(false)`：没有历史注册，无需清理
    ///
    /// 异常处理：
    /// - 注销为尽力而为；删除辅助程序或状态文件失败返回错误
    /// - 记录的路径不是辅助程序包时不做删除，只清除状态
    pub fn unregister(&self) -> Result<bool> {
        let Some(prior) = self.store.load() else {
            return Ok(false);
        };
        if self.is_helper_install(&prior.helper_path) {
            self.registry
                .deactivate(&self.config.layout.extension_bundle_in(&prior.helper_path));
            self.installer.remove(&prior.helper_path)?;
        } else if prior.helper_path.exists() {
            warn!(
                "记录的安装路径不是辅助程序包，仅清除注册状态: {}",
                prior.helper_path.display()
            );
        }
        self.store.clear()?;
        info!("已注销辅助程序: {}", prior.helper_path.display());
        Ok(true)
    }
}

/// 比对历史状态与当前输入，列出全部过期原因（为空表示一致）。
fn stale_reasons(
    host: &HostBundle,
    target: &Path,
    source_fingerprint: &Fingerprint,
    installed_fingerprint: Option<&Fingerprint>,
    prior: Option<&RegistrationState>,
) -> Vec<StaleReason> {
    let Some(prior) = prior else {
        return vec![StaleReason::NeverRegistered];
    };
    let mut reasons = Vec::new();
    if prior.host_path != host.path {
        reasons.push(StaleReason::HostMoved {
            from: prior.host_path.clone(),
            to: host.path.clone(),
        });
    }
    if prior.host_version != host.version {
        reasons.push(StaleReason::HostVersionChanged {
            from: prior.host_version.clone(),
            to: host.version.clone(),
        });
    }
    if prior.helper_path != target {
        reasons.push(StaleReason::TargetChanged {
            from: prior.helper_path.clone(),
            to: target.to_path_buf(),
        });
    }
    if prior.helper_fingerprint.as_ref() != Some(source_fingerprint) {
        reasons.push(StaleReason::SourceChanged);
    }
    if prior.helper_fingerprint.is_none() || installed_fingerprint != prior.helper_fingerprint.as_ref() {
        reasons.push(StaleReason::InstalledCopyDrifted);
    }
    reasons
}
