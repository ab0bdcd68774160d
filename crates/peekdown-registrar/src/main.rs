//! Peekdown 预览扩展注册入口（registrar）。
//!
//! 职责：
//! - 启动时一次性构建启动上下文（主程序包、版本、启动方式）
//! - 交互式启动：先检查主程序位置（必要时移动并重新启动），再执行辅助程序注册
//! - 命令行子命令：查看注册状态、校验签名、注销辅助程序
//!
//! 约定：
//! - 注册是独立的“旁路启动模式”：无论成功、跳过或失败，处理完成后进程都直接退出
//!
//! 作者：Peekdown 项目组（自动生成）
//! 创建时间：2026-10-18
//! 修改时间：2026-10-18

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use peekdown_core::config::RegistrarConfig;
use peekdown_core::fingerprint::{fingerprint, Fingerprint};
use peekdown_core::installer::FsInstaller;
use peekdown_core::launch::{host_bundle_from_exe, HostBundle, LaunchContext, LaunchMode};
use peekdown_core::location::{self, LocationOutcome};
use peekdown_core::registrar::{Assessment, Registrar, RegistrationOutcome};
use peekdown_core::state::StateStore;
use peekdown_core::trust::{TrustVerdict, TrustVerifier};
use peekdown_macos::codesign::CodesignVerifier;
use peekdown_macos::dialog::OsaScriptPrompter;
use peekdown_macos::pluginkit::PluginKitRegistry;
use peekdown_macos::relaunch::ExecRelauncher;
use tracing::{info, warn};
use tracing_subscriber::filter::LevelFilter;

/// 命令行参数。
///
/// 说明：
/// - 无子命令时视为交互式启动（双击/`open`），执行位置检查与注册
/// - `host_bundle` / `host_version` 用于排障与测试，覆盖自动识别的主程序包
#[derive(Debug, Parser)]
#[command(name = "peekdown-registrar", version)]
struct Cli {
    #[arg(long, global = true)]
    host_bundle: Option<PathBuf>,

    #[arg(long, global = true)]
    host_version: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// 支持的子命令（均为命令行模式，不会触发注册）。
#[derive(Debug, Subcommand)]
enum Commands {
    /// 输出当前注册状态与过期判定（不做任何修改）。
    Status,
    /// 校验模板与已安装辅助程序的签名与能力授权（不做任何修改）。
    Doctor,
    /// 注销扩展、删除已安装辅助程序并清除注册状态。
    Unregister,
}

/// 程序入口：初始化日志、构建启动上下文并分发。
///
/// 异常处理：
/// - 配置/上下文构建失败或移动主程序失败会返回错误（退出码非 0）
/// - 注册过程中的错误只记录日志，不影响退出
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(LevelFilter::INFO.into()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = RegistrarConfig::from_env()?;
    let ctx = build_context(&cli)?;

    match cli.command {
        None => launch(&ctx, &config),
        Some(Commands::Status) => status(&ctx, &config),
        Some(Commands::Doctor) => doctor(&ctx, &config),
        Some(Commands::Unregister) => unregister(&config),
    }
}

/// 构建启动上下文（进程内只构建一次）。
///
/// 异常处理：
/// - 无法获取当前可执行文件路径时返回错误
fn build_context(cli: &Cli) -> Result<LaunchContext> {
    let exe = std::env::current_exe().context("获取当前可执行文件路径失败")?;
    let exe_name = exe
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "peekdown-registrar".to_string());

    let bundle = match &cli.host_bundle {
        Some(p) => Some(absolute(p)?),
        None => host_bundle_from_exe(&exe),
    };
    let host = bundle.map(|path| HostBundle {
        path,
        version: cli
            .host_version
            .clone()
            .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
    });

    Ok(LaunchContext {
        host,
        exe_name,
        mode: if cli.command.is_none() {
            LaunchMode::Interactive
        } else {
            LaunchMode::Cli
        },
        os_supported: cfg!(target_os = "macos"),
    })
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("获取当前目录失败")?;
    Ok(cwd.join(path))
}

/// 交互式启动：位置检查 -> 注册 -> 退出。
///
/// 主要步骤：
/// 1) 入口条件不满足（非打包/不受支持系统）时直接退出，不做任何修改
/// 2) 主程序不在可信目录：询问并移动；移动或取消后当前进程退出
/// 3) 执行注册器；结果只记录日志
///
/// 异常处理：
/// - 移动主程序失败：已向用户展示错误，返回错误退出
fn launch(ctx: &LaunchContext, config: &RegistrarConfig) -> Result<()> {
    if !ctx.should_register() {
        info!("非打包运行或系统不受支持，跳过注册");
        return Ok(());
    }

    let installer = FsInstaller;
    match location::ensure_trusted_location(
        ctx,
        config,
        &installer,
        &OsaScriptPrompter,
        &ExecRelauncher,
    )? {
        LocationOutcome::AlreadyTrusted => {}
        LocationOutcome::Relocated(_) | LocationOutcome::Declined => return Ok(()),
    }

    let store = StateStore::new(&config.state_file);
    let registrar = Registrar::new(
        config,
        &store,
        &installer,
        &CodesignVerifier,
        &PluginKitRegistry,
    );
    match registrar.run(ctx) {
        Ok(RegistrationOutcome::Registered(state)) => {
            info!("辅助程序已注册: {}", state.helper_path.display())
        }
        Ok(RegistrationOutcome::Declined(reason)) => {
            warn!("辅助程序未通过信任校验，保留原有注册: {reason}")
        }
        Ok(outcome) => info!("注册流程结束: {outcome:?}"),
        Err(e) => warn!("注册失败，将在下次启动时重试: {e:#}"),
    }
    Ok(())
}

/// 输出注册状态与过期判定（不做系统修改）。
///
/// 返回值：
/// - `Ok(())`：结果输出到 stdout，每行 `key = value`
fn status(ctx: &LaunchContext, config: &RegistrarConfig) -> Result<()> {
    let Some(host) = &ctx.host else {
        println!("host = <not packaged>");
        return Ok(());
    };
    let store = StateStore::new(&config.state_file);
    let registrar = Registrar::new(
        config,
        &store,
        &FsInstaller,
        &CodesignVerifier,
        &PluginKitRegistry,
    );
    let plan = registrar.assess(host);

    println!("host = {}", host.path.display());
    println!("host_version = {}", host.version);
    println!("trusted_location = {}", config.is_trusted_location(&host.path));
    println!("helper_target = {}", plan.target.display());
    println!("state_file = {}", store.path().display());
    println!("source_fingerprint = {}", show(plan.source_fingerprint.as_ref()));
    println!(
        "installed_fingerprint = {}",
        show(plan.installed_fingerprint.as_ref())
    );
    if let Some(prior) = &plan.prior {
        println!("registered_at = {}", prior.registered_at);
    }
    match &plan.assessment {
        Assessment::Current => println!("stale = false"),
        Assessment::SourceUnverifiable => println!("stale = unknown (source unverifiable)"),
        Assessment::Stale(reasons) => {
            println!("stale = true");
            for reason in reasons {
                println!("reason = {reason}");
            }
        }
    }
    Ok(())
}

fn show(fp: Option<&Fingerprint>) -> String {
    fp.map(Fingerprint::to_string)
        .unwrap_or_else(|| "<none>".to_string())
}

/// 环境自检：对模板与已安装辅助程序执行信任校验并输出结论。
fn doctor(ctx: &LaunchContext, config: &RegistrarConfig) -> Result<()> {
    println!("os_supported = {}", ctx.os_supported);
    let Some(host) = &ctx.host else {
        println!("host = <not packaged>");
        return Ok(());
    };
    let mut bundles = vec![("source", config.helper_source_in(&host.path))];
    if let Some(prior) = StateStore::new(&config.state_file).load() {
        bundles.push(("installed", prior.helper_path));
    }
    for (label, bundle) in bundles {
        if fingerprint(&bundle, &config.layout).is_none() {
            println!("{label} = incomplete ({})", bundle.display());
            continue;
        }
        let verdict = CodesignVerifier.verify(
            &bundle,
            &config.layout.extension_executable_in(&bundle),
            &config.required_capability,
        );
        match verdict {
            TrustVerdict::Trusted => println!("{label} = trusted"),
            TrustVerdict::Untrusted(reason) => println!("{label} = untrusted ({reason})"),
        }
    }
    Ok(())
}

/// 注销扩展并删除已安装辅助程序与注册状态。
fn unregister(config: &RegistrarConfig) -> Result<()> {
    let store = StateStore::new(&config.state_file);
    let registrar = Registrar::new(
        config,
        &store,
        &FsInstaller,
        &CodesignVerifier,
        &PluginKitRegistry,
    );
    if registrar.unregister()? {
        println!("unregistered = true");
    } else {
        println!("unregistered = false (no prior registration)");
    }
    Ok(())
}
