//! 包安装器：整包替换式复制、提交与删除。
//!
//! 语义：
//! - 每次安装都是完整替换：目标存在时先递归删除，再递归复制（不做部分合并）
//! - 复制保留可执行权限位、符号链接与嵌套包结构
//! - 不具备崩溃原子性：复制中途失败会留下不完整的目标；下次启动通过指纹/信任校验发现并重装
//!
//! 作者：Peekdown 项目组（自动生成）
//! 创建时间：2026-10-18
//! 修改时间：2026-10-18

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tracing::debug;

/// 包安装器接口（注册器与位置检查共用）。
pub trait BundleInstaller {
    /// 将 `source` 完整复制到 `target`（目标存在时先删除）。
    fn install(&self, source: &Path, target: &Path) -> Result<()>;

    /// 将已校验的暂存副本提交到最终位置（目标存在时先删除，再重命名）。
    fn commit(&self, staging: &Path, target: &Path) -> Result<()>;

    /// 递归删除一个已安装的包；路径不存在视为成功。
    fn remove(&self, path: &Path) -> Result<()>;
}

/// 基于本地文件系统的安装器。
#[derive(Debug, Default, Clone, Copy)]
pub struct FsInstaller;

impl BundleInstaller for FsInstaller {
    fn install(&self, source: &Path, target: &Path) -> Result<()> {
        if !source.exists() {
            return Err(anyhow!("安装源不存在: {}", source.display()));
        }
        self.remove(target)?;
        debug!("复制包: {} -> {}", source.display(), target.display());
        copy_recursively(source, target)
    }

    fn commit(&self, staging: &Path, target: &Path) -> Result<()> {
        self.remove(target)?;
        std::fs::rename(staging, target).with_context(|| {
            format!("提交安装失败: {} -> {}", staging.display(), target.display())
        })?;
        Ok(())
    }

    fn remove(&self, path: &Path) -> Result<()> {
        let meta = match std::fs::symlink_metadata(path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                return Err(e).with_context(|| format!("读取路径信息失败: {}", path.display()))
            }
        };
        if meta.is_dir() {
            std::fs::remove_dir_all(path)
        } else {
            std::fs::remove_file(path)
        }
        .with_context(|| format!("删除失败: {}", path.display()))?;
        Ok(())
    }
}

/// 递归复制文件/目录。
///
/// 参数：
/// - `src`：源路径（文件、目录或符号链接）
/// - `dst`：目标路径
///
/// 异常处理：
/// - 读目录/创建目录/复制文件/创建链接失败会返回错误
pub fn copy_recursively(src: &Path, dst: &Path) -> Result<()> {
    let meta = std::fs::symlink_metadata(src)
        .with_context(|| format!("读取路径信息失败: {}", src.display()))?;

    if meta.file_type().is_symlink() {
        return copy_symlink(src, dst);
    }

    if meta.is_file() {
        if let Some(parent) = dst.parent() {
            std::fs::create_dir_all(parent)?;
        }
        // std::fs::copy 会同时复制权限位（含可执行位）。
        std::fs::copy(src, dst)
            .with_context(|| format!("复制文件失败: {} -> {}", src.display(), dst.display()))?;
        return Ok(());
    }

    std::fs::create_dir_all(dst).with_context(|| format!("创建目录失败: {}", dst.display()))?;
    for entry in
        std::fs::read_dir(src).with_context(|| format!("读取目录失败: {}", src.display()))?
    {
        let entry = entry?;
        copy_recursively(&entry.path(), &dst.join(entry.file_name()))?;
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> Result<()> {
    let link = std::fs::read_link(src)
        .with_context(|| format!("读取符号链接失败: {}", src.display()))?;
    std::os::unix::fs::symlink(&link, dst)
        .with_context(|| format!("创建符号链接失败: {}", dst.display()))?;
    Ok(())
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dst: &Path) -> Result<()> {
    std::fs::copy(src, dst)
        .with_context(|| format!("复制文件失败: {} -> {}", src.display(), dst.display()))?;
    Ok(())
}
