//! 注册流程配置（目录、辅助程序布局、必需能力）。
//!
//! 约定：
//! - 所有路径在进程启动时一次性解析，之后以引用方式传递，不读取全局可变状态
//! - 环境变量覆盖项主要用于排障与测试沙箱
//!
//! 作者：Peekdown 项目组（自动生成）
//! 创建时间：2026-10-18
//! 修改时间：2026-10-18

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::paths;

/// 辅助程序包名（安装后的目录名）。
pub const HELPER_BUNDLE_NAME: &str = "Peekdown Helper.app";

/// 预览扩展所需的沙箱能力声明。
pub const SANDBOX_CAPABILITY: &str = "com.apple.security.app-sandbox";

/// 辅助程序包内部布局（相对包根目录）。
///
/// 字段说明：
/// - `main_executable`：辅助程序主可执行文件
/// - `extension_bundle`：内嵌预览扩展包（`.appex`）
/// - `extension_executable`：内嵌扩展的可执行文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelperLayout {
    pub main_executable: PathBuf,
    pub extension_bundle: PathBuf,
    pub extension_executable: PathBuf,
}

impl Default for HelperLayout {
    fn default() -> Self {
        let extension_bundle = PathBuf::from("Contents/PlugIns/PeekdownQLExt.appex");
        Self {
            main_executable: PathBuf::from("Contents/MacOS/Peekdown Helper"),
            extension_executable: extension_bundle.join("Contents/MacOS/PeekdownQLExt"),
            extension_bundle,
        }
    }
}

impl HelperLayout {
    /// 指定包内主可执行文件的绝对路径。
    pub fn main_executable_in(&self, bundle: &Path) -> PathBuf {
        bundle.join(&self.main_executable)
    }

    /// 指定包内扩展包的绝对路径。
    pub fn extension_bundle_in(&self, bundle: &Path) -> PathBuf {
        bundle.join(&self.extension_bundle)
    }

    /// 指定包内扩展可执行文件的绝对路径。
    pub fn extension_executable_in(&self, bundle: &Path) -> PathBuf {
        bundle.join(&self.extension_executable)
    }
}

/// 注册流程配置。
///
/// 字段说明：
/// - `system_applications`：系统级可信应用目录（默认 `/Applications`）
/// - `user_applications`：用户级可信应用目录（默认 `~/Applications`）
/// - `state_file`：注册状态文件路径
/// - `helper_bundle_name`：安装后的辅助程序包名
/// - `helper_source_relative`：辅助程序模板在主程序包内的相对路径
/// - `layout`：辅助程序包内部布局
/// - `required_capability`：内嵌扩展必须声明的能力
#[derive(Debug, Clone)]
pub struct RegistrarConfig {
    pub system_applications: PathBuf,
    pub user_applications: PathBuf,
    pub state_file: PathBuf,
    pub helper_bundle_name: String,
    pub helper_source_relative: PathBuf,
    pub layout: HelperLayout,
    pub required_capability: String,
}

impl RegistrarConfig {
    /// 以给定主目录与系统应用目录构建配置（其余项取默认值）。
    pub fn for_roots(home: &Path, system_applications: &Path) -> Self {
        Self {
            system_applications: system_applications.to_path_buf(),
            user_applications: paths::user_applications_dir(home),
            state_file: paths::default_state_file(home),
            helper_bundle_name: HELPER_BUNDLE_NAME.to_string(),
            helper_source_relative: PathBuf::from("Contents/Resources").join(HELPER_BUNDLE_NAME),
            layout: HelperLayout::default(),
            required_capability: SANDBOX_CAPABILITY.to_string(),
        }
    }

    /// 从环境变量构建配置。
    ///
    /// 覆盖项：
    /// - `PEEKDOWN_SYSTEM_APPLICATIONS`：系统级应用目录
    /// - `PEEKDOWN_USER_APPLICATIONS`：用户级应用目录
    /// - `PEEKDOWN_STATE_FILE`：注册状态文件
    ///
    /// 异常处理：
    /// - `HOME` 不可读时返回错误。
    pub fn from_env() -> Result<Self> {
        let home = paths::home_dir()?;
        let system = env_path("PEEKDOWN_SYSTEM_APPLICATIONS")
            .unwrap_or_else(|| PathBuf::from(paths::SYSTEM_APPLICATIONS));
        let mut config = Self::for_roots(&home, &system);
        if let Some(p) = env_path("PEEKDOWN_USER_APPLICATIONS") {
            config.user_applications = p;
        }
        if let Some(p) = env_path("PEEKDOWN_STATE_FILE") {
            config.state_file = p;
        }
        Ok(config)
    }

    /// 可信应用目录列表（系统级在前）。
    pub fn trusted_dirs(&self) -> [&Path; 2] {
        [&self.system_applications, &self.user_applications]
    }

    /// 判断路径是否位于任一可信应用目录之下。
    pub fn is_trusted_location(&self, path: &Path) -> bool {
        self.trusted_dirs()
            .iter()
            .any(|root| paths::is_rooted_under(path, root))
    }

    /// 主程序包内的辅助程序模板路径。
    pub fn helper_source_in(&self, host_bundle: &Path) -> PathBuf {
        host_bundle.join(&self.helper_source_relative)
    }

    /// 计算辅助程序的安装目标路径：与主程序包位于同一目录。
    ///
    /// 说明：
    /// - 主程序位于 `/Applications` 时安装到 `/Applications/Peekdown Helper.app`
    /// - 主程序移动到 `~/Applications` 后目标随之变化，旧安装由注册器清理
    pub fn helper_target_for(&self, host_bundle: &Path) -> PathBuf {
        let parent = host_bundle
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.user_applications.clone());
        parent.join(&self.helper_bundle_name)
    }
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var_os(name)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}
