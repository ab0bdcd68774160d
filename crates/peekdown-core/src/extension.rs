//! 系统扩展注册表接口（预览/索引扩展的激活与注销）。
//!
//! 约定：
//! - 所有调用都是尽力而为：接口不返回结果，失败不会被上报为注册失败
//! - 激活是注册决策的“后果”，以分离任务派发，不等待完成
//! - 扩展最终是否生效由系统自身的扩展加载机制裁决
//!
//! 作者：Peekdown 项目组（自动生成）
//! 创建时间：2026-10-18
//! 修改时间：2026-10-18

use std::path::Path;

/// 系统扩展注册表。
pub trait ExtensionRegistry {
    /// 激活新安装的辅助程序：清除隔离标记、登记扩展、启动辅助程序完成自注册。
    ///
    /// 参数：
    /// - `helper`：已提交的辅助程序包
    /// - `extension_bundle`：其内嵌扩展包（`.appex`）
    ///
    /// 说明：
    /// - 派发后立即返回，不等待结果
    fn activate(&self, helper: &Path, extension_bundle: &Path);

    /// 从注册表注销一个扩展包（用于旧安装位置被取代时）。
    ///
    /// 说明：
    /// - 返回时注销请求已执行完毕（以便随后删除文件），但结果被忽略
    fn deactivate(&self, extension_bundle: &Path);
}
