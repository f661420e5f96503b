use clap::{Parser, Subcommand};
use ignitor::logging::LogFormat;
use std::path::PathBuf;

/// ignitor - 应用启动与日志工具
#[derive(Parser, Debug)]
#[command(name = "ignitor")]
#[command(about = "启动应用目录并通过日志驱动写入消息")]
pub struct Args {
    /// 应用根目录
    #[arg(long, global = true, default_value = ".")]
    pub root: String,

    /// 诊断输出详细程度（可重复）
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// 诊断输出格式：pretty、json 或 compact
    #[arg(long, global = true, default_value = "compact")]
    pub log_format: LogFormat,

    /// 子命令
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 通过日志驱动写入一条消息
    Log {
        /// 驱动名称，缺省使用 app.logger.driver
        #[arg(long)]
        driver: Option<String>,
        /// 消息级别
        #[arg(long, default_value = "info")]
        level: String,
        /// 临时覆盖驱动阈值
        #[arg(long)]
        threshold: Option<String>,
        /// 消息内容
        message: String,
    },
    /// 打印配置值（点分键）
    Config {
        key: String,
    },
    /// 显示已注册的驱动与日志文件位置
    Drivers,
}

impl Args {
    pub fn root_path(&self) -> PathBuf {
        ignitor::utils::paths::expand_user(&self.root)
    }
}
