use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "feed-preload",
    version,
    about = "短视频信息流滑动窗口预加载模拟器"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// 覆盖数据目录（默认走系统 data_local_dir）
    #[arg(long, env = "FEED_PRELOAD_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// 覆盖日志目录（默认 `{data_dir}/logs`）
    #[arg(long, env = "FEED_PRELOAD_LOG_DIR", global = true)]
    pub log_dir: Option<PathBuf>,

    /// 覆盖日志过滤（等价于设置 RUST_LOG）
    #[arg(long, env = "RUST_LOG", global = true)]
    pub log_filter: Option<String>,

    /// 日志同时输出到 stderr
    #[arg(long, global = true)]
    pub stderr_log: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// 按给定索引序列驱动窗口
    Simulate {
        /// 条目总数（缺省为无限滚动）
        #[arg(long)]
        items: Option<usize>,

        /// 依次上报的当前索引，逗号分隔
        #[arg(long, value_delimiter = ',', required = true)]
        path: Vec<usize>,
    },

    /// 随机单步滚动
    Walk {
        /// 条目总数（缺省为无限滚动）
        #[arg(long)]
        items: Option<usize>,

        #[arg(long, default_value_t = 50)]
        steps: usize,

        #[arg(long, default_value_t = 7)]
        seed: u64,
    },

    /// 打印当前生效的设置（不存在时写入默认值）
    Settings,
}
