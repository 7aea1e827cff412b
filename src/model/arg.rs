//! 命令行参数定义

use clap::Parser;

/// 本地密钥保险箱 HTTP 服务
#[derive(Parser, Debug)]
#[command(name = "keybox-rs", version, about = "本地密钥保险箱 HTTP 服务")]
pub struct Args {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<String>,

    /// 密钥文件路径（覆盖配置中的 keysFile）
    #[arg(short, long)]
    pub keys: Option<String>,
}
