//! tracing-subscriber の初期化
//!
//! `RUST_LOG` があればそれを優先し、無ければ `-v` の回数で level を決める。
//! ログはすべて stderr へ。stdout は status / dry run の出力専用。

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub fn default_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

pub fn init(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let subscriber = tracing_subscriber::registry().with(filter).with(
        fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(std::io::stderr),
    );

    // 二重初期化は無視（テストから呼ばれた場合など）
    let _ = subscriber.try_init();
}
