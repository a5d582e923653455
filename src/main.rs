use clap::Parser;
use pn_toolbox::{app, config, logger};

/// 프로그램의 엔트리 포인트. 설정을 로드한 뒤 CLI 애플리케이션을 실행한다.
fn main() {
    let cli = app::Cli::parse();
    if let Err(err) = try_run(&cli) {
        eprintln!("오류: {err}");
        std::process::exit(1);
    }
}

fn try_run(cli: &app::Cli) -> Result<(), app::AppError> {
    let mut cfg = config::load_or_default(&cli.config)?;
    logger::setup_log(&cfg.log_level);
    app::run(cli, &mut cfg)?;
    Ok(())
}
