use std::time::Instant;

use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::{self};
use tracing_subscriber::prelude::__tracing_subscriber_SubscriberExt;
use tracing_subscriber::registry::Registry;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// tracing 로거를 설정한다.
///
/// 로그 레벨은 설정 파일 값을 쓰고, `RUST_LOG` 환경변수가 있으면 그쪽이 우선한다.
/// 출력은 표준 에러로 보내 CLI 결과(표준 출력)와 섞이지 않게 한다.
/// 이미 전역 구독자가 설치돼 있으면 아무것도 하지 않는다.
pub fn setup_log(level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let timestamper = CompactTimestamp {
        start: Instant::now(),
    };

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .with_timer(timestamper);

    let _ = Registry::default()
        .with(env_filter)
        .with(stderr_layer)
        .try_init();
}

#[derive(Clone)]
struct CompactTimestamp {
    start: Instant,
}

impl FormatTime for CompactTimestamp {
    fn format_time(
        &self,
        w: &mut tracing_subscriber::fmt::format::Writer<'_>,
    ) -> Result<(), std::fmt::Error> {
        let elapsed = self.start.elapsed();
        let minutes = elapsed.as_secs() / 60;
        let seconds = elapsed.as_secs() % 60;
        let millis = elapsed.subsec_millis();

        write!(w, "{:02}m {:02}.{:03}s", minutes, seconds, millis)
    }
}
