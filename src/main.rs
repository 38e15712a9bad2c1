use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use si_units_codegen::{app, config};
use tracing_subscriber::EnvFilter;

/// 물리량 카탈로그에서 차원 관계를 찾아 단위 라이브러리 소스를 생성한다.
#[derive(Debug, Parser)]
#[command(name = "si_units_codegen", version, about)]
struct Cli {
    /// 설정 파일 경로(없으면 기본값으로 생성)
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,
    /// 로그 상세도(-v: debug, -vv: trace). RUST_LOG가 있으면 그것을 따른다.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 분류별 `<category>.rs` 모듈을 생성한다.
    Generate {
        /// 설정의 output_dir 대신 사용할 디렉터리
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// 파일을 쓰지 않고 대상 경로만 출력
        #[arg(long)]
        dry_run: bool,
    },
    /// 차원 동치 물리량, 역수 관계, 역수 제안을 보고한다.
    Check {
        /// 제안된 물리량/측정 단위를 TOML로 저장할 경로
        #[arg(long)]
        suggestions: Option<PathBuf>,
    },
    /// `energy / time` 같은 관계식의 결과 차원과 물리량을 출력한다.
    Eval { expression: String },
}

/// 프로그램의 엔트리 포인트. 설정을 로드한 뒤 하위 명령을 실행한다.
fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if let Err(err) = try_run(cli) {
        eprintln!("오류: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn try_run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::load_or_default(&cli.config)?;
    match cli.command {
        Command::Generate {
            output_dir,
            dry_run,
        } => {
            let dir = output_dir.unwrap_or_else(|| cfg.output_dir.clone());
            for path in app::generate(&cfg, &dir, dry_run)? {
                println!("{}", path.display());
            }
        }
        Command::Check { suggestions } => {
            print!("{}", app::check(&cfg, suggestions.as_deref())?);
        }
        Command::Eval { expression } => {
            let evaluation = app::eval(&cfg, &expression)?;
            if evaluation.matches.is_empty() {
                println!("{} (일치하는 물리량 없음)", evaluation.dimension);
            } else {
                println!("{} = {}", evaluation.dimension, evaluation.matches.join(", "));
            }
        }
    }
    Ok(())
}
