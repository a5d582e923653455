use std::io;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;
use tracing::info;

use crate::config::{self, Config};
use crate::i18n::{self, keys, Translator};
use crate::parenteral::{self, PatientInputs};
use crate::solution_db::SolutionSelection;
use crate::ui_cli::{self, MenuChoice};

/// 애플리케이션 실행 중 발생 가능한 오류를 표현한다.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("입출력 오류: {0}")]
    Io(#[from] std::io::Error),
    #[error("설정 오류: {0}")]
    Config(#[from] config::ConfigError),
    #[error("JSON 출력 오류: {0}")]
    Json(#[from] serde_json::Error),
    #[error("알 수 없는 포도당 원액: {0}")]
    UnknownSolution(String),
}

/// 정맥영양(PN) 수액 계획과 포도당/전해질 조제 계산기.
#[derive(Debug, Parser)]
#[command(name = "pn_toolbox_cli", version)]
pub struct Cli {
    /// 표시 언어 (auto, ko, en)
    #[arg(long, default_value = "auto")]
    pub lang: String,
    /// 설정 파일 경로
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
    /// 언어팩(<code>.toml) 디렉터리
    #[arg(long)]
    pub locales: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// 인자로 받은 값으로 한 번 계산하고 종료한다.
    Calc(CalcArgs),
}

/// 생략한 값은 설정 파일의 기본값을 쓴다.
#[derive(Debug, Clone, Default, Args)]
pub struct CalcArgs {
    /// 체중 [kg]
    #[arg(long)]
    pub weight: Option<f64>,
    /// 총 수액량 [ml/kg/day]
    #[arg(long)]
    pub tfi: Option<f64>,
    /// 경장 수유량 [ml/24h]
    #[arg(long)]
    pub feeds: Option<f64>,
    /// 정맥 약물/플러시 [ml/24h]
    #[arg(long)]
    pub meds: Option<f64>,
    /// 아미노산 [g/kg/day]
    #[arg(long)]
    pub amino_acids: Option<f64>,
    /// 지질 [g/kg/day]
    #[arg(long)]
    pub lipids: Option<f64>,
    /// 나트륨 [mEq/kg/day]
    #[arg(long)]
    pub sodium: Option<f64>,
    /// 칼륨 [mEq/kg/day]
    #[arg(long)]
    pub potassium: Option<f64>,
    /// 10% 글루콘산칼슘 [ml/kg/day]
    #[arg(long)]
    pub calcium: Option<f64>,
    /// GIR [mg/kg/min]
    #[arg(long)]
    pub gir: Option<f64>,
    /// 사용할 포도당 원액 (예: --solution D10W,D5W)
    #[arg(long = "solution", value_delimiter = ',')]
    pub solutions: Vec<String>,
    /// 결과를 JSON으로 출력
    #[arg(long)]
    pub json: bool,
}

impl CalcArgs {
    /// 인자 값을 기본 입력 위에 덮어쓴다. 음수는 0으로 취급한다.
    pub fn patient_inputs(&self, defaults: &PatientInputs) -> PatientInputs {
        let pick = |arg: Option<f64>, fallback: f64| match arg {
            Some(v) if v.is_finite() => v.max(0.0),
            Some(_) => 0.0,
            None => fallback,
        };
        PatientInputs {
            weight_kg: pick(self.weight, defaults.weight_kg),
            tfi_ml_per_kg: pick(self.tfi, defaults.tfi_ml_per_kg),
            feeds_ml: pick(self.feeds, defaults.feeds_ml),
            meds_ml: pick(self.meds, defaults.meds_ml),
            amino_acid_g_per_kg: pick(self.amino_acids, defaults.amino_acid_g_per_kg),
            lipid_g_per_kg: pick(self.lipids, defaults.lipid_g_per_kg),
            sodium_meq_per_kg: pick(self.sodium, defaults.sodium_meq_per_kg),
            potassium_meq_per_kg: pick(self.potassium, defaults.potassium_meq_per_kg),
            calcium_gluconate_ml_per_kg: pick(self.calcium, defaults.calcium_gluconate_ml_per_kg),
            gir_mg_per_kg_min: pick(self.gir, defaults.gir_mg_per_kg_min),
        }
    }

    /// 원액 인자가 없으면 설정값을, 있으면 그 목록만 사용한다.
    pub fn selection(&self, defaults: &SolutionSelection) -> Result<SolutionSelection, AppError> {
        if self.solutions.is_empty() {
            return Ok(defaults.clone());
        }
        let mut selection = SolutionSelection::none();
        for name in &self.solutions {
            if !selection.insert(name) {
                return Err(AppError::UnknownSolution(name.clone()));
            }
        }
        Ok(selection)
    }
}

fn translator(cli: &Cli, cfg: &Config) -> Translator {
    let lang = i18n::resolve_language(&cli.lang, Some(&cfg.language));
    Translator::new_with_pack(&lang, cli.locales.as_deref())
}

/// 명령줄 인자에 따라 일회성 계산 또는 대화형 메뉴를 실행한다.
pub fn run(cli: &Cli, config: &mut Config) -> Result<(), AppError> {
    match &cli.command {
        Some(Command::Calc(args)) => run_calc(&translator(cli, config), config, args),
        None => run_interactive(cli, config),
    }
}

fn run_calc(tr: &Translator, config: &Config, args: &CalcArgs) -> Result<(), AppError> {
    let inputs = args.patient_inputs(&config.defaults);
    let selection = args.selection(&config.enabled_solutions)?;
    info!(weight = inputs.weight_kg, gir = inputs.gir_mg_per_kg_min, "one-shot calculation");

    let calc = parenteral::calculate(&inputs, &selection);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&calc)?);
        return Ok(());
    }
    match calc {
        Some(calc) => print!("{}", ui_cli::format_results(tr, &calc)),
        None => println!("{}", tr.t(keys::RESULT_NEED_WEIGHT)),
    }
    Ok(())
}

/// CLI 애플리케이션의 메인 루프를 실행한다.
///
/// 환자 입력은 세션 동안만 유지되고 저장하지 않는다.
fn run_interactive(cli: &Cli, config: &mut Config) -> Result<(), AppError> {
    let mut tr = translator(cli, config);
    let mut inputs = config.defaults;
    let mut selection = config.enabled_solutions.clone();
    let mut input = io::stdin().lock();
    loop {
        match ui_cli::main_menu(&tr, &mut input)? {
            MenuChoice::Inputs => {
                ui_cli::handle_inputs(&tr, &mut inputs, &mut input)?;
                ui_cli::handle_results(&tr, &inputs, &selection);
            }
            MenuChoice::Solutions => {
                ui_cli::handle_solutions(&tr, &mut selection, &mut input)?;
                ui_cli::handle_results(&tr, &inputs, &selection);
            }
            MenuChoice::Results => ui_cli::handle_results(&tr, &inputs, &selection),
            MenuChoice::Settings => {
                if ui_cli::handle_settings(&tr, config, &mut input)? {
                    config.save()?;
                    info!(language = %config.language, path = %config.path().display(), "settings saved");
                    tr = Translator::new_with_pack(
                        &i18n::resolve_language(&config.language, None),
                        cli.locales.as_deref(),
                    );
                    println!("{}", tr.t(keys::SETTINGS_SAVED));
                }
            }
            MenuChoice::Exit => {
                println!("{}", tr.t(keys::APP_EXIT));
                break;
            }
        }
    }
    Ok(())
}
