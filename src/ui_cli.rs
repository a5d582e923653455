use std::fmt::Write as _;
use std::io::{self, BufRead, Write};

use crate::app::AppError;
use crate::config::Config;
use crate::i18n::{keys, Translator};
use crate::parenteral::{
    self, parse_or_zero, MixError, MixRecipe, PatientInputs, PnCalculation,
    FIXED_BATCH_VOLUME_ML, VOLUME_TOLERANCE_ML,
};
use crate::solution_db::{self, SolutionSelection};

/// 메인 메뉴 선택지를 표현한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Inputs,
    Solutions,
    Results,
    Settings,
    Exit,
}

/// 메인 메뉴를 표시하고 선택값을 반환한다. 입력이 끝나면(EOF) 종료로 본다.
pub fn main_menu(tr: &Translator, input: &mut impl BufRead) -> Result<MenuChoice, AppError> {
    println!("{}", tr.t(keys::MAIN_MENU_TITLE));
    println!("{}", tr.t(keys::MAIN_MENU_INPUTS));
    println!("{}", tr.t(keys::MAIN_MENU_SOLUTIONS));
    println!("{}", tr.t(keys::MAIN_MENU_RESULTS));
    println!("{}", tr.t(keys::MAIN_MENU_SETTINGS));
    println!("{}", tr.t(keys::MAIN_MENU_EXIT));
    loop {
        let Some(sel) = read_line(input, tr.t(keys::PROMPT_MENU_SELECT))? else {
            return Ok(MenuChoice::Exit);
        };
        match sel.trim() {
            "1" => return Ok(MenuChoice::Inputs),
            "2" => return Ok(MenuChoice::Solutions),
            "3" => return Ok(MenuChoice::Results),
            "4" => return Ok(MenuChoice::Settings),
            "0" => return Ok(MenuChoice::Exit),
            _ => println!("{}", tr.t(keys::INVALID_SELECTION_RETRY)),
        }
    }
}

/// 환자 입력 메뉴. 각 항목을 차례로 묻는다.
///
/// 입력이 도중에 끝나면 남은 항목은 현재 값을 유지한다.
pub fn handle_inputs(
    tr: &Translator,
    inputs: &mut PatientInputs,
    input: &mut impl BufRead,
) -> Result<(), AppError> {
    println!("{}", tr.t(keys::INPUTS_HEADING));
    println!("{}", tr.t(keys::INPUTS_HINT));
    let fields: [(&str, &mut f64); 10] = [
        (keys::LABEL_WEIGHT, &mut inputs.weight_kg),
        (keys::LABEL_TFI, &mut inputs.tfi_ml_per_kg),
        (keys::LABEL_FEEDS, &mut inputs.feeds_ml),
        (keys::LABEL_MEDS, &mut inputs.meds_ml),
        (keys::LABEL_AMINO_ACIDS, &mut inputs.amino_acid_g_per_kg),
        (keys::LABEL_LIPIDS, &mut inputs.lipid_g_per_kg),
        (keys::LABEL_SODIUM, &mut inputs.sodium_meq_per_kg),
        (keys::LABEL_POTASSIUM, &mut inputs.potassium_meq_per_kg),
        (keys::LABEL_CALCIUM, &mut inputs.calcium_gluconate_ml_per_kg),
        (keys::LABEL_GIR, &mut inputs.gir_mg_per_kg_min),
    ];
    for (key, value) in fields {
        let Some(s) = read_line(input, &format!("{} ({}): ", tr.t(key), value))? else {
            println!();
            break;
        };
        if !s.trim().is_empty() {
            *value = parse_or_zero(&s);
        }
    }
    Ok(())
}

/// 포도당 원액 체크 메뉴.
pub fn handle_solutions(
    tr: &Translator,
    selection: &mut SolutionSelection,
    input: &mut impl BufRead,
) -> Result<(), AppError> {
    let catalog = solution_db::solutions();
    loop {
        println!("{}", tr.t(keys::SOLUTIONS_HEADING));
        for (i, s) in catalog.iter().enumerate() {
            let mark = if selection.contains(s.name) { "x" } else { " " };
            println!("{}) [{mark}] {}", i + 1, s.name);
        }
        let sel = match read_line(input, tr.t(keys::SOLUTIONS_PROMPT_TOGGLE))? {
            Some(sel) if !sel.trim().is_empty() => sel,
            _ => return Ok(()),
        };
        match sel.trim().parse::<usize>() {
            Ok(n) if (1..=catalog.len()).contains(&n) => {
                selection.toggle(catalog[n - 1].name);
            }
            _ => println!("{}", tr.t(keys::INVALID_SELECTION_RETRY)),
        }
    }
}

/// 현재 입력으로 전체 계산을 다시 수행해 출력한다.
pub fn handle_results(tr: &Translator, inputs: &PatientInputs, selection: &SolutionSelection) {
    match parenteral::calculate(inputs, selection) {
        Some(calc) => print!("{}", format_results(tr, &calc)),
        None => println!("{}", tr.t(keys::RESULT_NEED_WEIGHT)),
    }
    println!("\n{}", tr.t(keys::DISCLAIMER));
}

/// 설정 메뉴를 처리한다. 변경되면 true.
pub fn handle_settings(
    tr: &Translator,
    cfg: &mut Config,
    input: &mut impl BufRead,
) -> Result<bool, AppError> {
    println!("{}", tr.t(keys::SETTINGS_HEADING));
    println!("{}: {}", tr.t(keys::SETTINGS_CURRENT_LANGUAGE), cfg.language);
    println!("{}", tr.t(keys::SETTINGS_OPTIONS));
    let Some(sel) = read_line(input, tr.t(keys::SETTINGS_PROMPT_CHANGE))? else {
        return Ok(false);
    };
    let language = match sel.trim() {
        "" => return Ok(false),
        "1" => "ko",
        "2" => "en",
        "3" => "auto",
        _ => {
            println!("{}", tr.t(keys::SETTINGS_INVALID));
            return Ok(false);
        }
    };
    cfg.language = language.to_string();
    Ok(true)
}

/// 계산 결과 전체를 사람이 읽는 텍스트로 만든다.
pub fn format_results(tr: &Translator, calc: &PnCalculation) -> String {
    let plan = &calc.plan;
    let kcal = &plan.calories;
    let mut out = String::new();

    let _ = writeln!(out, "\n{}", tr.t(keys::FLUID_SUMMARY));
    row(&mut out, tr.t(keys::FLUID_TFI), plan.total_fluid_intake_ml, 2, "ml/day");
    row(&mut out, tr.t(keys::FLUID_PN), plan.parenteral_volume_ml, 2, "ml/day");

    let _ = writeln!(out, "\n{}", tr.t(keys::CALORIE_SUMMARY));
    for (key, value, percent) in [
        (keys::KCAL_DEXTROSE, kcal.dextrose_kcal, kcal.dextrose_percent),
        (keys::KCAL_AMINO_ACIDS, kcal.amino_acid_kcal, kcal.amino_acid_percent),
        (keys::KCAL_LIPIDS, kcal.lipid_kcal, kcal.lipid_percent),
    ] {
        let _ = writeln!(
            out,
            "  {:<36} {:>10.1} kcal/day ({percent:.1}%)",
            tr.t(key),
            value
        );
    }
    row(&mut out, tr.t(keys::KCAL_TOTAL), kcal.total_kcal, 1, "kcal/day");
    row(&mut out, tr.t(keys::KCAL_PER_KG), kcal.kcal_per_kg, 1, "kcal/kg/day");

    let _ = writeln!(out, "\n{}", tr.t(keys::RATES_HEADING));
    row(&mut out, tr.t(keys::AMINO_ACID_VOLUME), plan.amino_acid_volume_ml, 2, "ml/day");
    row(&mut out, tr.t(keys::AMINO_ACID_RATE), plan.amino_acid_rate_ml_per_h, 2, "ml/hr");
    row(&mut out, tr.t(keys::LIPID_VOLUME), plan.lipid_volume_ml, 2, "ml/day");
    row(&mut out, tr.t(keys::LIPID_RATE), plan.lipid_rate_ml_per_h, 2, "ml/hr");
    row(
        &mut out,
        tr.t(keys::DEXTROSE_VOLUME),
        plan.dextrose_electrolyte_volume_ml,
        2,
        "ml/day",
    );
    row(
        &mut out,
        tr.t(keys::DEXTROSE_RATE),
        plan.dextrose_electrolyte_rate_ml_per_h,
        2,
        "ml/hr",
    );

    let _ = writeln!(out, "\n{}", tr.t(keys::PREP_HEADING));
    let _ = writeln!(
        out,
        "{}",
        tr.fmt(keys::PREP_NOTE, &[("volume", format!("{FIXED_BATCH_VOLUME_ML}"))])
    );
    out.push_str(&format_recipe(tr, &calc.mix));
    out
}

/// 조제 레시피 또는 오류 메시지를 텍스트로 만든다.
pub fn format_recipe(tr: &Translator, mix: &Result<MixRecipe, MixError>) -> String {
    let mut out = String::new();
    let recipe = match mix {
        Ok(recipe) => recipe,
        Err(e) => {
            let _ = writeln!(out, "{}: {e}", tr.t(keys::PREP_ERROR));
            return out;
        }
    };

    let _ = writeln!(
        out,
        "{}",
        tr.fmt(
            keys::PREP_MIX_INTRO,
            &[("volume", format!("{:.2}", recipe.final_volume_ml))]
        )
    );
    let electrolytes = [
        (keys::STOCK_SODIUM, recipe.sodium_volume_ml),
        (keys::STOCK_POTASSIUM, recipe.potassium_volume_ml),
        (keys::STOCK_CALCIUM, recipe.calcium_volume_ml),
    ];
    let parts = recipe
        .parts
        .iter()
        .map(|p| (p.solution.to_string(), p.volume_ml))
        .chain(
            electrolytes
                .into_iter()
                .filter(|(_, v)| *v > VOLUME_TOLERANCE_ML)
                .map(|(key, v)| (tr.t(key).to_string(), v)),
        );
    for (name, volume) in parts {
        let _ = writeln!(
            out,
            "{}",
            tr.fmt(
                keys::PREP_PART,
                &[("volume", format!("{volume:.2}")), ("name", name)]
            )
        );
    }
    let _ = writeln!(
        out,
        "{}",
        tr.fmt(
            keys::PREP_PROVIDES,
            &[
                ("grams", format!("{:.2}", recipe.target_grams)),
                ("percent", format!("{:.1}", recipe.final_concentration * 100.0)),
            ]
        )
    );
    out
}

fn row(out: &mut String, label: &str, value: f64, precision: usize, unit: &str) {
    let _ = writeln!(out, "  {label:<36} {value:>10.precision$} {unit}");
}

/// 프롬프트를 출력하고 한 줄을 읽는다. EOF면 `None`.
fn read_line(input: &mut impl BufRead, prompt: &str) -> Result<Option<String>, AppError> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut buf = String::new();
    if input.read_line(&mut buf)? == 0 {
        return Ok(None);
    }
    Ok(Some(buf))
}
