use std::collections::HashMap;
use std::fs;
use std::path::Path;
use sys_locale::get_locale;

/// 문자열 키를 모아두는 네임스페이스.
pub mod keys {
    pub const ERROR_PREFIX: &str = "general.error_prefix";
    pub const APP_EXIT: &str = "general.app_exit";
    pub const DISCLAIMER: &str = "general.disclaimer";

    pub const MAIN_MENU_TITLE: &str = "main_menu.title";
    pub const MAIN_MENU_INPUTS: &str = "main_menu.inputs";
    pub const MAIN_MENU_SOLUTIONS: &str = "main_menu.solutions";
    pub const MAIN_MENU_RESULTS: &str = "main_menu.results";
    pub const MAIN_MENU_SETTINGS: &str = "main_menu.settings";
    pub const MAIN_MENU_EXIT: &str = "main_menu.exit";
    pub const PROMPT_MENU_SELECT: &str = "prompt.menu_select";
    pub const INVALID_SELECTION_RETRY: &str = "error.invalid_selection_retry";

    pub const INPUTS_HEADING: &str = "inputs.heading";
    pub const INPUTS_HINT: &str = "inputs.hint";
    pub const LABEL_WEIGHT: &str = "inputs.weight";
    pub const LABEL_TFI: &str = "inputs.tfi";
    pub const LABEL_FEEDS: &str = "inputs.feeds";
    pub const LABEL_MEDS: &str = "inputs.meds";
    pub const LABEL_AMINO_ACIDS: &str = "inputs.amino_acids";
    pub const LABEL_LIPIDS: &str = "inputs.lipids";
    pub const LABEL_SODIUM: &str = "inputs.sodium";
    pub const LABEL_POTASSIUM: &str = "inputs.potassium";
    pub const LABEL_CALCIUM: &str = "inputs.calcium";
    pub const LABEL_GIR: &str = "inputs.gir";

    pub const SOLUTIONS_HEADING: &str = "solutions.heading";
    pub const SOLUTIONS_PROMPT_TOGGLE: &str = "solutions.prompt_toggle";

    pub const RESULT_NEED_WEIGHT: &str = "result.need_weight";
    pub const FLUID_SUMMARY: &str = "result.fluid_summary";
    pub const FLUID_TFI: &str = "result.fluid_tfi";
    pub const FLUID_PN: &str = "result.fluid_pn";
    pub const CALORIE_SUMMARY: &str = "result.calorie_summary";
    pub const KCAL_DEXTROSE: &str = "result.kcal_dextrose";
    pub const KCAL_AMINO_ACIDS: &str = "result.kcal_amino_acids";
    pub const KCAL_LIPIDS: &str = "result.kcal_lipids";
    pub const KCAL_TOTAL: &str = "result.kcal_total";
    pub const KCAL_PER_KG: &str = "result.kcal_per_kg";
    pub const RATES_HEADING: &str = "result.rates_heading";
    pub const AMINO_ACID_VOLUME: &str = "result.amino_acid_volume";
    pub const AMINO_ACID_RATE: &str = "result.amino_acid_rate";
    pub const LIPID_VOLUME: &str = "result.lipid_volume";
    pub const LIPID_RATE: &str = "result.lipid_rate";
    pub const DEXTROSE_VOLUME: &str = "result.dextrose_volume";
    pub const DEXTROSE_RATE: &str = "result.dextrose_rate";
    pub const PREP_HEADING: &str = "prep.heading";
    pub const PREP_NOTE: &str = "prep.note";
    pub const PREP_ERROR: &str = "prep.error";
    pub const PREP_MIX_INTRO: &str = "prep.mix_intro";
    pub const PREP_PART: &str = "prep.part";
    pub const PREP_PROVIDES: &str = "prep.provides";
    pub const STOCK_SODIUM: &str = "stock.sodium";
    pub const STOCK_POTASSIUM: &str = "stock.potassium";
    pub const STOCK_CALCIUM: &str = "stock.calcium";

    pub const SETTINGS_HEADING: &str = "settings.heading";
    pub const SETTINGS_CURRENT_LANGUAGE: &str = "settings.current_language";
    pub const SETTINGS_OPTIONS: &str = "settings.options";
    pub const SETTINGS_PROMPT_CHANGE: &str = "settings.prompt_change";
    pub const SETTINGS_INVALID: &str = "settings.invalid";
    pub const SETTINGS_SAVED: &str = "settings.saved";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Ko,
    En,
}

impl Language {
    fn from_code(code: &str) -> Self {
        let c = code.to_lowercase();
        if c.starts_with("ko") {
            Language::Ko
        } else {
            Language::En
        }
    }

    pub fn as_code(&self) -> &'static str {
        match self {
            Language::Ko => "ko",
            Language::En => "en",
        }
    }
}

/// 런타임 언어 번들을 제공한다.
#[derive(Debug, Clone)]
pub struct Translator {
    lang: Language,
    overrides: Option<HashMap<String, String>>,
}

impl Translator {
    /// 언어 코드(ko/en)에 따라 번역기를 생성한다. 알 수 없는 코드는 en으로 폴백한다.
    pub fn new(lang_code: &str) -> Self {
        Self {
            lang: Language::from_code(lang_code),
            overrides: None,
        }
    }

    /// 언어 코드 + 언어팩 디렉터리(locales/ 등)를 받아서 번역기를 생성한다.
    /// 디렉터리가 없거나 파일이 없으면 내장 문자열만 사용한다.
    pub fn new_with_pack(lang_code: &str, pack_dir: Option<&Path>) -> Self {
        let overrides = pack_dir
            .and_then(|dir| load_overrides(dir, lang_code))
            .or_else(|| load_overrides(Path::new("locales"), lang_code));
        Self {
            lang: Language::from_code(lang_code),
            overrides,
        }
    }

    pub fn language(&self) -> Language {
        self.lang
    }

    pub fn language_code(&self) -> &'static str {
        self.lang.as_code()
    }

    /// 번역을 가져온다. 언어팩 → 내장 문자열 순이며, 없는 키는 키 자체를 돌려준다.
    pub fn t<'a>(&'a self, key: &'a str) -> &'a str {
        if let Some(v) = self.overrides.as_ref().and_then(|m| m.get(key)) {
            return v;
        }
        let built_in = match self.lang {
            Language::En => en(key),
            Language::Ko => ko(key).or_else(|| en(key)),
        };
        built_in.unwrap_or(key)
    }

    /// `{name}` 자리표시자를 채운 번역 문자열.
    pub fn fmt(&self, key: &str, args: &[(&str, String)]) -> String {
        let mut out = self.t(key).to_string();
        for (name, value) in args {
            out = out.replace(&format!("{{{name}}}"), value);
        }
        out
    }
}

/// CLI 플래그/설정/시스템 순으로 언어 코드를 결정한다.
pub fn resolve_language(cli_arg: &str, config_lang: Option<&str>) -> String {
    normalize_lang(cli_arg)
        .or_else(|| config_lang.and_then(normalize_lang))
        .or_else(detect_system_language)
        .unwrap_or_else(|| "en".to_string())
}

fn normalize_lang(code: &str) -> Option<String> {
    let c = code.trim().to_lowercase();
    match c.as_str() {
        "auto" | "" => None,
        other if other.starts_with("ko") => Some("ko".into()),
        other if other.starts_with("en") => Some("en".into()),
        _ => None,
    }
}

fn normalize_locale_string(loc: &str) -> Option<String> {
    let lang = loc
        .split(['.', '_', '-'])
        .next()
        .unwrap_or_default()
        .to_lowercase();
    match lang.as_str() {
        "ko" => Some("ko".into()),
        "en" => Some("en".into()),
        _ => None,
    }
}

/// 시스템 로케일에서 언어를 추정한다.
pub fn detect_system_language() -> Option<String> {
    if let Some(lang) = get_locale().as_deref().and_then(normalize_locale_string) {
        return Some(lang);
    }
    ["LC_ALL", "LANG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find_map(|v| normalize_locale_string(&v))
}

/// TOML 기반 언어팩을 로드한다. 형식: 섹션.키 = "value" 로 구성된 맵.
fn load_overrides(dir: &Path, lang: &str) -> Option<HashMap<String, String>> {
    let path = dir.join(format!("{lang}.toml"));
    let content = fs::read_to_string(path).ok()?;
    parse_toml_to_map(&content)
}

fn parse_toml_to_map(src: &str) -> Option<HashMap<String, String>> {
    let value: toml::Value = toml::from_str(src).ok()?;
    let table = value.as_table()?;
    let mut map = HashMap::new();

    fn walk(prefix: &str, val: &toml::Value, out: &mut HashMap<String, String>) {
        match val {
            toml::Value::String(s) => {
                out.insert(prefix.to_string(), s.to_string());
            }
            toml::Value::Table(t) => {
                for (k, v) in t {
                    let key = if prefix.is_empty() {
                        k.clone()
                    } else {
                        format!("{prefix}.{k}")
                    };
                    walk(&key, v, out);
                }
            }
            _ => {}
        }
    }

    for (k, v) in table {
        walk(k, v, &mut map);
    }

    if map.is_empty() {
        None
    } else {
        Some(map)
    }
}

fn ko(key: &str) -> Option<&'static str> {
    use keys::*;
    let s = match key {
        ERROR_PREFIX => "오류",
        APP_EXIT => "프로그램을 종료합니다.",
        DISCLAIMER => "교육용 도구입니다. 임상 판단을 대신하지 않으며, 사용 전 모든 계산을 확인하세요.",
        MAIN_MENU_TITLE => "\n=== PN Toolbox (TPN 계산기) ===",
        MAIN_MENU_INPUTS => "1) 환자 입력",
        MAIN_MENU_SOLUTIONS => "2) 포도당 원액 선택",
        MAIN_MENU_RESULTS => "3) 계산 결과 보기",
        MAIN_MENU_SETTINGS => "4) 설정",
        MAIN_MENU_EXIT => "0) 종료",
        PROMPT_MENU_SELECT => "메뉴 선택: ",
        INVALID_SELECTION_RETRY => "잘못된 입력입니다. 다시 선택하세요.",
        INPUTS_HEADING => "\n-- 환자 입력 --",
        INPUTS_HINT => "엔터: 현재 값 유지, 숫자가 아니거나 음수이면 0으로 처리",
        LABEL_WEIGHT => "체중 [kg]",
        LABEL_TFI => "총 수액량 TFI [ml/kg/day]",
        LABEL_FEEDS => "경장 수유량 [ml/24h]",
        LABEL_MEDS => "정맥 약물/플러시 [ml/24h]",
        LABEL_AMINO_ACIDS => "아미노산 10% [g/kg/day]",
        LABEL_LIPIDS => "지질 20% [g/kg/day]",
        LABEL_SODIUM => "나트륨 (3% NaCl) [mEq/kg/day]",
        LABEL_POTASSIUM => "칼륨 (KCl) [mEq/kg/day]",
        LABEL_CALCIUM => "10% 글루콘산칼슘 [ml/kg/day]",
        LABEL_GIR => "포도당 주입 속도 GIR [mg/kg/min]",
        SOLUTIONS_HEADING => "\n-- 사용 가능한 포도당 원액 --",
        SOLUTIONS_PROMPT_TOGGLE => "전환할 번호(끝내려면 엔터): ",
        RESULT_NEED_WEIGHT => "체중을 입력하면 결과가 표시됩니다.",
        FLUID_SUMMARY => "[수액 요약]",
        FLUID_TFI => "총 수액량 (TFI)",
        FLUID_PN => "정맥영양 총량 (PN)",
        CALORIE_SUMMARY => "[열량 요약]",
        KCAL_DEXTROSE => "포도당 열량",
        KCAL_AMINO_ACIDS => "아미노산 열량",
        KCAL_LIPIDS => "지질 열량",
        KCAL_TOTAL => "정맥영양 총 열량",
        KCAL_PER_KG => "kg 당 정맥영양 열량",
        RATES_HEADING => "[주입 속도]",
        AMINO_ACID_VOLUME => "아미노산 (10%) 량",
        AMINO_ACID_RATE => "아미노산 속도",
        LIPID_VOLUME => "지질 (20%) 량",
        LIPID_RATE => "지질 속도",
        DEXTROSE_VOLUME => "포도당/전해질 량",
        DEXTROSE_RATE => "포도당/전해질 속도",
        PREP_HEADING => "[포도당/전해질 조제]",
        PREP_NOTE => "표준 {volume} ml 주사기 1개 조제 기준입니다.",
        PREP_ERROR => "계산 오류",
        PREP_MIX_INTRO => "포도당/전해질 수액 {volume} ml 조제 시 다음을 혼합:",
        PREP_PART => "  - {name} {volume} ml",
        PREP_PROVIDES => "포도당 {grams}g, 최종 농도 {percent}% 를 제공합니다.",
        STOCK_SODIUM => "3% 염화나트륨(NaCl)",
        STOCK_POTASSIUM => "염화칼륨(KCl, 2 mEq/ml)",
        STOCK_CALCIUM => "10% 글루콘산칼슘",
        SETTINGS_HEADING => "\n-- 설정 --",
        SETTINGS_CURRENT_LANGUAGE => "현재 언어",
        SETTINGS_OPTIONS => "1) 한국어  2) English  3) 자동",
        SETTINGS_PROMPT_CHANGE => "변경할 번호(취소하려면 엔터): ",
        SETTINGS_INVALID => "잘못된 입력이므로 변경하지 않습니다.",
        SETTINGS_SAVED => "설정이 저장되었습니다.",
        _ => return None,
    };
    Some(s)
}

fn en(key: &str) -> Option<&'static str> {
    use keys::*;
    let s = match key {
        ERROR_PREFIX => "Error",
        APP_EXIT => "Exiting.",
        DISCLAIMER => "Educational use only. This does not replace clinical judgment; verify all calculations before clinical use.",
        MAIN_MENU_TITLE => "\n=== PN Toolbox (TPN calculator) ===",
        MAIN_MENU_INPUTS => "1) Patient inputs",
        MAIN_MENU_SOLUTIONS => "2) Dextrose solutions",
        MAIN_MENU_RESULTS => "3) Show results",
        MAIN_MENU_SETTINGS => "4) Settings",
        MAIN_MENU_EXIT => "0) Exit",
        PROMPT_MENU_SELECT => "Select: ",
        INVALID_SELECTION_RETRY => "Invalid selection, try again.",
        INPUTS_HEADING => "\n-- Patient Inputs --",
        INPUTS_HINT => "Enter keeps the current value; non-numeric or negative input counts as 0",
        LABEL_WEIGHT => "Weight [kg]",
        LABEL_TFI => "Total Fluid Intake (TFI) [ml/kg/day]",
        LABEL_FEEDS => "Enteral Feeds Volume [ml/24h]",
        LABEL_MEDS => "IV Meds/Flushes [ml/24h]",
        LABEL_AMINO_ACIDS => "Amino Acids (10%) [g/kg/day]",
        LABEL_LIPIDS => "Lipids (20%) [g/kg/day]",
        LABEL_SODIUM => "Sodium (as 3% NaCl) [mEq/kg/day]",
        LABEL_POTASSIUM => "Potassium (as KCl) [mEq/kg/day]",
        LABEL_CALCIUM => "Calcium Gluconate 10% [ml/kg/day]",
        LABEL_GIR => "Glucose Infusion Rate (GIR) [mg/kg/min]",
        SOLUTIONS_HEADING => "\n-- Available Dextrose Solutions --",
        SOLUTIONS_PROMPT_TOGGLE => "Number to toggle (Enter to finish): ",
        RESULT_NEED_WEIGHT => "Enter patient weight to see results.",
        FLUID_SUMMARY => "[Fluid Summary]",
        FLUID_TFI => "Total Fluid Intake (TFI)",
        FLUID_PN => "Total Parenteral Nutrition (PN)",
        CALORIE_SUMMARY => "[Calorie Summary]",
        KCAL_DEXTROSE => "Calories from Dextrose",
        KCAL_AMINO_ACIDS => "Calories from Amino Acids",
        KCAL_LIPIDS => "Calories from Lipids",
        KCAL_TOTAL => "Total Parenteral Calories",
        KCAL_PER_KG => "Total Parenteral Calories per kg",
        RATES_HEADING => "[Infusion Rates]",
        AMINO_ACID_VOLUME => "Amino Acids (10%) Volume",
        AMINO_ACID_RATE => "Amino Acid Rate",
        LIPID_VOLUME => "Lipids (20%) Volume",
        LIPID_RATE => "Lipid Rate",
        DEXTROSE_VOLUME => "Dextrose/Electrolyte Volume",
        DEXTROSE_RATE => "Dextrose/Electrolyte Rate",
        PREP_HEADING => "[Dextrose/Electrolyte Preparation]",
        PREP_NOTE => "This calculation is for preparing a standard {volume} ml syringe for infusion.",
        PREP_ERROR => "Calculation Error",
        PREP_MIX_INTRO => "To prepare {volume} ml of Dextrose/Electrolyte fluid, mix:",
        PREP_PART => "  - {volume} ml of {name}",
        PREP_PROVIDES => "This provides {grams}g of Dextrose at a final concentration of {percent}%.",
        STOCK_SODIUM => "3% NaCl",
        STOCK_POTASSIUM => "KCl (2 mEq/ml)",
        STOCK_CALCIUM => "10% Calcium Gluconate",
        SETTINGS_HEADING => "\n-- Settings --",
        SETTINGS_CURRENT_LANGUAGE => "Current language",
        SETTINGS_OPTIONS => "1) 한국어  2) English  3) Auto",
        SETTINGS_PROMPT_CHANGE => "Number to change (Enter to cancel): ",
        SETTINGS_INVALID => "Invalid input, nothing changed.",
        SETTINGS_SAVED => "Settings saved.",
        _ => return None,
    };
    Some(s)
}
