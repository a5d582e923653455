use serde::{Deserialize, Serialize};

/// 한 번의 계산에 쓰이는 환자 입력 스냅샷.
///
/// 모든 값은 0 이상의 실수이며, 비어 있거나 해석할 수 없는 입력은 0으로 취급한다.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientInputs {
    /// 체중 [kg]
    pub weight_kg: f64,
    /// 총 수액량(TFI) [ml/kg/day]
    pub tfi_ml_per_kg: f64,
    /// 경장 영양(수유) 량 [ml/24h]
    pub feeds_ml: f64,
    /// 기타 정맥 약물/플러시 량 [ml/24h]
    pub meds_ml: f64,
    /// 아미노산 [g/kg/day]
    pub amino_acid_g_per_kg: f64,
    /// 지질 [g/kg/day]
    pub lipid_g_per_kg: f64,
    /// 나트륨 (3% NaCl) [mEq/kg/day]
    pub sodium_meq_per_kg: f64,
    /// 칼륨 (KCl) [mEq/kg/day]
    pub potassium_meq_per_kg: f64,
    /// 10% 글루콘산칼슘 [ml/kg/day]
    pub calcium_gluconate_ml_per_kg: f64,
    /// 포도당 주입 속도(GIR) [mg/kg/min]
    pub gir_mg_per_kg_min: f64,
}

impl PatientInputs {
    /// 입력 폼의 기본값. 체중만 비워 둔다.
    pub fn clinical_defaults() -> Self {
        Self {
            weight_kg: 0.0,
            tfi_ml_per_kg: 150.0,
            feeds_ml: 0.0,
            meds_ml: 0.0,
            amino_acid_g_per_kg: 3.5,
            lipid_g_per_kg: 3.0,
            sodium_meq_per_kg: 3.0,
            potassium_meq_per_kg: 2.0,
            calcium_gluconate_ml_per_kg: 2.0,
            gir_mg_per_kg_min: 8.0,
        }
    }

    /// 체중이 없으면 어떤 계산도 의미가 없다.
    pub fn has_weight(&self) -> bool {
        self.weight_kg > 0.0
    }
}

/// 문자열 입력을 관대하게 해석한다. 빈 값, 숫자가 아닌 값, 음수, 무한대는 0이 된다.
pub fn parse_or_zero(text: &str) -> f64 {
    match text.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}
