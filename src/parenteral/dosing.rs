use serde::Serialize;

use super::patient::PatientInputs;

/// 아미노산 원액 농도 (10% w/v)
pub const AMINO_ACID_STOCK_FRACTION: f64 = 0.10;
/// 지질 유제 농도 (20%)
pub const LIPID_STOCK_FRACTION: f64 = 0.20;
pub const KCAL_PER_GRAM_DEXTROSE: f64 = 3.4;
pub const KCAL_PER_GRAM_AMINO_ACID: f64 = 4.0;
/// 20% 지질 유제는 관례상 부피 기준 열량(kcal/ml)으로 계산한다.
pub const KCAL_PER_ML_LIPID_20: f64 = 2.0;
pub const HOURS_PER_DAY: f64 = 24.0;
pub const MINUTES_PER_DAY: f64 = 1440.0;
const MG_PER_GRAM: f64 = 1000.0;

/// 성분별 열량과 비율.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CalorieBreakdown {
    pub dextrose_kcal: f64,
    pub amino_acid_kcal: f64,
    pub lipid_kcal: f64,
    pub total_kcal: f64,
    pub kcal_per_kg: f64,
    /// 총 열량 대비 %, 총 열량이 0이면 0
    pub dextrose_percent: f64,
    pub amino_acid_percent: f64,
    pub lipid_percent: f64,
}

/// 체중 기반 하루 용량을 절대량(ml, g, ml/h)으로 환산한 결과.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DosingPlan {
    /// 총 수액량 [ml/day]
    pub total_fluid_intake_ml: f64,
    /// 정맥영양(PN) 가용량 [ml/day]. 수유/약물량이 크면 음수가 될 수 있다.
    pub parenteral_volume_ml: f64,
    pub amino_acid_grams: f64,
    pub amino_acid_volume_ml: f64,
    pub amino_acid_rate_ml_per_h: f64,
    pub lipid_grams: f64,
    pub lipid_volume_ml: f64,
    pub lipid_rate_ml_per_h: f64,
    /// 포도당+전해질 수액량 [ml/day], 0 이상
    pub dextrose_electrolyte_volume_ml: f64,
    pub dextrose_electrolyte_rate_ml_per_h: f64,
    pub dextrose_grams_per_day: f64,
    pub sodium_meq_per_day: f64,
    pub potassium_meq_per_day: f64,
    pub calcium_gluconate_ml_per_day: f64,
    pub calories: CalorieBreakdown,
}

impl DosingPlan {
    /// 하루 포도당+전해질 수액의 포도당 농도 [g/ml]. 수액량이 없으면 0.
    pub fn daily_dextrose_concentration(&self) -> f64 {
        if self.dextrose_electrolyte_volume_ml > 0.0 {
            self.dextrose_grams_per_day / self.dextrose_electrolyte_volume_ml
        } else {
            0.0
        }
    }
}

/// 환자 입력으로부터 하루 수액/영양 계획을 계산한다.
///
/// 실패하지 않는다. 체중이 0 이하이면 모든 값이 0인 계획을 돌려준다.
pub fn compute_dosing_plan(inputs: &PatientInputs) -> DosingPlan {
    if !inputs.has_weight() {
        return DosingPlan::default();
    }
    let weight = inputs.weight_kg;

    let total_fluid_intake_ml = weight * inputs.tfi_ml_per_kg;
    let parenteral_volume_ml = total_fluid_intake_ml - inputs.feeds_ml - inputs.meds_ml;

    let amino_acid_grams = weight * inputs.amino_acid_g_per_kg;
    let amino_acid_volume_ml = amino_acid_grams / AMINO_ACID_STOCK_FRACTION;

    let lipid_grams = weight * inputs.lipid_g_per_kg;
    let lipid_volume_ml = lipid_grams / LIPID_STOCK_FRACTION;

    let dextrose_electrolyte_volume_ml =
        (parenteral_volume_ml - amino_acid_volume_ml - lipid_volume_ml).max(0.0);

    // GIR(mg/kg/min) -> g/day
    let dextrose_grams_per_day = inputs.gir_mg_per_kg_min * weight * MINUTES_PER_DAY / MG_PER_GRAM;

    let calories = calorie_breakdown(
        weight,
        dextrose_grams_per_day,
        amino_acid_grams,
        lipid_volume_ml,
    );

    DosingPlan {
        total_fluid_intake_ml,
        parenteral_volume_ml,
        amino_acid_grams,
        amino_acid_volume_ml,
        amino_acid_rate_ml_per_h: amino_acid_volume_ml / HOURS_PER_DAY,
        lipid_grams,
        lipid_volume_ml,
        lipid_rate_ml_per_h: lipid_volume_ml / HOURS_PER_DAY,
        dextrose_electrolyte_volume_ml,
        dextrose_electrolyte_rate_ml_per_h: dextrose_electrolyte_volume_ml / HOURS_PER_DAY,
        dextrose_grams_per_day,
        sodium_meq_per_day: weight * inputs.sodium_meq_per_kg,
        potassium_meq_per_day: weight * inputs.potassium_meq_per_kg,
        calcium_gluconate_ml_per_day: weight * inputs.calcium_gluconate_ml_per_kg,
        calories,
    }
}

fn calorie_breakdown(
    weight_kg: f64,
    dextrose_grams: f64,
    amino_acid_grams: f64,
    lipid_volume_ml: f64,
) -> CalorieBreakdown {
    let dextrose_kcal = dextrose_grams * KCAL_PER_GRAM_DEXTROSE;
    let amino_acid_kcal = amino_acid_grams * KCAL_PER_GRAM_AMINO_ACID;
    let lipid_kcal = lipid_volume_ml * KCAL_PER_ML_LIPID_20;
    let total_kcal = dextrose_kcal + amino_acid_kcal + lipid_kcal;

    let percent = |part: f64| {
        if total_kcal > 0.0 {
            part / total_kcal * 100.0
        } else {
            0.0
        }
    };

    CalorieBreakdown {
        dextrose_kcal,
        amino_acid_kcal,
        lipid_kcal,
        total_kcal,
        kcal_per_kg: if weight_kg > 0.0 {
            total_kcal / weight_kg
        } else {
            0.0
        },
        dextrose_percent: percent(dextrose_kcal),
        amino_acid_percent: percent(amino_acid_kcal),
        lipid_percent: percent(lipid_kcal),
    }
}
