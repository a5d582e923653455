//! 포도당/전해질 혼합 조제 계산.
//!
//! 하루 포도당+전해질 수액과 같은 비율을 60 ml 주사기 한 개에 담도록,
//! 전해질 부피를 비례 축소해 빼고 남은 부피를 두 원액(또는 한 원액)의 혼합으로 채운다.
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::dosing::DosingPlan;
use super::patient::PatientInputs;
use crate::solution_db::{enabled_solutions, DextroseSolution, SolutionSelection};

/// 조제 배치(주사기) 부피 [ml]
pub const FIXED_BATCH_VOLUME_ML: f64 = 60.0;
/// 3% NaCl [mEq/ml]
pub const NACL_3_MEQ_PER_ML: f64 = 0.513;
/// KCl 원액 [mEq/ml]
pub const KCL_MEQ_PER_ML: f64 = 2.0;
/// 이보다 작은 부피는 0으로 본다 [ml]
pub const VOLUME_TOLERANCE_ML: f64 = 0.001;
/// 단일 원액이 목표 농도와 일치한다고 보는 허용 오차(분율)
pub const CONCENTRATION_TOLERANCE: f64 = 0.001;

/// 조제 계산 실패 사유. 메시지는 그대로 사용자에게 표시한다.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MixError {
    #[error("No volume available for Dextrose/Electrolyte infusion.")]
    NoVolumeAvailable,

    #[error("Proportional electrolyte volume ({total_ml:.2} ml) exceeds the fixed {limit_ml:.0}ml limit.")]
    ElectrolyteOverflow {
        total_ml: f64,
        sodium_ml: f64,
        potassium_ml: f64,
        calcium_ml: f64,
        limit_ml: f64,
    },

    #[error("Please select at least one dextrose solution.")]
    NoSolutionSelected,

    #[error(
        "Required concentration ({:.1}%) is higher than the max available solution ({:.1}% - {strongest}).",
        .required * 100.0,
        .available * 100.0
    )]
    ConcentrationUnreachable {
        required: f64,
        available: f64,
        strongest: &'static str,
    },

    #[error("Cannot achieve target GIR with only {solution}. Please select another solution to mix with.")]
    SingleSolutionMismatch {
        solution: &'static str,
        required: f64,
    },

    #[error("Could not compute a valid mixture with {high} and {low}. Try selecting a different pair of solutions.")]
    InfeasiblePair {
        high: &'static str,
        low: &'static str,
        volume_high_ml: f64,
        volume_low_ml: f64,
    },
}

/// 혼합 계산 입력값. 하루 단위 값과 kg 당 전해질 용량을 받는다.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DextroseMixInput {
    /// 하루 포도당+전해질 수액량 [ml/day]
    pub dextrose_electrolyte_volume_ml: f64,
    /// 하루 포도당 목표량 [g/day]
    pub dextrose_grams_per_day: f64,
    pub weight_kg: f64,
    pub sodium_meq_per_kg: f64,
    pub potassium_meq_per_kg: f64,
    pub calcium_gluconate_ml_per_kg: f64,
}

impl DextroseMixInput {
    pub fn from_plan(plan: &DosingPlan, inputs: &PatientInputs) -> Self {
        Self {
            dextrose_electrolyte_volume_ml: plan.dextrose_electrolyte_volume_ml,
            dextrose_grams_per_day: plan.dextrose_grams_per_day,
            weight_kg: inputs.weight_kg,
            sodium_meq_per_kg: inputs.sodium_meq_per_kg,
            potassium_meq_per_kg: inputs.potassium_meq_per_kg,
            calcium_gluconate_ml_per_kg: inputs.calcium_gluconate_ml_per_kg,
        }
    }
}

/// 60 ml 배치로 축소한 전해질 부피와 포도당 목표치.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MixTargets {
    /// 배치 부피 / 하루 수액량
    pub correction_factor: f64,
    pub sodium_volume_ml: f64,
    pub potassium_volume_ml: f64,
    pub calcium_volume_ml: f64,
    /// 전해질을 뺀 포도당 원액용 부피 [ml]
    pub available_volume_ml: f64,
    /// 하루 수액 기준 포도당 농도 [g/ml]
    pub daily_concentration: f64,
    /// 배치 안에 들어가야 할 포도당 [g]
    pub target_grams: f64,
    /// 원액 혼합물이 가져야 할 농도 [g/ml]
    pub target_concentration: f64,
}

impl MixTargets {
    pub fn electrolyte_volume_ml(&self) -> f64 {
        self.sodium_volume_ml + self.potassium_volume_ml + self.calcium_volume_ml
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MixPart {
    pub solution: &'static str,
    pub grams_per_ml: f64,
    pub volume_ml: f64,
}

/// 조제 레시피.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MixRecipe {
    /// 1개 또는 2개, 각 부피 > 0.001 ml
    pub parts: Vec<MixPart>,
    pub sodium_volume_ml: f64,
    pub potassium_volume_ml: f64,
    pub calcium_volume_ml: f64,
    pub final_volume_ml: f64,
    pub target_grams: f64,
    pub target_concentration: f64,
    /// 하루 수액 기준 포도당 농도 [g/ml]
    pub final_concentration: f64,
}

impl MixRecipe {
    pub fn dextrose_volume_ml(&self) -> f64 {
        self.parts.iter().map(|p| p.volume_ml).sum()
    }

    pub fn electrolyte_volume_ml(&self) -> f64 {
        self.sodium_volume_ml + self.potassium_volume_ml + self.calcium_volume_ml
    }

    pub fn total_volume_ml(&self) -> f64 {
        self.dextrose_volume_ml() + self.electrolyte_volume_ml()
    }

    /// 레시피가 실제로 담는 포도당 [g]
    pub fn dextrose_grams(&self) -> f64 {
        self.parts.iter().map(|p| p.volume_ml * p.grams_per_ml).sum()
    }

    /// 배치를 하루 수액량으로 환산했을 때 전달되는 포도당 [g/day]
    pub fn delivered_grams_per_day(&self, daily_volume_ml: f64) -> f64 {
        if self.final_volume_ml > 0.0 {
            self.dextrose_grams() * daily_volume_ml / self.final_volume_ml
        } else {
            0.0
        }
    }
}

/// 전해질 부피를 배치 크기로 비례 축소하고 포도당 목표 농도를 계산한다.
pub fn proportional_targets(input: &DextroseMixInput) -> Result<MixTargets, MixError> {
    let daily_volume = input.dextrose_electrolyte_volume_ml;
    if daily_volume <= 0.0 {
        return Err(MixError::NoVolumeAvailable);
    }

    let correction_factor = FIXED_BATCH_VOLUME_ML / daily_volume;
    let weight = input.weight_kg;
    let sodium_volume_ml = weight * input.sodium_meq_per_kg * correction_factor / NACL_3_MEQ_PER_ML;
    let potassium_volume_ml =
        weight * input.potassium_meq_per_kg * correction_factor / KCL_MEQ_PER_ML;
    // 글루콘산칼슘은 이미 ml 단위 용량이다
    let calcium_volume_ml = weight * input.calcium_gluconate_ml_per_kg * correction_factor;

    let electrolytes = sodium_volume_ml + potassium_volume_ml + calcium_volume_ml;
    if electrolytes >= FIXED_BATCH_VOLUME_ML {
        warn!(electrolytes, "proportional electrolyte volume overflows the batch");
        return Err(MixError::ElectrolyteOverflow {
            total_ml: electrolytes,
            sodium_ml: sodium_volume_ml,
            potassium_ml: potassium_volume_ml,
            calcium_ml: calcium_volume_ml,
            limit_ml: FIXED_BATCH_VOLUME_ML,
        });
    }

    let available_volume_ml = FIXED_BATCH_VOLUME_ML - electrolytes;
    let daily_concentration = input.dextrose_grams_per_day / daily_volume;
    let target_grams = daily_concentration * FIXED_BATCH_VOLUME_ML;
    let target_concentration = if available_volume_ml > 0.0 {
        target_grams / available_volume_ml
    } else {
        0.0
    };

    Ok(MixTargets {
        correction_factor,
        sodium_volume_ml,
        potassium_volume_ml,
        calcium_volume_ml,
        available_volume_ml,
        daily_concentration,
        target_grams,
        target_concentration,
    })
}

/// 목표 농도를 감싸는 원액 쌍 (상한, 하한).
///
/// `candidates`는 농도 내림차순이어야 한다. 상한은 목표 이상인 것 중 가장 묽은 것,
/// 하한은 목표 이하인 것 중 가장 진한 것이다. 없으면 각각 가장 진한/묽은 원액.
pub fn bracket_solutions(
    candidates: &[&'static DextroseSolution],
    target: f64,
) -> Option<(&'static DextroseSolution, &'static DextroseSolution)> {
    let strongest = *candidates.first()?;
    let weakest = *candidates.last()?;

    let high = candidates
        .iter()
        .rev()
        .find(|s| s.concentration >= target)
        .copied()
        .unwrap_or(strongest);
    let low = candidates
        .iter()
        .find(|s| s.concentration <= target)
        .copied()
        .unwrap_or(weakest);
    Some((high, low))
}

/// 선택된 원액으로 60 ml 배치 레시피를 계산한다.
pub fn solve_mix(
    input: &DextroseMixInput,
    selection: &SolutionSelection,
) -> Result<MixRecipe, MixError> {
    let targets = proportional_targets(input)?;
    let target = targets.target_concentration;

    let candidates = enabled_solutions(selection);
    let (high, low) = match bracket_solutions(&candidates, target) {
        Some(pair) => pair,
        None => return Err(MixError::NoSolutionSelected),
    };
    let strongest = candidates[0];
    if target > strongest.concentration {
        return Err(MixError::ConcentrationUnreachable {
            required: target,
            available: strongest.concentration,
            strongest: strongest.name,
        });
    }
    debug!(
        target_concentration = target,
        high = high.name,
        low = low.name,
        "bracketing solutions selected"
    );

    let available = targets.available_volume_ml;
    let parts = if high.concentration == low.concentration {
        if (high.concentration - target).abs() > CONCENTRATION_TOLERANCE {
            return Err(MixError::SingleSolutionMismatch {
                solution: high.name,
                required: target,
            });
        }
        vec![MixPart {
            solution: high.name,
            grams_per_ml: high.grams_per_ml,
            volume_ml: available,
        }]
    } else {
        blend_pair(high, low, available, targets.target_grams)?
    };

    Ok(MixRecipe {
        parts,
        sodium_volume_ml: targets.sodium_volume_ml,
        potassium_volume_ml: targets.potassium_volume_ml,
        calcium_volume_ml: targets.calcium_volume_ml,
        final_volume_ml: FIXED_BATCH_VOLUME_ML,
        target_grams: targets.target_grams,
        target_concentration: target,
        final_concentration: targets.daily_concentration,
    })
}

/// 두 원액의 질량수지를 푼다.
///
/// v_h + v_l = V, v_h*C_h + v_l*C_l = G
pub fn blend_pair(
    high: &'static DextroseSolution,
    low: &'static DextroseSolution,
    available_ml: f64,
    target_grams: f64,
) -> Result<Vec<MixPart>, MixError> {
    let c_h = high.grams_per_ml;
    let c_l = low.grams_per_ml;
    let volume_high = (target_grams - available_ml * c_l) / (c_h - c_l);
    let volume_low = available_ml - volume_high;
    debug!(volume_high, volume_low, "two-component blend");

    if volume_high < -VOLUME_TOLERANCE_ML || volume_low < -VOLUME_TOLERANCE_ML {
        warn!(
            high = high.name,
            low = low.name,
            volume_high,
            volume_low,
            "blend pair cannot reach the target"
        );
        return Err(MixError::InfeasiblePair {
            high: high.name,
            low: low.name,
            volume_high_ml: volume_high,
            volume_low_ml: volume_low,
        });
    }

    Ok([(high, volume_high), (low, volume_low)]
        .into_iter()
        .map(|(s, v)| MixPart {
            solution: s.name,
            grams_per_ml: s.grams_per_ml,
            volume_ml: v.max(0.0),
        })
        .filter(|p| p.volume_ml > VOLUME_TOLERANCE_ML)
        .collect())
}
