//! 정맥영양(PN) 계산 모듈 모음.
//! 용량 계산(dosing)이 먼저 돌고, 그 결과로 포도당/전해질 혼합(dextrose_mix)을 푼다.

pub mod dextrose_mix;
pub mod dosing;
pub mod patient;

pub use dextrose_mix::*;
pub use dosing::*;
pub use patient::*;

use serde::Serialize;

use crate::solution_db::SolutionSelection;

/// 한 번의 입력 스냅샷에 대한 전체 계산 결과.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PnCalculation {
    pub inputs: PatientInputs,
    pub plan: DosingPlan,
    /// 혼합 계산 실패는 계획 표시를 막지 않는다.
    #[serde(serialize_with = "serialize_mix")]
    pub mix: Result<MixRecipe, MixError>,
}

/// 입력이 바뀔 때마다 통째로 다시 계산한다. 체중이 없으면 `None`.
pub fn calculate(inputs: &PatientInputs, selection: &SolutionSelection) -> Option<PnCalculation> {
    if !inputs.has_weight() {
        return None;
    }
    let plan = compute_dosing_plan(inputs);
    let mix = solve_mix(&DextroseMixInput::from_plan(&plan, inputs), selection);
    Some(PnCalculation {
        inputs: *inputs,
        plan,
        mix,
    })
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
enum MixOutcome<'a> {
    Recipe(&'a MixRecipe),
    Error(String),
}

fn serialize_mix<S>(mix: &Result<MixRecipe, MixError>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let outcome = match mix {
        Ok(recipe) => MixOutcome::Recipe(recipe),
        Err(e) => MixOutcome::Error(e.to_string()),
    };
    outcome.serialize(serializer)
}
