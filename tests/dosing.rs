//! 용량 계산(수액/영양/열량) 회귀 테스트.
use approx::assert_abs_diff_eq;
use pn_toolbox::parenteral::{compute_dosing_plan, parse_or_zero, DosingPlan, PatientInputs};

fn preterm_inputs() -> PatientInputs {
    PatientInputs {
        weight_kg: 1.5,
        ..PatientInputs::clinical_defaults()
    }
}

#[test]
fn fluid_and_macronutrient_volumes() {
    let plan = compute_dosing_plan(&preterm_inputs());
    assert_abs_diff_eq!(plan.total_fluid_intake_ml, 225.0, epsilon = 1e-9);
    assert_abs_diff_eq!(plan.parenteral_volume_ml, 225.0, epsilon = 1e-9);
    assert_abs_diff_eq!(plan.amino_acid_grams, 5.25, epsilon = 1e-9);
    assert_abs_diff_eq!(plan.amino_acid_volume_ml, 52.5, epsilon = 1e-9);
    assert_abs_diff_eq!(plan.amino_acid_rate_ml_per_h, 52.5 / 24.0, epsilon = 1e-9);
    assert_abs_diff_eq!(plan.lipid_volume_ml, 22.5, epsilon = 1e-9);
    assert_abs_diff_eq!(plan.lipid_rate_ml_per_h, 22.5 / 24.0, epsilon = 1e-9);
    assert_abs_diff_eq!(plan.dextrose_electrolyte_volume_ml, 150.0, epsilon = 1e-9);
    assert_abs_diff_eq!(plan.dextrose_electrolyte_rate_ml_per_h, 6.25, epsilon = 1e-9);
    assert_abs_diff_eq!(plan.dextrose_grams_per_day, 17.28, epsilon = 1e-9);
    assert_abs_diff_eq!(plan.daily_dextrose_concentration(), 0.1152, epsilon = 1e-12);
}

#[test]
fn daily_electrolyte_totals() {
    let plan = compute_dosing_plan(&preterm_inputs());
    assert_abs_diff_eq!(plan.sodium_meq_per_day, 4.5, epsilon = 1e-9);
    assert_abs_diff_eq!(plan.potassium_meq_per_day, 3.0, epsilon = 1e-9);
    assert_abs_diff_eq!(plan.calcium_gluconate_ml_per_day, 3.0, epsilon = 1e-9);
}

#[test]
fn calories_use_lipid_volume_not_grams() {
    let plan = compute_dosing_plan(&preterm_inputs());
    let kcal = plan.calories;
    assert_abs_diff_eq!(kcal.dextrose_kcal, 17.28 * 3.4, epsilon = 1e-9);
    assert_abs_diff_eq!(kcal.amino_acid_kcal, 5.25 * 4.0, epsilon = 1e-9);
    // 22.5 ml * 2 kcal/ml (4.5 g * 9 kcal/g 이 아님)
    assert_abs_diff_eq!(kcal.lipid_kcal, 45.0, epsilon = 1e-9);
    let total = 17.28 * 3.4 + 21.0 + 45.0;
    assert_abs_diff_eq!(kcal.total_kcal, total, epsilon = 1e-9);
    assert_abs_diff_eq!(kcal.kcal_per_kg, total / 1.5, epsilon = 1e-9);
    assert_abs_diff_eq!(
        kcal.dextrose_percent + kcal.amino_acid_percent + kcal.lipid_percent,
        100.0,
        epsilon = 1e-9
    );
}

#[test]
fn zero_weight_yields_all_zero_plan() {
    let inputs = PatientInputs {
        weight_kg: 0.0,
        feeds_ml: 40.0,
        meds_ml: 20.0,
        ..PatientInputs::clinical_defaults()
    };
    assert_eq!(compute_dosing_plan(&inputs), DosingPlan::default());
}

#[test]
fn zero_calories_give_zero_percentages() {
    let inputs = PatientInputs {
        weight_kg: 2.0,
        tfi_ml_per_kg: 100.0,
        ..PatientInputs::default()
    };
    let plan = compute_dosing_plan(&inputs);
    assert_eq!(plan.calories.total_kcal, 0.0);
    assert_eq!(plan.calories.dextrose_percent, 0.0);
    assert_eq!(plan.calories.amino_acid_percent, 0.0);
    assert_eq!(plan.calories.lipid_percent, 0.0);
    assert_abs_diff_eq!(plan.dextrose_electrolyte_volume_ml, 200.0, epsilon = 1e-9);
}

#[test]
fn parenteral_volume_may_go_negative_but_dextrose_volume_floors() {
    let inputs = PatientInputs {
        weight_kg: 1.0,
        tfi_ml_per_kg: 100.0,
        feeds_ml: 120.0,
        ..PatientInputs::clinical_defaults()
    };
    let plan = compute_dosing_plan(&inputs);
    assert_abs_diff_eq!(plan.parenteral_volume_ml, -20.0, epsilon = 1e-9);
    assert_eq!(plan.dextrose_electrolyte_volume_ml, 0.0);
    assert_eq!(plan.daily_dextrose_concentration(), 0.0);
}

#[test]
fn dextrose_grams_strictly_increase_with_gir() {
    let mut previous = f64::NEG_INFINITY;
    for step in 0..=20 {
        let inputs = PatientInputs {
            gir_mg_per_kg_min: step as f64 * 0.5,
            ..preterm_inputs()
        };
        let grams = compute_dosing_plan(&inputs).dextrose_grams_per_day;
        assert!(grams > previous, "gir step {step}: {grams} <= {previous}");
        previous = grams;
    }
}

#[test]
fn lenient_parsing_treats_garbage_as_zero() {
    assert_eq!(parse_or_zero("1.5"), 1.5);
    assert_eq!(parse_or_zero("  8 \n"), 8.0);
    assert_eq!(parse_or_zero(""), 0.0);
    assert_eq!(parse_or_zero("abc"), 0.0);
    assert_eq!(parse_or_zero("-3"), 0.0);
    assert_eq!(parse_or_zero("NaN"), 0.0);
    assert_eq!(parse_or_zero("inf"), 0.0);
}
