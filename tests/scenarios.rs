//! 입력 → 용량 계획 → 조제 레시피 전체 흐름 시나리오.
use pn_toolbox::i18n::Translator;
use pn_toolbox::parenteral::{
    calculate, compute_dosing_plan, proportional_targets, solve_mix, DextroseMixInput, MixError,
    PatientInputs, FIXED_BATCH_VOLUME_ML, KCL_MEQ_PER_ML, NACL_3_MEQ_PER_ML,
};
use pn_toolbox::solution_db::SolutionSelection;
use pn_toolbox::ui_cli::format_results;

fn assert_close(label: &str, actual: f64, expected: f64, tol: f64) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tol,
        "{label} expected {expected:.6} got {actual:.6} (diff {diff:.2e}, tol {tol})"
    );
}

fn scenario_a() -> PatientInputs {
    PatientInputs {
        weight_kg: 1.5,
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

#[test]
fn scenario_a_all_solutions_two_part_blend() {
    let calc = calculate(&scenario_a(), &SolutionSelection::all()).expect("weight given");
    let plan = &calc.plan;
    assert_close("tfi", plan.total_fluid_intake_ml, 225.0, 1e-9);
    assert_close("aa", plan.amino_acid_volume_ml, 52.5, 1e-9);
    assert_close("lipid", plan.lipid_volume_ml, 22.5, 1e-9);
    assert_close("dex", plan.dextrose_electrolyte_volume_ml, 150.0, 1e-9);
    assert_close("grams", plan.dextrose_grams_per_day, 17.28, 1e-9);

    let recipe = calc.mix.as_ref().expect("feasible");
    let names: Vec<_> = recipe.parts.iter().map(|p| p.solution).collect();
    assert_eq!(names, vec!["D25W", "D10W"]);

    // 60/150 = 0.4 배로 축소
    assert_close("na", recipe.sodium_volume_ml, 1.5 * 3.0 * 0.4 / 0.513, 1e-9);
    assert_close("k", recipe.potassium_volume_ml, 0.6, 1e-9);
    assert_close("ca", recipe.calcium_volume_ml, 1.2, 1e-9);
    let available = 60.0 - recipe.electrolyte_volume_ml();
    assert_close("parts", recipe.dextrose_volume_ml(), available, 1e-6);
    assert_close("target g", recipe.target_grams, 6.912, 1e-9);
    assert_close("daily conc", recipe.final_concentration, 0.1152, 1e-12);
    assert_close(
        "d25w",
        recipe.parts[0].volume_ml,
        (6.912 - available * 0.10) / 0.15,
        1e-9,
    );
    assert_close(
        "24h grams",
        recipe.delivered_grams_per_day(plan.dextrose_electrolyte_volume_ml),
        17.28,
        1e-6,
    );
}

#[test]
fn scenario_b_d5w_only_is_unreachable() {
    let selection = SolutionSelection::from_names(["D5W"]);
    let calc = calculate(&scenario_a(), &selection).expect("weight given");
    let err = calc.mix.expect_err("12.6% cannot come from D5W");
    match &err {
        MixError::ConcentrationUnreachable {
            required,
            available,
            strongest,
        } => {
            assert!(*required > 0.05);
            assert_eq!(*available, 0.05);
            assert_eq!(*strongest, "D5W");
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(
        err.to_string(),
        "Required concentration (12.6%) is higher than the max available solution (5.0% - D5W)."
    );

    // 목표가 5% 이하가 되도록 GIR을 낮추면 D5W 단독이 된다
    let low_gir = PatientInputs {
        gir_mg_per_kg_min: 3.0,
        ..scenario_a()
    };
    let targets = proportional_targets(&DextroseMixInput::from_plan(
        &compute_dosing_plan(&low_gir),
        &low_gir,
    ))
    .expect("targets");
    assert!(targets.target_concentration < 0.05);
    // D5W 하나로 묽힐 수 없으므로 단일 원액 불일치
    let err = calculate(&low_gir, &selection)
        .expect("weight given")
        .mix
        .expect_err("no weaker stock");
    assert!(matches!(err, MixError::SingleSolutionMismatch { solution: "D5W", .. }));

    // 목표가 허용 오차 안에서 5%와 같으면 D5W 단독 레시피
    let matching_gir = PatientInputs {
        gir_mg_per_kg_min: 3.15,
        ..scenario_a()
    };
    let recipe = calculate(&matching_gir, &selection)
        .expect("weight given")
        .mix
        .expect("D5W alone");
    assert_eq!(recipe.parts.len(), 1);
    assert_eq!(recipe.parts[0].solution, "D5W");
    assert_close(
        "d5w volume",
        recipe.parts[0].volume_ml,
        60.0 - recipe.electrolyte_volume_ml(),
        1e-9,
    );
}

#[test]
fn scenario_c_no_room_for_dextrose() {
    let inputs = PatientInputs {
        tfi_ml_per_kg: 60.0,
        feeds_ml: 40.0,
        meds_ml: 20.0,
        ..scenario_a()
    };
    let calc = calculate(&inputs, &SolutionSelection::all()).expect("weight given");
    assert_close("pn", calc.plan.parenteral_volume_ml, 30.0, 1e-9);
    assert!(calc.plan.amino_acid_volume_ml + calc.plan.lipid_volume_ml > 30.0);
    assert_eq!(calc.plan.dextrose_electrolyte_volume_ml, 0.0);
    assert_eq!(calc.mix, Err(MixError::NoVolumeAvailable));
}

#[test]
fn scenario_d_extreme_sodium_overflows() {
    let input = DextroseMixInput {
        dextrose_electrolyte_volume_ml: 20.0,
        dextrose_grams_per_day: 5.0,
        weight_kg: 2.0,
        sodium_meq_per_kg: 10.0,
        potassium_meq_per_kg: 2.0,
        calcium_gluconate_ml_per_kg: 1.0,
    };
    let err = solve_mix(&input, &SolutionSelection::all()).unwrap_err();

    let factor = FIXED_BATCH_VOLUME_ML / 20.0;
    let na = 2.0 * 10.0 * factor / NACL_3_MEQ_PER_ML;
    let k = 2.0 * 2.0 * factor / KCL_MEQ_PER_ML;
    let ca = 2.0 * 1.0 * factor;
    match &err {
        MixError::ElectrolyteOverflow {
            total_ml,
            sodium_ml,
            potassium_ml,
            calcium_ml,
            limit_ml,
        } => {
            assert_close("na", *sodium_ml, na, 1e-9);
            assert_close("k", *potassium_ml, k, 1e-9);
            assert_close("ca", *calcium_ml, ca, 1e-9);
            assert_close("total", *total_ml, na + k + ca, 1e-9);
            assert_eq!(*limit_ml, 60.0);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(
        err.to_string(),
        format!(
            "Proportional electrolyte volume ({:.2} ml) exceeds the fixed 60ml limit.",
            na + k + ca
        )
    );
}

#[test]
fn raising_gir_never_lowers_target_and_eventually_exceeds_stock() {
    let selection = SolutionSelection::from_names(["D10W", "D5W", "Sterile Water"]);
    let mut previous = f64::NEG_INFINITY;
    let mut outcomes = Vec::new();
    for step in 1..=20 {
        let inputs = PatientInputs {
            gir_mg_per_kg_min: step as f64 * 0.5,
            ..scenario_a()
        };
        let plan = compute_dosing_plan(&inputs);
        let targets = proportional_targets(&DextroseMixInput::from_plan(&plan, &inputs))
            .expect("electrolytes fit");
        assert!(targets.target_concentration >= previous);
        previous = targets.target_concentration;

        let mix = calculate(&inputs, &selection).expect("weight given").mix;
        outcomes.push(matches!(
            mix,
            Err(MixError::ConcentrationUnreachable { .. })
        ));
    }
    assert!(!outcomes[0], "low GIR must be feasible");
    assert!(outcomes[outcomes.len() - 1], "high GIR must exceed D10W");
    // 한 번 넘어서면 계속 불가
    let first = outcomes.iter().position(|u| *u).expect("flip");
    assert!(outcomes[first..].iter().all(|u| *u));
}

#[test]
fn repeated_calculation_is_identical() {
    let inputs = scenario_a();
    let selection = SolutionSelection::all();
    let first = calculate(&inputs, &selection);
    let second = calculate(&inputs, &selection);
    assert_eq!(first, second);
    let a = first.expect("weight").mix.expect("feasible");
    let b = second.expect("weight").mix.expect("feasible");
    for (pa, pb) in a.parts.iter().zip(&b.parts) {
        assert_eq!(pa.volume_ml.to_bits(), pb.volume_ml.to_bits());
    }
}

#[test]
fn zero_weight_has_no_calculation() {
    let inputs = PatientInputs {
        weight_kg: 0.0,
        ..scenario_a()
    };
    assert!(calculate(&inputs, &SolutionSelection::all()).is_none());
}

#[test]
fn report_renders_recipe_and_electrolytes() {
    let inputs = PatientInputs {
        potassium_meq_per_kg: 0.0,
        ..scenario_a()
    };
    let calc = calculate(&inputs, &SolutionSelection::all()).expect("weight given");
    let text = format_results(&Translator::new("en"), &calc);
    assert!(text.contains("To prepare 60.00 ml of Dextrose/Electrolyte fluid, mix:"));
    assert!(text.contains("ml of D25W"));
    assert!(text.contains("ml of D10W"));
    assert!(text.contains("ml of 3% NaCl"));
    assert!(text.contains("ml of 10% Calcium Gluconate"));
    assert!(!text.contains("KCl"), "zero potassium line must be hidden");
    assert!(text.contains("final concentration of 11.5%"));
}

#[test]
fn report_shows_error_text_verbatim() {
    let inputs = PatientInputs {
        tfi_ml_per_kg: 60.0,
        feeds_ml: 40.0,
        meds_ml: 20.0,
        ..scenario_a()
    };
    let calc = calculate(&inputs, &SolutionSelection::all()).expect("weight given");
    let text = format_results(&Translator::new("en"), &calc);
    assert!(text.contains(
        "Calculation Error: No volume available for Dextrose/Electrolyte infusion."
    ));
    assert!(text.contains("Total Fluid Intake (TFI)"));
}

#[test]
fn json_output_carries_recipe_or_error_text() {
    let calc = calculate(&scenario_a(), &SolutionSelection::all());
    let v = serde_json::to_value(&calc).expect("serialize");
    assert_eq!(v["mix"]["recipe"]["parts"][0]["solution"], "D25W");
    assert_eq!(v["mix"]["recipe"]["parts"][1]["solution"], "D10W");
    assert!(v["mix"].get("error").is_none());
    let daily = v["plan"]["dextrose_electrolyte_volume_ml"].as_f64().expect("number");
    assert_close("json daily volume", daily, 150.0, 1e-9);
    assert_eq!(v["inputs"]["weight_kg"], 1.5);

    let calc = calculate(&scenario_a(), &SolutionSelection::from_names(["D5W"]));
    let v = serde_json::to_value(&calc).expect("serialize");
    assert_eq!(
        v["mix"]["error"],
        "Required concentration (12.6%) is higher than the max available solution (5.0% - D5W)."
    );
    assert!(v["mix"].get("recipe").is_none());

    let missing_weight = PatientInputs {
        weight_kg: 0.0,
        ..scenario_a()
    };
    let v = serde_json::to_value(calculate(&missing_weight, &SolutionSelection::all()))
        .expect("serialize");
    assert!(v.is_null());
}

#[test]
fn report_translates_electrolyte_stock_names() {
    let calc = calculate(&scenario_a(), &SolutionSelection::all()).expect("weight given");
    let text = format_results(&Translator::new("ko"), &calc);
    assert!(text.contains("3% 염화나트륨(NaCl)"));
    assert!(text.contains("염화칼륨(KCl, 2 mEq/ml)"));
    assert!(text.contains("10% 글루콘산칼슘"));
    assert!(!text.contains("Calcium Gluconate"));
    assert!(text.contains("D25W"));
}
