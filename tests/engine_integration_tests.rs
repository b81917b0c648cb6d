// Engine Integration Tests
//
// Purpose: Exercise evaluation, zoning and the result cache through the
// public crate API, the way request handlers use them.
// Run with: cargo test --test engine_integration_tests

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use approx::assert_relative_eq;
use crop_suitability::{
    evaluate, CachedResult, CropRequirements, EngineConfig, EngineContext, ErrorKind, Factor, ResultCache,
    SubScores, SuitabilityLevel, SystemStatus, UnitInput, UnitMeasurements, ZoningEngine,
};
use crop_suitability::suitability::ValueRange;
use crop_suitability::zoning::CropWeightTable;

/// The province's 18 prefecture-level and county units
const UNITS: [&str; 18] = [
    "Changsha", "Zhuzhou", "Xiangtan", "Hengyang", "Shaoyang", "Yueyang",
    "Changde", "Zhangjiajie", "Yiyang", "Chenzhou", "Yongzhou", "Huaihua",
    "Loudi", "Xiangxi", "Changsha County", "Liuyang", "Ningxiang", "Wangcheng",
];

fn measured_units() -> Vec<UnitInput> {
    UNITS
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let i = i as f64;
            UnitInput::new(*name, SubScores::new(55.0 + i * 2.0, 95.0 - i * 3.0, 40.0 + i * 2.5))
        })
        .collect()
}

// =========================================================================
// Section 1: Single-point evaluation
// =========================================================================

#[test]
fn test_five_factor_evaluation() {
    let factors = vec![
        Factor::new("temperature", 0.3, 15.0, 35.0, 22.5),
        Factor::new("winterTemp", 0.1, 0.0, 10.0, -1.2),
        Factor::new("precipitation", 0.25, 1000.0, 1800.0, 1200.0),
        Factor::new("ph", 0.2, 5.5, 7.0, 6.8),
        Factor::new("organic", 0.15, 2.0, 5.0, 3.2),
    ];

    let result = evaluate(&factors).unwrap();

    // winterTemp: 1.2 below min → 80 - 12 = 68, the only score under 70
    let winter = &result.factor_scores[1];
    assert_eq!(winter.factor_name, "winterTemp");
    assert_relative_eq!(winter.score, 68.0, epsilon = 1e-9);

    assert_eq!(result.recommendations.len(), 1);
    assert!(result.recommendations[0].contains("cold"));
    assert!(result.overall_score > 80.0);
    assert_eq!(result.suitability_level, SuitabilityLevel::MostSuitable);
}

#[test]
fn test_evaluation_serializes_with_camel_case_fields() {
    let result = evaluate(&[Factor::new("temperature", 1.0, 15.0, 35.0, 22.5)]).unwrap();
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["overallScore"], 95.0);
    assert_eq!(json["suitabilityLevel"], "MostSuitable");
    assert_eq!(json["factorScores"][0]["factorName"], "temperature");
    assert!(json["recommendations"].is_array());
}

#[test]
fn test_factor_deserializes_from_camel_case() {
    let factor: Factor = serde_json::from_str(
        r#"{"name": "ph", "weight": 0.2, "min": 5.5, "max": 7.0, "currentValue": 6.8}"#,
    )
    .unwrap();
    assert_eq!(factor.current_value, 6.8);
}

// =========================================================================
// Section 2: Zoning
// =========================================================================

#[test]
fn test_province_zoning_statistics() {
    let engine = ZoningEngine::new(CropWeightTable::builtin(), 211_800.0).unwrap();
    let result = engine.generate_zoning("rice", "county", &measured_units()).unwrap();

    assert_eq!(result.spatial_data.len(), UNITS.len());
    assert_eq!(result.statistics.total_count(), UNITS.len());
    assert!((result.statistics.total_percentage() - 100.0).abs() <= 0.5);
    // Rounded areas add back up to the province within one km² per level
    assert!((result.statistics.total_area() - 211_800.0).abs() <= 4.0);

    for unit in &result.spatial_data {
        assert!(result.zones[&unit.level].contains(&unit.name));
    }
}

#[test]
fn test_zoning_serializes_all_levels() {
    let engine = ZoningEngine::new(CropWeightTable::builtin(), 211_800.0).unwrap();
    let units = vec![UnitInput::new("Changsha", SubScores::new(60.0, 50.0, 55.0))];
    let result = engine.generate_zoning("rice", "county", &units).unwrap();
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["cropType"], "rice");
    assert_eq!(json["spatialData"][0]["level"], "MarginallySuitable");
    for level in ["MostSuitable", "Suitable", "MarginallySuitable", "Unsuitable"] {
        assert!(json["statistics"][level]["count"].is_number(), "missing {}", level);
        assert!(json["zones"][level].is_array(), "missing {}", level);
    }
}

#[test]
fn test_different_crops_weight_differently() {
    let engine = ZoningEngine::new(CropWeightTable::builtin(), 211_800.0).unwrap();
    let units = vec![UnitInput::new("Chenzhou", SubScores::new(100.0, 0.0, 0.0))];

    let citrus = engine.generate_zoning("citrus", "county", &units).unwrap();
    let soybean = engine.generate_zoning("soybean", "county", &units).unwrap();

    assert_relative_eq!(citrus.spatial_data[0].score, 45.0, epsilon = 1e-9);
    assert_relative_eq!(soybean.spatial_data[0].score, 20.0, epsilon = 1e-9);
}

// =========================================================================
// Section 3: Engine context and cache
// =========================================================================

#[test]
fn test_context_end_to_end() {
    let context = EngineContext::initialized(EngineConfig::default()).unwrap();
    assert_eq!(context.status().status, SystemStatus::Ready);

    let zoning = context.generate_zoning("tea", Some("city"), &measured_units()).unwrap();
    assert_eq!(zoning.precision, "city");

    let factors = vec![Factor::new("temperature", 1.0, 15.0, 35.0, 22.5)];
    let evaluation = context.evaluate(&factors).unwrap();
    assert_relative_eq!(evaluation.overall_score, 95.0, epsilon = 1e-9);

    // status + zoning + evaluation
    assert_eq!(context.cache().len(), 3);

    let run = context.begin_analysis_run().unwrap();
    assert_eq!(run.cleared_entries, 3);
    assert!(context.cache().is_empty());
}

#[test]
fn test_context_measured_zoning() {
    let context = EngineContext::initialized(EngineConfig::default()).unwrap();
    let requirements = CropRequirements {
        temperature: ValueRange::new(15.0, 35.0),
        precipitation: ValueRange::new(1000.0, 2000.0),
        ph: ValueRange::new(5.5, 7.5),
        organic_matter: ValueRange::new(2.0, 5.0),
    };
    let measurements = vec![UnitMeasurements {
        name: "Xiangtan".to_string(),
        mean_temperature: 25.0,
        annual_precipitation: 1500.0,
        soil_ph: 6.5,
        organic_matter: 3.5,
    }];

    let result = context
        .generate_zoning_from_measurements("rice", None, &requirements, &measurements)
        .unwrap();
    assert_relative_eq!(result.spatial_data[0].score, 100.0, epsilon = 1e-9);
    assert_eq!(result.spatial_data[0].level, SuitabilityLevel::MostSuitable);
}

#[test]
fn test_context_configuration_error_is_typed() {
    let context = EngineContext::initialized(EngineConfig::default()).unwrap();
    let err = context
        .evaluate(&[Factor::new("ph", 1.0, 7.0, 7.0, 6.5)])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(err.public_message(), "Invalid configuration");
}

#[test]
fn test_cache_zero_ttl_is_always_a_miss() {
    let cache: ResultCache<u32> = ResultCache::new();
    cache.store("k", 1, Duration::ZERO);
    assert!(cache.lookup("k").is_none());
    assert!(cache.is_empty());
}

#[test]
fn test_cache_expires_after_ttl() {
    let cache: ResultCache<u32> = ResultCache::new();
    cache.store("k", 1, Duration::from_millis(20));
    assert_eq!(cache.lookup("k").as_deref(), Some(&1));
    thread::sleep(Duration::from_millis(40));
    assert!(cache.lookup("k").is_none());
}

#[test]
fn test_shared_context_across_threads() {
    let context = EngineContext::initialized(EngineConfig::default()).unwrap();
    let units = Arc::new(measured_units());

    let handles: Vec<_> = ["rice", "corn", "wheat", "rice"]
        .into_iter()
        .map(|crop| {
            let context = Arc::clone(&context);
            let units = Arc::clone(&units);
            thread::spawn(move || context.generate_zoning(crop, None, &units).unwrap())
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results[0], results[3]);

    // The rice entry is served from cache from now on
    let cached = context.generate_zoning("rice", None, &units).unwrap();
    assert_eq!(cached, results[0]);

    let hits = ["rice", "corn", "wheat"]
        .iter()
        .filter(|crop| {
            let key = crop_suitability::cache_key(
                "zoning_generate",
                Some(&serde_json::json!({"cropType": crop, "precision": "county", "units": &*units})),
            )
            .unwrap();
            matches!(context.cache().lookup(&key).as_deref(), Some(CachedResult::Zoning(_)))
        })
        .count();
    assert_eq!(hits, 3);
}
