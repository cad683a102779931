//! End-to-end forecasting scenarios.

use chrono::{Duration, NaiveDate};
use demand_forecast::core::{ModelKind, RawSalesRecord};
use demand_forecast::models::ForecastMethod;
use demand_forecast::{evaluate, generate_forecast, DemandForecaster, ForecastConfig};

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn daily_records(values: &[f64]) -> Vec<RawSalesRecord> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| RawSalesRecord::on_date(start() + Duration::days(i as i64), *v))
        .collect()
}

fn std_dev(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
}

/// Weekly demand with a gentle trend and deterministic jitter.
fn weekly_demand(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let weekday = [1.0, 1.1, 1.05, 1.2, 1.3, 0.7, 0.6][i % 7];
            let jitter = ((i * 37) % 11) as f64 - 5.0;
            (60.0 + 0.2 * i as f64) * weekday + jitter
        })
        .collect()
}

#[test]
fn empty_input_returns_tagged_default() {
    let result = generate_forecast(&[], 30, Some(ModelKind::Arima));

    assert_eq!(result.forecast_values.len(), 30);
    assert_eq!(result.model_type, ModelKind::Arima);
    assert_eq!(result.accuracy_score, 0.5);
    assert!(result.forecast_values.iter().all(|v| *v >= 0.0));
    assert_eq!(result.confidence_lower.as_ref().map(Vec::len), Some(30));
}

#[test]
fn empty_input_without_model_is_tagged_default() {
    let result = generate_forecast(&[], 10, None);
    assert_eq!(result.model_type, ModelKind::Default);
    assert_eq!(result.train_size, 0);
    assert_eq!(result.test_size, 0);
}

#[test]
fn pinned_forest_on_short_history_returns_tagged_default() {
    let records = daily_records(&[12.0, 15.0, 11.0, 14.0, 13.0]);
    let forecaster = DemandForecaster::new(ForecastConfig::default().with_explain(true));
    let result = forecaster.generate_forecast(&records, 14, Some(ModelKind::RandomForest));

    assert_eq!(result.model_type, ModelKind::RandomForest);
    assert_eq!(result.accuracy_score, 0.5);
    assert_eq!(result.forecast_values.len(), 14);

    let diagnostics = result.diagnostics.unwrap();
    assert_eq!(diagnostics.method, ForecastMethod::Synthetic);
    assert_eq!(diagnostics.candidates.len(), 1);
    assert!(diagnostics.candidates[0].error.is_some());
    // Five real days padded to seven.
    assert_eq!(diagnostics.etl.load.points_added, 2);
}

#[test]
fn constant_series_is_not_forecast_as_flat_line() {
    let records = daily_records(&[20.0; 30]);
    let forecaster = DemandForecaster::new(ForecastConfig::default().with_explain(true));
    let result = forecaster.generate_forecast(&records, 30, Some(ModelKind::Arima));

    assert_eq!(result.model_type, ModelKind::Arima);
    let values = &result.forecast_values;
    assert!(std_dev(values) >= 0.01, "forecast is flat: {values:?}");

    let mean = values.iter().sum::<f64>() / values.len() as f64;
    for w in values.windows(2) {
        assert!((w[1] - w[0]).abs() <= 0.01 * mean, "step too steep: {w:?}");
    }
    assert!(matches!(
        result.diagnostics.unwrap().method,
        ForecastMethod::MovingAverage { .. }
    ));
}

#[test]
fn constant_series_bands_are_ordered() {
    let result = generate_forecast(&daily_records(&[20.0; 30]), 7, Some(ModelKind::Arima));
    let lower = result.confidence_lower.unwrap();
    let upper = result.confidence_upper.unwrap();
    for (i, v) in result.forecast_values.iter().enumerate() {
        assert!(0.0 <= lower[i] && lower[i] <= *v && *v <= upper[i]);
        // A zero-variance history still gets a band.
        assert!(upper[i] > lower[i]);
    }
}

#[test]
fn mape_undefined_for_all_zero_actuals() {
    let metrics = evaluate(&[0.0, 0.0, 0.0], &[1.0, 2.0, 3.0]);
    assert!(metrics.mape.is_none());

    let json = serde_json::to_value(metrics).unwrap();
    assert!(json["mape"].is_null());
}

#[test]
fn selection_runs_every_model_on_long_history() {
    let records = daily_records(&weekly_demand(90));
    let forecaster = DemandForecaster::new(ForecastConfig::default().with_explain(true));
    let result = forecaster.generate_forecast(&records, 14, None);

    assert_eq!(result.forecast_values.len(), 14);
    assert_eq!(result.train_size, 72);
    assert_eq!(result.test_size, 18);
    assert_ne!(result.model_type, ModelKind::Default);

    let diagnostics = result.diagnostics.unwrap();
    let scored: Vec<_> = diagnostics
        .candidates
        .iter()
        .filter_map(|c| c.accuracy.map(|a| (c.model, a)))
        .collect();
    assert!(scored.iter().any(|(kind, _)| *kind == ModelKind::RandomForest));
    assert!(scored.iter().any(|(kind, _)| *kind == ModelKind::Seasonal));

    // The winner is the best scorer unless ARIMA is within 5% of it.
    let best = scored.iter().map(|(_, a)| *a).fold(0.0, f64::max);
    let arima = scored
        .iter()
        .find(|(kind, _)| *kind == ModelKind::Arima)
        .map(|(_, a)| *a);
    match arima {
        Some(a) if a >= best * 0.95 => assert_eq!(result.model_type, ModelKind::Arima),
        _ => assert!((result.accuracy_score - best).abs() < 1e-12),
    }
}

#[test]
fn seasonal_forecast_has_no_bands() {
    let result = generate_forecast(&daily_records(&weekly_demand(28)), 7, Some(ModelKind::Seasonal));
    assert_eq!(result.model_type, ModelKind::Seasonal);
    assert!(result.confidence_lower.is_none());
    assert!(result.confidence_upper.is_none());
}

#[test]
fn pinned_forest_on_long_history_is_real() {
    let result = generate_forecast(
        &daily_records(&weekly_demand(80)),
        10,
        Some(ModelKind::RandomForest),
    );
    assert_eq!(result.model_type, ModelKind::RandomForest);
    assert_eq!(result.test_size, 16);
    assert!(result.accuracy_score > 0.5);
    assert!(result.confidence_lower.is_none());
}

#[test]
fn multiple_sales_per_day_are_summed() {
    let mut records = Vec::new();
    for day in 0..20 {
        let date = start() + Duration::days(day);
        for hour in [9, 13, 17] {
            records.push(RawSalesRecord::new(date.and_hms_opt(hour, 0, 0).unwrap(), 5.0));
        }
    }
    let forecaster = DemandForecaster::new(ForecastConfig::default().with_explain(true));
    let result = forecaster.generate_forecast(&records, 5, Some(ModelKind::Seasonal));

    let diagnostics = result.diagnostics.unwrap();
    assert_eq!(diagnostics.etl.extract.record_count, 60);
    assert_eq!(diagnostics.etl.transform.points, 20);
    assert_eq!(diagnostics.avg_daily_demand, Some(15.0));
    assert_eq!(result.forecast_values, vec![15.0; 5]);
}

#[test]
fn records_deserialize_from_service_json() {
    let raw = r#"[
        {"transaction_date": "2024-01-01T08:15:00", "quantity_sold": 25.0},
        {"transaction_date": "2024-01-02", "quantity_sold": 30.5},
        {"transaction_timestamp": "2024-01-03 10:00:00", "quantity_sold": 18}
    ]"#;
    let records: Vec<RawSalesRecord> = serde_json::from_str(raw).unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[1].date(), start() + Duration::days(1));

    let result = generate_forecast(&records, 3, Some(ModelKind::Seasonal));
    let json: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();
    assert_eq!(json["model_type"], "SEASONAL");
    assert_eq!(json["forecast_values"].as_array().unwrap().len(), 3);
    assert!(json["metrics"]["accuracy"].is_number());
}
