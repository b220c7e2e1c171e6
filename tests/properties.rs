use chrono::{DateTime, Duration, Utc};
use cvv_rs::prelude::*;
use proptest::prelude::*;

fn pattern() -> impl Strategy<Value = Pattern> {
    prop_oneof![
        Just(Pattern::Sine),
        Just(Pattern::Cosine),
        Just(Pattern::Combined),
        Just(Pattern::Realistic),
        Just(Pattern::Flat),
    ]
}

fn parameters() -> impl Strategy<Value = SimulationParameters> {
    (
        1usize..200,
        1.0f64..100_000.0,
        0.0f64..20_000.0,
        0.0f64..10.0,
        -500.0f64..500.0,
        0.0f64..10_000.0,
        pattern(),
    )
        .prop_map(|(days, base, amplitude, frequency, drift, noise, pattern)| {
            SimulationParameters::builder()
                .horizon_days(days)
                .base_price(base)
                .amplitude(amplitude)
                .frequency(frequency)
                .drift(drift)
                .noise(noise)
                .pattern(pattern)
                .build()
                .unwrap()
        })
}

fn now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_760_000_000, 0).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prices_are_daily_and_floored(params in parameters(), seed in any::<u64>()) {
        let points = Simulation::from_seed(seed).simulate_at(&params, now()).unwrap();

        prop_assert_eq!(points.len(), params.horizon_days());
        prop_assert_eq!(points[0].timestamp(), now() - Duration::days(params.horizon_days() as i64));
        for pair in points.windows(2) {
            prop_assert_eq!(pair[1].timestamp() - pair[0].timestamp(), Duration::days(1));
        }
        prop_assert!(points.iter().all(|p| p.close() >= MIN_PRICE && p.close().is_finite()));
    }

    #[test]
    fn candles_bracket_their_close(params in parameters(), seed in any::<u64>()) {
        let report = Simulation::from_seed(seed).run_at(&params, now()).unwrap();

        prop_assert_eq!(report.table().len(), report.points().len());
        for (candle, point) in report.table().iter().zip(report.points()) {
            prop_assert_eq!(candle.close(), point.close());
            prop_assert_eq!(candle.timestamp(), point.timestamp());
            prop_assert!(candle.low() <= candle.open().min(candle.close()));
            prop_assert!(candle.high() >= candle.open().max(candle.close()));
            prop_assert!((MIN_VOLUME..MAX_VOLUME).contains(&candle.volume()));
        }
    }

    #[test]
    fn summary_is_consistent(params in parameters(), seed in any::<u64>()) {
        let report = Simulation::from_seed(seed).run_at(&params, now()).unwrap();
        let summary = report.summary();

        prop_assert_eq!(summary.rows(), params.horizon_days());
        prop_assert_eq!(summary.daily_returns_pct().len(), params.horizon_days() - 1);
        prop_assert!(summary.min_close() <= summary.mean_close() + 1e-6);
        prop_assert!(summary.mean_close() <= summary.max_close() + 1e-6);
        prop_assert!(summary.std_dev_close() >= 0.0);
        prop_assert_eq!(summary.volatility_level(), VolatilityLevel::from_std_dev(summary.std_dev_close()));

        let histogram = Histogram::try_from(report.table()).unwrap();
        prop_assert_eq!(histogram.counts().iter().sum::<usize>(), params.horizon_days());
    }

    #[test]
    fn csv_preserves_table(params in parameters(), seed in any::<u64>()) {
        let report = Simulation::from_seed(seed).run_at(&params, now()).unwrap();
        let text = to_csv_string(report.table()).unwrap();
        let parsed = read_csv(text.as_bytes()).unwrap();

        prop_assert_eq!(parsed.closes(), report.table().closes());
        prop_assert_eq!(parsed.date_range(), report.table().date_range());
    }
}
