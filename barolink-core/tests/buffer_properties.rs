//! Property tests for the fixed-capacity buffers and the classifier

use std::collections::VecDeque;

use barolink_core::{classify, DerivedReading, ForecastCode, OfflineQueue, RingHistory};
use proptest::prelude::*;

fn tagged(tag: u16) -> DerivedReading {
    DerivedReading {
        temperature: tag as f32,
        secondary_temperature: 0.0,
        humidity: 50.0,
        pressure: 1013.0,
        forecast: ForecastCode::Steady,
        absolute_humidity: 0.0,
        dew_point: 0.0,
    }
}

#[derive(Debug, Clone)]
enum QueueOp {
    Push(u16),
    Pop,
}

fn queue_op() -> impl Strategy<Value = QueueOp> {
    prop_oneof![
        3 => any::<u16>().prop_map(QueueOp::Push),
        1 => Just(QueueOp::Pop),
    ]
}

proptest! {
    #[test]
    fn queue_matches_bounded_fifo_model(ops in prop::collection::vec(queue_op(), 0..200)) {
        const CAP: usize = 8;
        let mut queue = OfflineQueue::<CAP>::new();
        let mut model: VecDeque<u16> = VecDeque::new();

        for op in ops {
            match op {
                QueueOp::Push(tag) => {
                    let evicted = queue.push(tagged(tag));
                    let expected = if model.len() == CAP { model.pop_front() } else { None };
                    model.push_back(tag);
                    prop_assert_eq!(evicted.map(|r| r.temperature), expected.map(|t| t as f32));
                }
                QueueOp::Pop => {
                    let popped = queue.pop_oldest();
                    prop_assert_eq!(popped.map(|r| r.temperature), model.pop_front().map(|t| t as f32));
                }
            }

            prop_assert!(queue.len() <= CAP);
            prop_assert_eq!(queue.len(), model.len());
            let contents: Vec<f32> = queue.iter().map(|r| r.temperature).collect();
            let expected: Vec<f32> = model.iter().map(|&t| t as f32).collect();
            prop_assert_eq!(contents, expected);
        }
    }

    #[test]
    fn history_delta_waits_for_capacity(samples in prop::collection::vec(900.0f32..1100.0, 1..60)) {
        const H: usize = 18;
        let mut history = RingHistory::<H>::new();

        for (i, &p) in samples.iter().enumerate() {
            history.record_pressure(p);
            let recorded = i + 1;
            prop_assert_eq!(history.delta(1000.0).is_some(), recorded >= H);

            if recorded >= H {
                // Slot under the cursor is the sample H records back
                let oldest = samples[recorded - H];
                prop_assert_eq!(history.delta(1000.0), Some(1000.0 - oldest));
            }
        }
    }

    #[test]
    fn classify_is_total(pressure in any::<f32>(), delta in proptest::option::of(any::<f32>())) {
        let code = classify(pressure, delta);
        prop_assert_eq!(code == ForecastCode::Unknown, delta.is_none());
    }
}
