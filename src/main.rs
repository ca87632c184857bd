use std::collections::BTreeMap;

use msglib::{message, Result};


message! {
    #[derive(Debug, Default, Clone, PartialEq)]
    struct Reading {
        1 => sensor: String,
        2 => value: f64,
        3 => flags: Vec<i32>,
    }
}

message! {
    #[derive(Debug, Default, Clone, PartialEq)]
    struct Batch {
        1 => id: i64,
        2 => source: Option<String>,
        3 => readings: Vec<Reading>,
        4 => labels: BTreeMap<String, i16>,
    }
}

fn sample() -> Batch {
    let readings = (0..256)
        .map(|i| Reading {
            sensor: format!("sensor-{}", i % 16),
            value:  i as f64 * 0.5 - 40.0,
            flags:  (0..i % 5).collect(),
        })
        .collect();

    let mut labels = BTreeMap::new();
    labels.insert("site".to_string(), 3);
    labels.insert("rack".to_string(), -12);

    Batch { id: 1 << 40, source: Some("bench".into()), readings, labels }
}


const BENCH_DURATION: std::time::Duration = std::time::Duration::from_secs(2);
const BENCH_ITERS: usize = 10;

fn bench<F: FnMut() -> Result<()>>(name: &str, length: usize, mut f: F) -> Result<()> {
    let mut iters = 0;
    let dt;
    let t0 = std::time::Instant::now();
    loop {
        for _ in 0..BENCH_ITERS {
            f()?;
            iters += 1;
        }

        let elapsed = t0.elapsed();
        if elapsed >= BENCH_DURATION {
            dt = elapsed;
            break;
        }
    }

    let iters_per_sec = iters as f64 / dt.as_secs_f64();
    let mibs = length as f64 * iters_per_sec / (1024.0 * 1024.0);
    println!("{} {:.2}/s {:.2?} {:.2}MiB/s", name, iters_per_sec, dt/iters, mibs);
    Ok(())
}


fn main() -> Result<()> {
    env_logger::init();

    let batch = sample();

    let bytes = msglib::encode_to_bytes(&batch)?;
    assert_eq!(batch, msglib::decode_from_bytes::<Batch>(&bytes)?);
    msglib::validate(&bytes)?;

    let text = msglib::encode_to_text(&batch)?;
    assert_eq!(batch, msglib::decode_from_text::<Batch>(&text)?);

    let small = Batch { readings: batch.readings[..2].to_vec(), ..batch.clone() };
    let inspected = msglib::inspect(&msglib::encode_to_bytes(&small)?)?;
    println!("{}", serde_json::to_string_pretty(&inspected).unwrap_or_default());


    bench("batch encode binary", bytes.len(), || {
        msglib::encode_to_bytes(&batch)?;
        Ok(())
    })?;

    bench("batch decode binary", bytes.len(), || {
        msglib::decode_from_bytes::<Batch>(&bytes)?;
        Ok(())
    })?;

    bench("batch validate binary", bytes.len(), || {
        msglib::validate(&bytes)
    })?;

    bench("batch encode text", text.len(), || {
        msglib::encode_to_text(&batch)?;
        Ok(())
    })?;

    bench("batch decode text", text.len(), || {
        msglib::decode_from_text::<Batch>(&text)?;
        Ok(())
    })?;

    Ok(())
}
