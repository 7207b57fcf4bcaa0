use std::time::Duration;

use pathreplay_common::error::PathreplayResult;
use pathreplay_platform_core::stub::StubPointer;
use pathreplay_platform_core::{CoordinateSpace, Point, PointerDevice, ScreenGeometry};
use pathreplay_player::Player;
use pathreplay_trace_model::{parse_trace, serialize_trace, Recording, Sample, TraceHeader};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

fn recording(space: CoordinateSpace, geometry: ScreenGeometry, samples: Vec<Sample>) -> Recording {
    let header = TraceHeader::new(space, geometry, 1000, "2026-01-01T00:00:00Z");
    Recording::new(header, samples).unwrap()
}

fn diagonal(count: u64, period_ms: u64) -> Vec<Sample> {
    (0..count)
        .map(|i| Sample::new(i * period_ms, 100.0 + i as f64 * 37.0, 50.0 + i as f64 * 11.0))
        .collect()
}

#[tokio::test(start_paused = true)]
async fn replay_on_larger_display_scales_by_two() {
    let recorded = ScreenGeometry::uniform(1920, 1080).unwrap();
    let current = ScreenGeometry::uniform(3840, 2160).unwrap();
    let samples = diagonal(5, 200);
    let recording = recording(CoordinateSpace::Logical, recorded, samples.clone());

    let pointer = StubPointer::fixed(Point::new(0.0, 0.0));
    let log = pointer.moves();
    let mut player = Player::new(Box::new(pointer), current);
    player
        .play(&recording, CancellationToken::new())
        .await
        .unwrap();

    let moves = log.lock().unwrap();
    assert_eq!(moves.len(), samples.len());
    for (mv, sample) in moves.iter().zip(&samples) {
        assert!((mv.target.x - sample.position.x * 2.0).abs() < 1e-9);
        assert!((mv.target.y - sample.position.y * 2.0).abs() < 1e-9);
        let (x, y) = sample.position.rounded();
        assert_eq!(mv.target.rounded(), (x * 2, y * 2));
    }
}

#[tokio::test(start_paused = true)]
async fn malformed_row_is_skipped_and_the_rest_plays_in_order() {
    let geometry = ScreenGeometry::uniform(1920, 1080).unwrap();
    let text = serialize_trace(&recording(CoordinateSpace::Logical, geometry, diagonal(10, 100))).unwrap();

    // Line 7 holds the fifth sample; header and column row come first.
    let corrupted: Vec<String> = text
        .lines()
        .enumerate()
        .map(|(idx, line)| {
            if idx == 6 {
                "500,oops,12".to_string()
            } else {
                line.to_string()
            }
        })
        .collect();
    let loaded = parse_trace(&corrupted.join("\n"), None).unwrap();
    assert_eq!(loaded.diagnostics.len(), 1);
    assert_eq!(loaded.diagnostics[0].line, 7);
    assert_eq!(loaded.recording.len(), 9);

    let pointer = StubPointer::fixed(Point::new(0.0, 0.0));
    let log = pointer.moves();
    let mut player = Player::new(Box::new(pointer), geometry);
    let report = player
        .play(&loaded.recording, CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(report.moves_issued, 9);

    let moves = log.lock().unwrap();
    let xs: Vec<f64> = moves.iter().map(|m| m.target.x).collect();
    let expected: Vec<f64> = loaded.recording.samples.iter().map(|s| s.position.x).collect();
    assert_eq!(xs, expected);
    assert!(moves.windows(2).all(|w| w[0].at < w[1].at));
}

#[tokio::test(start_paused = true)]
async fn total_playback_time_matches_last_offset() {
    let geometry = ScreenGeometry::uniform(800, 600).unwrap();
    let recording = recording(CoordinateSpace::Logical, geometry, diagonal(5, 1000));

    let pointer = StubPointer::fixed(Point::new(0.0, 0.0));
    let log = pointer.moves();
    let start = Instant::now();
    let mut player = Player::new(Box::new(pointer), geometry);
    let report = player
        .play(&recording, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.drift.reference_ms, 4000);
    assert_eq!(report.drift.measured_ms, 4000);
    assert!(!report.drift.exceeds_threshold_ms(50));
    assert_eq!(report.max_lateness, Duration::ZERO);

    let offsets: Vec<u128> = log
        .lock()
        .unwrap()
        .iter()
        .map(|m| (m.at - start).as_millis())
        .collect();
    assert_eq!(offsets, vec![0, 1000, 2000, 3000, 4000]);
}

#[tokio::test(start_paused = true)]
async fn refused_moves_do_not_stop_playback() {
    let geometry = ScreenGeometry::uniform(800, 600).unwrap();
    let recording = recording(CoordinateSpace::Logical, geometry, diagonal(4, 250));

    let mut player = Player::new(
        Box::new(StubPointer::fixed(Point::new(0.0, 0.0)).failing_moves()),
        geometry,
    );
    let report = player
        .play(&recording, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.moves_issued, 4);
    assert_eq!(report.move_failures, 4);
    assert_eq!(report.drift.measured_ms, 750);
}

#[tokio::test(start_paused = true)]
async fn cancellation_stops_before_remaining_moves() {
    let geometry = ScreenGeometry::uniform(800, 600).unwrap();
    let recording = recording(CoordinateSpace::Logical, geometry, diagonal(10, 1000));

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(2500)).await;
        trigger.cancel();
    });

    let pointer = StubPointer::fixed(Point::new(0.0, 0.0));
    let log = pointer.moves();
    let mut player = Player::new(Box::new(pointer), geometry);
    let report = player.play(&recording, cancel).await.unwrap();

    assert!(report.cancelled);
    assert_eq!(report.moves_issued, 3);
    assert_eq!(log.lock().unwrap().len(), 3);
}

/// Pointer whose first move blocks the thread.
struct SlowFirstMove {
    stall: Duration,
    moves: Vec<Instant>,
    sink: std::sync::Arc<std::sync::Mutex<Vec<Instant>>>,
}

impl PointerDevice for SlowFirstMove {
    fn position(&mut self) -> PathreplayResult<Point> {
        Ok(Point::new(0.0, 0.0))
    }

    fn move_to(&mut self, _target: Point) -> PathreplayResult<()> {
        if self.moves.is_empty() {
            std::thread::sleep(self.stall);
        }
        self.moves.push(Instant::now());
        if let Ok(mut sink) = self.sink.lock() {
            sink.push(Instant::now());
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "slow"
    }
}

#[tokio::test]
async fn one_slow_move_does_not_shift_later_moves() {
    let geometry = ScreenGeometry::uniform(800, 600).unwrap();
    let recording = recording(CoordinateSpace::Logical, geometry, diagonal(6, 100));

    let sink = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let pointer = SlowFirstMove {
        stall: Duration::from_millis(250),
        moves: Vec::new(),
        sink: sink.clone(),
    };
    let start = Instant::now();
    let mut player = Player::new(Box::new(pointer), geometry);
    let report = player
        .play(&recording, CancellationToken::new())
        .await
        .unwrap();

    // Accumulated delays would finish at 750ms; absolute offsets finish at 500ms.
    let total = start.elapsed();
    assert!(total >= Duration::from_millis(500), "{total:?}");
    assert!(total < Duration::from_millis(650), "{total:?}");
    assert!(!report.drift.exceeds_threshold_ms(150));

    let stamps = sink.lock().unwrap();
    let last = stamps[stamps.len() - 1] - start;
    assert!(last >= Duration::from_millis(500) && last < Duration::from_millis(650));
}
