//! End-to-end rendering scenarios, driven by a manual clock and captured in memory.

use std::time::Duration;

use line_progress::{Error, ManualClock, ProgressBar, ProgressIteratorExt as _};

const WIDTH: usize = 60;

fn capture(max_value: Option<u64>, interval: Duration) -> (ProgressBar<Vec<u8>, ManualClock>, ManualClock) {
    let clock = ManualClock::new();
    let builder = ProgressBar::builder()
        .terminal_width(WIDTH)
        .min_update_interval(interval)
        .sink(Vec::new())
        .clock(clock.clone());
    let builder = match max_value {
        Some(max_value) => builder.max_value(max_value),
        None => builder,
    };
    (builder.build(), clock)
}

/// Rendered lines, without the blanking runs between them.
fn rendered_lines(output: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(output)
        .split('\r')
        .filter(|part| !part.trim().is_empty())
        .map(str::to_owned)
        .collect()
}

fn percent_of(line: &str) -> Option<u64> {
    line[..3].trim().parse().ok()
}

#[test]
fn bounded_sequence_renders_every_item() {
    let (mut bar, clock) = capture(None, Duration::from_millis(50));
    for _ in bar.wrap((0..9).collect::<Vec<_>>()) {
        clock.advance(Duration::from_millis(100));
    }

    let lines = rendered_lines(bar.sink());
    assert_eq!(
        lines,
        [
            "N/A% (0 of 9) |       | Elapsed Time: 0:00:00 ETA:  --:--:--",
            " 11% (1 of 9) |        | Elapsed Time: 0:00:00 ETA:  0:00:00",
            " 22% (2 of 9) |#       | Elapsed Time: 0:00:00 ETA:  0:00:00",
            " 33% (3 of 9) |##      | Elapsed Time: 0:00:00 ETA:  0:00:00",
            " 44% (4 of 9) |###     | Elapsed Time: 0:00:00 ETA:  0:00:00",
            " 55% (5 of 9) |####    | Elapsed Time: 0:00:00 ETA:  0:00:00",
            " 66% (6 of 9) |#####   | Elapsed Time: 0:00:00 ETA:  0:00:00",
            " 77% (7 of 9) |######  | Elapsed Time: 0:00:00 ETA:  0:00:00",
            " 88% (8 of 9) |####### | Elapsed Time: 0:00:00 ETA:  0:00:00",
            "100% (9 of 9) |########| Elapsed Time: 0:00:00 Time: 0:00:00",
        ]
    );
    for line in &lines {
        assert_eq!(line.chars().count(), WIDTH);
    }
}

#[test]
fn bounded_eta_tracks_average_rate() {
    let (mut bar, clock) = capture(Some(4), Duration::ZERO);
    for _ in bar.wrap(0..4) {
        clock.advance(Duration::from_secs(10));
    }

    let lines = rendered_lines(bar.sink());
    assert!(lines[1].ends_with("Elapsed Time: 0:00:10 ETA:  0:00:30"), "{}", lines[1]);
    assert!(lines[3].ends_with("Elapsed Time: 0:00:30 ETA:  0:00:10"), "{}", lines[3]);
    assert!(lines[4].ends_with("Elapsed Time: 0:00:40 Time: 0:00:40"), "{}", lines[4]);
}

#[test]
fn unbounded_iterator_spins() {
    let (mut bar, clock) = capture(None, Duration::from_millis(50));
    let mut remaining = 9;
    let source = std::iter::from_fn(|| {
        (remaining > 0).then(|| {
            remaining -= 1;
        })
    });
    for () in source.progress_with(&mut bar) {
        clock.advance(Duration::from_millis(100));
    }

    let glyphs = ['/', '-', '\\', '|'];
    let expected: Vec<String> = (0..=9)
        .map(|value: usize| {
            format!(
                "{} |{}#{}| {value} Elapsed Time: 0:00:00",
                glyphs[value % 4],
                " ".repeat(value),
                " ".repeat(31 - value),
            )
        })
        .collect();
    let lines = rendered_lines(bar.sink());
    assert_eq!(lines, expected);
    assert!(lines.iter().all(|line| !line.contains('%')));
}

#[test]
fn rapid_updates_are_throttled() {
    let (mut bar, clock) = capture(None, Duration::from_millis(50));
    for i in bar.wrap(0..100) {
        if i % 10 == 0 {
            clock.advance(Duration::from_millis(100));
        }
    }

    let lines = rendered_lines(bar.sink());
    let prefixes: Vec<&str> = lines.iter().map(|line| &line[..line.find(')').unwrap_or(0) + 1]).collect();
    assert_eq!(
        prefixes,
        [
            "N/A% (0 of 100)",
            "  1% (1 of 100)",
            " 11% (11 of 100)",
            " 21% (21 of 100)",
            " 31% (31 of 100)",
            " 41% (41 of 100)",
            " 51% (51 of 100)",
            " 61% (61 of 100)",
            " 71% (71 of 100)",
            " 81% (81 of 100)",
            " 91% (91 of 100)",
            "100% (100 of 100)",
        ]
    );

    let percents: Vec<u64> = lines.iter().filter_map(|line| percent_of(line)).collect();
    assert!(percents.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[test]
fn finish_inside_interval_still_renders_once() {
    let (mut bar, _clock) = capture(Some(3), Duration::from_secs(3600));
    for _ in bar.wrap(0..3) {}
    let rendered = bar.sink().len();
    bar.finish().unwrap();

    assert_eq!(bar.sink().len(), rendered);
    let lines = rendered_lines(bar.sink());
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("100% (3 of 3)"));
}

fn run_scoped(max_value: Option<u64>) -> String {
    let (mut bar, clock) = capture(max_value, Duration::from_micros(100));
    bar.scope(|bar| -> Result<(), Error> {
        for _ in bar.wrap(0..5) {
            clock.advance(Duration::from_millis(1));
        }
        Ok(())
    })
    .unwrap();
    String::from_utf8(bar.into_sink()).unwrap()
}

fn assert_scoped_parts(output: &str) {
    let blank = " ".repeat(WIDTH);
    let blank = blank.as_str();
    let parts: Vec<&str> = output.split('\r').collect();
    assert_eq!(
        parts,
        [
            "",
            blank,
            "N/A% (0 of 5) |       | Elapsed Time: 0:00:00 ETA:  --:--:--",
            blank,
            " 20% (1 of 5) |#       | Elapsed Time: 0:00:00 ETA:  0:00:00",
            blank,
            " 40% (2 of 5) |###     | Elapsed Time: 0:00:00 ETA:  0:00:00",
            blank,
            " 60% (3 of 5) |####    | Elapsed Time: 0:00:00 ETA:  0:00:00",
            blank,
            " 80% (4 of 5) |######  | Elapsed Time: 0:00:00 ETA:  0:00:00",
            blank,
            "100% (5 of 5) |########| Elapsed Time: 0:00:00 Time: 0:00:00",
        ]
    );
}

#[test]
fn scoped_usage_renders_entry_items_and_exit() {
    assert_scoped_parts(&run_scoped(Some(5)));
}

#[test]
fn scoped_usage_takes_maximum_from_wrapped_sequence() {
    assert_scoped_parts(&run_scoped(None));
}

#[test]
fn manual_driving_without_iterator() {
    let (mut bar, clock) = capture(Some(200), Duration::ZERO);
    bar.start().unwrap();
    for _ in 0..4 {
        clock.advance(Duration::from_secs(15));
        bar.advance(50).unwrap();
    }
    bar.finish().unwrap();

    let lines = rendered_lines(bar.sink());
    assert_eq!(lines.len(), 6);
    assert!(lines[2].starts_with(" 50% (100 of 200)"));
    assert!(lines[2].ends_with("Elapsed Time: 0:00:30 ETA:  0:00:30"));
    assert!(lines[5].ends_with("Elapsed Time: 0:01:00 Time: 0:01:00"));
}
