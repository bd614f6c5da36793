mod support;

use sd_demo_core::console::{LINE_CAP, LINE_HEIGHT, TOP_MARGIN};
use sd_demo_core::{Console, Event, Refresh, Region};
use support::RecordingPanel;

#[test]
fn init_blanks_the_whole_panel() {
    let mut console = Console::new(RecordingPanel::new(800, 480));
    console.init();

    let panel = console.panel();
    assert_eq!(panel.areas(), vec![Refresh::Full]);
    assert!(panel.refreshes[0].1.black.is_empty(), "init must draw nothing");
    assert_eq!(console.cursor(), TOP_MARGIN);
}

#[test]
fn each_log_advances_cursor_by_one_line() {
    let mut console = Console::new(RecordingPanel::new(800, 480));
    console.init();

    console.log("SD card init start");
    assert_eq!(console.cursor(), TOP_MARGIN + LINE_HEIGHT);

    console.log("SPI bus init OK");
    assert_eq!(console.cursor(), TOP_MARGIN + 2 * LINE_HEIGHT);

    let lines: Vec<&str> = console.lines().collect();
    assert_eq!(lines, ["SD card init start", "SPI bus init OK"]);
}

#[test]
fn each_log_refreshes_only_its_own_band() {
    let mut console = Console::new(RecordingPanel::new(800, 480));
    console.init();
    console.log("first");
    console.log("second");

    let panel = console.panel();
    assert_eq!(
        panel.areas(),
        vec![
            Refresh::Full,
            Refresh::Window(Region::new(0, 10, 800, 30)),
            Refresh::Window(Region::new(0, 40, 800, 30)),
        ]
    );

    let (top, bottom) = panel.refreshes[1].1.rows().expect("text drawn");
    assert!(top >= 10 && bottom < 40, "first line outside its band: {top}..{bottom}");
}

#[test]
fn wrap_happens_exactly_once_when_cursor_reaches_height() {
    // rows at 10, 40, 70; the third step lands on 100 == height
    let mut console = Console::new(RecordingPanel::new(200, 100));
    console.init();

    console.log("one");
    console.log("two");
    assert_eq!(console.wraps(), 0);

    console.log("three");
    assert_eq!(console.wraps(), 1, "third log should wrap");
    assert_eq!(console.cursor(), TOP_MARGIN);

    console.log("four");
    console.log("five");
    assert_eq!(console.wraps(), 1, "no second wrap yet");
    assert_eq!(console.cursor(), TOP_MARGIN + 2 * LINE_HEIGHT);

    let lines: Vec<&str> = console.lines().collect();
    assert_eq!(lines, ["four", "five"]);
}

#[test]
fn first_log_after_wrap_repaints_full_screen() {
    let mut console = Console::new(RecordingPanel::new(200, 100));
    console.init();
    for msg in ["one", "two", "three", "four"] {
        console.log(msg);
    }

    let areas = console.panel().areas();
    assert_eq!(areas.len(), 5);
    assert_eq!(areas[3], Refresh::Window(Region::new(0, 70, 200, 30)));
    assert_eq!(areas[4], Refresh::Full);

    // the full repaint only carries the new line, at the top
    let (top, bottom) = console.panel().refreshes[4].1.rows().expect("text drawn");
    assert!(top >= 10 && bottom < 40);
}

#[test]
fn bottom_band_is_clipped_to_the_panel() {
    let mut console = Console::new(RecordingPanel::new(800, 480));
    console.init();

    // rows 10..=460 fit: sixteen lines, the sixteenth wraps
    for i in 0..15 {
        console.log(&format!("line {i}"));
    }
    assert_eq!(console.wraps(), 0);
    assert_eq!(console.cursor(), 460);

    console.log("line 15");
    assert_eq!(console.wraps(), 1);
    assert_eq!(
        console.panel().areas().last(),
        Some(&Refresh::Window(Region::new(0, 460, 800, 20)))
    );
}

#[test]
fn console_without_init_starts_with_a_full_refresh() {
    let mut console = Console::new(RecordingPanel::new(800, 480));
    console.log("hello");
    assert_eq!(console.panel().areas(), vec![Refresh::Full]);
}

#[test]
fn long_messages_are_cut_to_line_capacity() {
    let mut console = Console::new(RecordingPanel::new(800, 480));
    console.init();
    let long = "x".repeat(LINE_CAP + 20);
    console.log(&long);

    let line = console.lines().next().unwrap();
    assert_eq!(line.len(), LINE_CAP);
}

#[test]
fn show_formats_events() {
    let mut console = Console::new(RecordingPanel::new(800, 480));
    console.init();
    console.show(&Event::ReadBack("Hello, SD card!"));
    console.show(&Event::Finished);

    let lines: Vec<&str> = console.lines().collect();
    assert_eq!(lines, ["Read: Hello, SD card!", "All done"]);
}
