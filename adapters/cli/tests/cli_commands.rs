use std::process::{Command, Output};

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_maze-escape"))
        .args(args)
        .output()
        .expect("failed to invoke maze-escape binary")
}

#[test]
fn generate_prints_a_bordered_maze() {
    let output = run(&["generate", "--width", "7", "--height", "7", "--seed", "3"]);
    assert!(output.status.success(), "generate should succeed");

    let stdout = String::from_utf8(output.stdout).expect("utf-8 output");
    let rows: Vec<&str> = stdout.lines().collect();
    assert_eq!(rows.len(), 7);
    assert!(rows.iter().all(|row| row.chars().count() == 7));
    assert_eq!(rows[0], "#######");
    assert_eq!(rows[6], "#######");
    assert_eq!(stdout.matches('S').count(), 1);
    assert_eq!(stdout.matches('E').count(), 1);
}

#[test]
fn simulate_reports_the_tick_count() {
    let output = run(&[
        "simulate", "--width", "7", "--height", "7", "--seed", "3", "--enemies", "0", "--ticks",
        "10",
    ]);
    assert!(output.status.success(), "simulate should succeed");

    let stdout = String::from_utf8(output.stdout).expect("utf-8 output");
    assert!(stdout.contains("maze: 7x7 Medium"));
    assert!(stdout.contains("status: running after 10 ticks"));
    assert!(stdout.contains("lives: 3"));
}

#[test]
fn rejects_out_of_range_difficulty() {
    let output = run(&["generate", "--difficulty", "3"]);
    assert!(!output.status.success());
}
