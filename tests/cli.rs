use std::process::{
    Command,
    Output,
};

fn sembench(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sembench"))
        .args(args)
        .output()
        .unwrap()
}

fn stdout(out: &Output) -> String {
    String::from_utf8(out.stdout.clone()).unwrap()
}

fn stderr(out: &Output) -> String {
    String::from_utf8(out.stderr.clone()).unwrap()
}

// Parses "average A, min M, max X".
fn summary(line: &str) -> (f64, f64, f64) {
    let nums: Vec<f64> = line
        .split(", ")
        .map(|part| part.rsplit(' ').next().unwrap().parse().unwrap())
        .collect();
    assert_eq!(nums.len(), 3, "bad summary line: {}", line);
    (nums[0], nums[1], nums[2])
}

#[test]
fn single_worker_single_semaphore() {
    let out = sembench(&["-n", "1", "-s", "1", "-i", "1", "-p", "1"]);
    assert!(out.status.success(), "{}", stderr(&out));
    let text = stdout(&out);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "spawning 1 processes");
    assert_eq!(lines[1], "running 1 semop iterations per process");
    let (avg, min, max) = summary(lines[2]);
    assert_eq!(avg, min);
    assert_eq!(min, max);
}

#[test]
fn many_workers() {
    let out = sembench(&["-s", "5", "-n", "5", "-i", "10000", "-p", "8"]);
    assert!(out.status.success(), "{}", stderr(&out));
    let text = stdout(&out);
    assert!(text.starts_with("spawning 8 processes\n"));
    let (avg, min, max) = summary(text.lines().last().unwrap());
    assert!(avg.is_finite() && avg > 0.0);
    assert!(min <= avg && avg <= max);
}

#[test]
fn defaults() {
    let out = sembench(&[]);
    assert!(out.status.success(), "{}", stderr(&out));
    let text = stdout(&out);
    assert!(text.contains("spawning 2 processes"));
    assert!(text.contains("running 1000 semop iterations per process"));
    assert!(text.lines().last().unwrap().starts_with("average "));
}

#[test]
fn unknown_flag_is_not_fatal() {
    let out = sembench(&["-q", "-p", "1", "-i", "5"]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(stderr(&out).contains("unknown option '-q', ignoring"));
    assert!(stdout(&out).contains("spawning 1 processes"));
}

#[test]
fn unknown_flag_in_cluster_is_not_fatal() {
    let out = sembench(&["-vq", "-p", "1", "-i", "5"]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(stderr(&out).contains("unknown option '-q', ignoring"));
    let text = stdout(&out);
    assert!(text.contains("spawning 1 processes"));
    assert!(text.lines().last().unwrap().starts_with("average "));
}

#[test]
fn short_help_runs_with_defaults() {
    let out = sembench(&["-h", "-i", "5"]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(stderr(&out).contains("unknown option '-h', ignoring"));
    assert!(stdout(&out).contains("spawning 2 processes"));
}

#[test]
fn zero_processes_rejected() {
    let out = sembench(&["-p", "0"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("processes must be at least 1"));
    assert!(!stdout(&out).contains("average"));
}

#[test]
fn zero_sets_rejected() {
    let out = sembench(&["-s", "0"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("semaphore sets must be at least 1"));
}
