use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use packetmon_core::{MonitorConfig, replay_trace_file};

fn main() -> ExitCode {
    if let Err(err) = run() {
        eprintln!("error: {}", err);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn run() -> Result<(), String> {
    let root = PathBuf::from("tests").join("golden");
    let entries =
        fs::read_dir(&root).map_err(|err| format!("failed to read {}: {}", root.display(), err))?;

    for entry in entries {
        let entry = entry.map_err(|err| format!("failed to read entry: {}", err))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let input = path.join("input.jsonl");
        if !input.exists() {
            continue;
        }
        let output = path.join("expected.txt");
        regenerate_one(&input, &output)?;
    }

    Ok(())
}

fn regenerate_one(input: &Path, output: &Path) -> Result<(), String> {
    let mut rendered = Vec::new();
    replay_trace_file(input, &mut rendered, MonitorConfig::default())
        .map_err(|err| format!("replay failed for {}: {}", input.display(), err))?;
    fs::write(output, rendered)
        .map_err(|err| format!("failed to write {}: {}", output.display(), err))?;
    Ok(())
}
