//! `cobble <ENTRY>`: incremental build of one binary.

use std::path::Path;
use std::time::Instant;

use cobble_build::{BuildPlanner, BuildReport};
use cobble_config::Layout;
use cobble_toolchain::GccToolchain;

use crate::project::{entry_unit, load_project};
use crate::GlobalArgs;

/// Builds the binary for `entry`, resolved from the current directory.
pub fn run(entry: &str, global: &GlobalArgs) -> Result<(), Box<dyn std::error::Error>> {
    run_in(&std::env::current_dir()?, entry, global)
}

fn run_in(cwd: &Path, entry: &str, global: &GlobalArgs) -> Result<(), Box<dyn std::error::Error>> {
    let started = Instant::now();
    let project = load_project(global, cwd)?;
    let entry = entry_unit(cwd, &project.root, entry);
    tracing::debug!("project root {}, entry {entry}", project.root.display());

    if !global.quiet {
        if let Some(ref name) = project.config.project.name {
            eprintln!("    Building {name} ({entry})");
        }
    }

    let config = project.config;
    let layout = Layout::new(&project.root, &config.paths);
    let toolchain = GccToolchain::new(&project.root, config.toolchain);
    let planner = BuildPlanner::new(layout, config.units, toolchain);
    let report = planner.build(&entry)?;

    if !global.quiet {
        eprintln!("{}", summary(&report, started.elapsed().as_secs_f64()));
    }
    Ok(())
}

/// The closing status line for a finished build.
fn summary(report: &BuildReport, secs: f64) -> String {
    if report.is_noop() {
        return format!("  Up to date {}", report.target);
    }
    let n = report.compiled.len();
    let units = if n == 1 { "unit" } else { "units" };
    let linked = if report.linked { ", linked" } else { "" };
    format!(
        "    Finished {} ({n} {units} compiled{linked}) in {secs:.2}s",
        report.target
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use cobble_common::{MTime, UnitPath};
    use std::fs;

    fn quiet() -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
            color: false,
            config: None,
        }
    }

    fn write_at(root: &Path, rel: &str, content: &str, secs: u64) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        let file = fs::File::options().write(true).open(&path).unwrap();
        file.set_modified(MTime::from_secs(secs).to_system()).unwrap();
    }

    #[test]
    fn up_to_date_project_succeeds_without_running_tools() {
        let tmp = tempfile::tempdir().unwrap();
        // A compiler that cannot exist: any invocation would fail the run.
        fs::write(
            tmp.path().join("cobble.toml"),
            "[toolchain]\ncompiler = \"cobble-no-such-compiler\"\n",
        )
        .unwrap();
        write_at(tmp.path(), "src/main.cpp", "int main() {}\n", 1_000);
        write_at(tmp.path(), "obj/main.o", "", 2_000);
        write_at(tmp.path(), "bin/main", "", 3_000);
        write_at(tmp.path(), "obj/main.dep", "src/main.cpp: src/main.cpp\n", 4_000);

        assert!(run_in(&tmp.path().join("src"), "main.cpp", &quiet()).is_ok());
    }

    #[test]
    fn missing_entry_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = run_in(tmp.path(), "src/nope.cpp", &quiet()).unwrap_err();
        assert_eq!(err.to_string(), "entry 'src/nope.cpp' does not exist");
    }

    fn report(compiled: &[&str], linked: bool) -> BuildReport {
        BuildReport {
            compiled: compiled.iter().map(|p| UnitPath::new(p)).collect(),
            artifacts: vec![UnitPath::new("obj/main.o")],
            target: UnitPath::new("bin/main"),
            linked,
            latest: MTime::ZERO,
        }
    }

    #[test]
    fn summary_up_to_date() {
        assert_eq!(summary(&report(&[], false), 0.0), "  Up to date bin/main");
    }

    #[test]
    fn summary_after_compiling() {
        assert_eq!(
            summary(&report(&["src/main.cpp", "src/foo.cpp"], true), 1.234),
            "    Finished bin/main (2 units compiled, linked) in 1.23s"
        );
        assert_eq!(
            summary(&report(&["src/main.cpp"], true), 0.5),
            "    Finished bin/main (1 unit compiled, linked) in 0.50s"
        );
    }

    #[test]
    fn summary_relink_only() {
        assert_eq!(
            summary(&report(&[], true), 0.01),
            "    Finished bin/main (0 units compiled, linked) in 0.01s"
        );
    }
}
