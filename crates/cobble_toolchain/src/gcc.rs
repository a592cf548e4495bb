//! Process-backed toolchain for GCC-compatible compiler drivers.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use cobble_common::{MTime, UnitPath};
use cobble_config::ToolchainConfig;

use crate::error::{ToolAction, ToolError};
use crate::Toolchain;

/// Drives `g++`/`clang++` as dependency extractor, compiler, and linker.
///
/// Every command runs with the project root as its working directory, so
/// the unit paths handed in and the paths in `-MM` output are root-relative.
/// Compiler diagnostics on stderr pass straight through to the terminal.
#[derive(Debug, Clone)]
pub struct GccToolchain {
    root: PathBuf,
    config: ToolchainConfig,
}

impl GccToolchain {
    /// Creates a toolchain running in `root` with the given settings.
    pub fn new(root: &Path, config: ToolchainConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            config,
        }
    }

    /// `<cc> -MM -MT<src> <flags> -I<inc>... <src>`
    pub fn extract_command(&self, source: &UnitPath) -> Command {
        let mut cmd = self.base_command();
        cmd.arg("-MM").arg(prefixed("-MT", source));
        cmd.args(&self.config.flags);
        cmd.args(self.include_args());
        cmd.arg(source.as_path());
        cmd
    }

    /// `<cc> <flags> -I<inc>... -o<obj> -c <src>`
    pub fn compile_command(&self, source: &UnitPath, object: &UnitPath) -> Command {
        let mut cmd = self.base_command();
        cmd.args(&self.config.flags);
        cmd.args(self.include_args());
        cmd.arg(prefixed("-o", object)).arg("-c").arg(source.as_path());
        cmd
    }

    /// `<cc> <flags> -o<bin> <objs>... <link_flags>`
    pub fn link_command(&self, objects: &[UnitPath], output: &UnitPath) -> Command {
        let mut cmd = self.base_command();
        cmd.args(&self.config.flags);
        cmd.arg(prefixed("-o", output));
        cmd.args(objects.iter().map(UnitPath::as_path));
        cmd.args(&self.config.link_flags);
        cmd
    }

    fn base_command(&self) -> Command {
        let mut cmd = Command::new(&self.config.compiler);
        cmd.current_dir(&self.root);
        cmd
    }

    fn include_args(&self) -> impl Iterator<Item = String> + '_ {
        self.config.include.iter().map(|dir| format!("-I{dir}"))
    }

    /// Runs `cmd`, echoing it first, and fails on a nonzero exit.
    fn run(&self, action: ToolAction, mut cmd: Command) -> Result<Output, ToolError> {
        let rendered = render(&cmd);
        tracing::info!("{rendered}");

        let output = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ToolError::NotFound {
                        action,
                        program: self.config.compiler.clone(),
                    }
                } else {
                    ToolError::Io { action, source: e }
                }
            })?;

        if !output.status.success() {
            return Err(ToolError::Failed {
                action,
                command: rendered,
                exit_code: output.status.code(),
            });
        }
        Ok(output)
    }
}

impl Toolchain for GccToolchain {
    fn extract_deps(&self, source: &UnitPath) -> Result<String, ToolError> {
        let output = self.run(ToolAction::ExtractDeps, self.extract_command(source))?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn compile(&self, source: &UnitPath, object: &UnitPath) -> Result<MTime, ToolError> {
        self.run(ToolAction::Compile, self.compile_command(source, object))?;
        Ok(MTime::now())
    }

    fn link(&self, objects: &[UnitPath], output: &UnitPath) -> Result<(), ToolError> {
        self.run(ToolAction::Link, self.link_command(objects, output))?;
        Ok(())
    }
}

/// Glues a flag and a path into one argument (`-o` + `obj/a.o`).
fn prefixed(flag: &str, path: &UnitPath) -> std::ffi::OsString {
    let mut arg = std::ffi::OsString::from(flag);
    arg.push(path.as_path());
    arg
}

/// Renders a command line for logs and error messages.
fn render(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(OsStr::to_string_lossy)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toolchain(compiler: &str) -> GccToolchain {
        let config = ToolchainConfig {
            compiler: compiler.to_string(),
            flags: vec!["-std=c++14".to_string(), "-g".to_string()],
            include: vec!["src".to_string()],
            link_flags: vec!["-lrt".to_string()],
        };
        GccToolchain::new(Path::new("/work/app"), config)
    }

    fn args(cmd: &Command) -> Vec<String> {
        cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn extract_command_line() {
        let tc = toolchain("g++");
        let cmd = tc.extract_command(&"src/main.cpp".into());
        assert_eq!(cmd.get_program(), "g++");
        assert_eq!(
            args(&cmd),
            ["-MM", "-MTsrc/main.cpp", "-std=c++14", "-g", "-Isrc", "src/main.cpp"]
        );
        assert_eq!(cmd.get_current_dir(), Some(Path::new("/work/app")));
    }

    #[test]
    fn compile_command_line() {
        let tc = toolchain("g++");
        let cmd = tc.compile_command(&"src/foo.cpp".into(), &"obj/foo.o".into());
        assert_eq!(
            args(&cmd),
            ["-std=c++14", "-g", "-Isrc", "-oobj/foo.o", "-c", "src/foo.cpp"]
        );
    }

    #[test]
    fn link_command_keeps_object_order() {
        let tc = toolchain("g++");
        let objs: Vec<UnitPath> = vec!["obj/main.o".into(), "obj/foo.o".into()];
        let cmd = tc.link_command(&objs, &"bin/main".into());
        assert_eq!(
            args(&cmd),
            ["-std=c++14", "-g", "-obin/main", "obj/main.o", "obj/foo.o", "-lrt"]
        );
    }

    #[test]
    fn render_joins_program_and_args() {
        let tc = toolchain("clang++");
        let cmd = tc.compile_command(&"src/a.cpp".into(), &"obj/a.o".into());
        assert_eq!(render(&cmd), "clang++ -std=c++14 -g -Isrc -oobj/a.o -c src/a.cpp");
    }

    #[test]
    fn missing_compiler_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let config = ToolchainConfig {
            compiler: "cobble-no-such-compiler".to_string(),
            ..ToolchainConfig::default()
        };
        let tc = GccToolchain::new(dir.path(), config);
        let err = tc.extract_deps(&"src/a.cpp".into()).unwrap_err();
        assert!(matches!(err, ToolError::NotFound { action: ToolAction::ExtractDeps, .. }));
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_is_failure() {
        let dir = tempfile::tempdir().unwrap();
        let config = ToolchainConfig {
            compiler: "false".to_string(),
            ..ToolchainConfig::default()
        };
        let tc = GccToolchain::new(dir.path(), config);
        let err = tc.compile(&"src/a.cpp".into(), &"obj/a.o".into()).unwrap_err();
        match err {
            ToolError::Failed { action, exit_code, command } => {
                assert_eq!(action, ToolAction::Compile);
                assert_eq!(exit_code, Some(1));
                assert!(command.starts_with("false "));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn successful_compile_returns_completion_time() {
        let dir = tempfile::tempdir().unwrap();
        let config = ToolchainConfig {
            compiler: "true".to_string(),
            ..ToolchainConfig::default()
        };
        let tc = GccToolchain::new(dir.path(), config);
        let before = MTime::now();
        let done = tc.compile(&"src/a.cpp".into(), &"obj/a.o".into()).unwrap();
        assert!(done >= before);
    }

    #[cfg(unix)]
    #[test]
    fn extract_captures_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let config = ToolchainConfig {
            compiler: "echo".to_string(),
            flags: Vec::new(),
            include: Vec::new(),
            link_flags: Vec::new(),
        };
        let tc = GccToolchain::new(dir.path(), config);
        let text = tc.extract_deps(&"src/a.cpp".into()).unwrap();
        assert_eq!(text.trim(), "-MM -MTsrc/a.cpp src/a.cpp");
    }
}
