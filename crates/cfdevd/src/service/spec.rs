//! Description of the installed service.

use camino::{Utf8Path, Utf8PathBuf};

use cfdev_config::Config;

/// Everything a supervisor needs to launch the helper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonSpec {
    label: String,
    program: Utf8PathBuf,
    program_arguments: Vec<String>,
    run_at_load: bool,
    stdout_path: Utf8PathBuf,
    stderr_path: Utf8PathBuf,
}

impl DaemonSpec {
    /// Builds a spec that runs `program` with no extra arguments at boot.
    ///
    /// Output is discarded until [`DaemonSpec::with_log_paths`] is applied.
    #[must_use]
    pub fn new(label: impl Into<String>, program: impl Into<Utf8PathBuf>) -> Self {
        let program = program.into();
        Self {
            label: label.into(),
            program_arguments: vec![program.to_string()],
            program,
            run_at_load: true,
            stdout_path: Utf8PathBuf::from("/dev/null"),
            stderr_path: Utf8PathBuf::from("/dev/null"),
        }
    }

    /// Derives the installed helper's spec from configuration.
    ///
    /// The installed helper is pointed at the configured socket so that it
    /// listens where the installing client expects it.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.service_label(), config.program_path())
            .with_arguments([
                "--daemon-socket".to_owned(),
                config.daemon_socket().to_string(),
            ])
            .with_log_paths(config.stdout_path(), config.stderr_path())
    }

    /// Appends arguments after the program name.
    #[must_use]
    pub fn with_arguments<I>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        self.program_arguments.extend(arguments);
        self
    }

    /// Redirects the service's output streams.
    #[must_use]
    pub fn with_log_paths(
        mut self,
        stdout_path: impl Into<Utf8PathBuf>,
        stderr_path: impl Into<Utf8PathBuf>,
    ) -> Self {
        self.stdout_path = stdout_path.into();
        self.stderr_path = stderr_path.into();
        self
    }

    /// Controls whether the supervisor starts the service at boot.
    #[must_use]
    pub const fn with_run_at_load(mut self, run_at_load: bool) -> Self {
        self.run_at_load = run_at_load;
        self
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn program(&self) -> &Utf8Path {
        &self.program
    }

    /// Full argument vector, starting with the program itself.
    #[must_use]
    pub fn program_arguments(&self) -> &[String] {
        &self.program_arguments
    }

    #[must_use]
    pub const fn run_at_load(&self) -> bool {
        self.run_at_load
    }

    #[must_use]
    pub fn stdout_path(&self) -> &Utf8Path {
        &self.stdout_path
    }

    #[must_use]
    pub fn stderr_path(&self) -> &Utf8Path {
        &self.stderr_path
    }
}
