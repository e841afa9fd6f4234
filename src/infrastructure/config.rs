use std::path::PathBuf;
use std::time::Duration;

/// Name of the scratch file a text response is buffered into
pub const TRANSIENT_ARTIFACT: &str = "rdat.dat";

/// Runtime configuration for a single invocation.
///
/// Nothing is persisted between runs; everything here comes from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub timeout: Option<Duration>,
    /// Directory receiving saved binaries and the transient artifact;
    /// `None` means the working directory
    pub output_dir: Option<PathBuf>,
    pub verbose: bool,
    pub show_progress: bool,
}

impl ClientConfig {
    pub fn new(timeout: Option<Duration>, output_dir: Option<PathBuf>) -> Self {
        Self {
            timeout,
            output_dir,
            verbose: false,
            show_progress: true,
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    #[cfg(test)]
    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Places `file_name` in the output directory, or leaves it relative
    pub fn place(&self, file_name: &str) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.join(file_name),
            None => PathBuf::from(file_name),
        }
    }

    pub fn transient_artifact(&self) -> PathBuf {
        self.place(TRANSIENT_ARTIFACT)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_live_in_output_dir() {
        let config = ClientConfig::new(None, Some(PathBuf::from("/tmp/downloads")));
        assert_eq!(config.transient_artifact(), PathBuf::from("/tmp/downloads/rdat.dat"));
        assert_eq!(
            config.place("received_png.png"),
            PathBuf::from("/tmp/downloads/received_png.png")
        );
    }

    #[test]
    fn default_is_current_dir_without_timeout() {
        let config = ClientConfig::default();
        assert_eq!(config.output_dir, None);
        assert_eq!(config.place("received_pdf.pdf"), PathBuf::from("received_pdf.pdf"));
        assert_eq!(config.timeout, None);
        assert!(config.show_progress);
    }
}
