use camino::{Utf8Path, Utf8PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::process::Command;

/// Errors from running the gr2 → dae converter
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Failed to start converter: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Converter exited with {}: {detail}", exit_description(.code))]
    Failed { code: Option<i32>, detail: String },
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {code}"),
        None => "a signal".to_string(),
    }
}

/// A successful conversion
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    /// The temporary Collada file the converter wrote
    pub collada_path: Utf8PathBuf,
    /// Skeleton the file was conformed to, if any
    pub conformed_to: Option<Utf8PathBuf>,
    pub duration: Duration,
}

/// Wrapper around the divine command line tool.
///
/// The converter is a black box: it is handed a Granny source and a Collada
/// destination as discrete arguments (no shell) and judged by its exit code.
/// There is no timeout; the import waits for the tool to finish.
#[derive(Debug, Clone)]
pub struct DivineConverter {
    exe: Utf8PathBuf,
}

impl DivineConverter {
    pub fn new(exe: impl Into<Utf8PathBuf>) -> Self {
        Self { exe: exe.into() }
    }

    pub fn exe(&self) -> &Utf8Path {
        &self.exe
    }

    /// Where the converted Collada file for `source` goes.
    ///
    /// The source path with its extension removed, plus `-temp.dae`:
    /// `anims/Humans_Male_Walk.gr2` becomes `anims/Humans_Male_Walk-temp.dae`.
    pub fn temp_output_path(source: &Utf8Path) -> Utf8PathBuf {
        Utf8PathBuf::from(format!("{}-temp.dae", source.with_extension("")))
    }

    /// Build the converter arguments
    ///
    /// # Arguments
    /// * `source` - The `.gr2` file to convert
    /// * `destination` - The `.dae` file to write
    /// * `skeleton` - Base skeleton to conform to, if any
    ///
    /// # Returns
    /// The arguments in the order the tool expects them
    pub fn build_args(
        source: &Utf8Path,
        destination: &Utf8Path,
        skeleton: Option<&Utf8Path>,
    ) -> Vec<String> {
        let mut args: Vec<String> = [
            "--loglevel",
            "all",
            "-g",
            "dos2de",
            "-s",
            source.as_str(),
            "-d",
            destination.as_str(),
            "-i",
            "gr2",
            "-o",
            "dae",
            "-a",
            "convert-model",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        if let Some(skeleton) = skeleton {
            args.extend(
                [
                    "-e",
                    "conform",
                    "-e",
                    "conform-copy",
                    "--conform-path",
                    skeleton.as_str(),
                ]
                .into_iter()
                .map(String::from),
            );
        }

        args
    }

    /// Convert `source` to its temporary Collada file
    ///
    /// The tool's stdout is logged at debug level; on failure its last line
    /// becomes the error detail.
    pub async fn convert(
        &self,
        source: &Utf8Path,
        skeleton: Option<&Utf8Path>,
    ) -> Result<ConversionOutput, ConversionError> {
        let destination = Self::temp_output_path(source);
        let args = Self::build_args(source, &destination, skeleton);

        tracing::info!("Executing: {} {}", self.exe, args.join(" "));
        let start = Instant::now();

        let output = Command::new(self.exe.as_std_path())
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        let duration = start.elapsed();
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        for line in stdout.lines() {
            tracing::debug!(target: "dos2de_importer::converter", "{}", line);
        }

        tracing::info!(
            "Converter completed in {:.2}s with status {}",
            duration.as_secs_f32(),
            output.status
        );

        if !output.status.success() {
            let detail = last_line(&stdout)
                .or_else(|| last_line(&stderr))
                .unwrap_or("no output")
                .to_string();
            tracing::error!("Error converting GR2 to DAE: {}", detail);
            return Err(ConversionError::Failed {
                code: output.status.code(),
                detail,
            });
        }

        Ok(ConversionOutput {
            collada_path: destination,
            conformed_to: skeleton.map(Utf8Path::to_path_buf),
            duration,
        })
    }
}

fn last_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).rfind(|line| !line.is_empty())
}
